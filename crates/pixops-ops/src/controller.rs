//! Operation dispatch and the single-flight editing controller.
//!
//! [`Operation`] names one transform and its parameters.
//! [`PixelOperationsController`] holds the accepted buffer of an editing
//! session, the two-click crop selection, and the token of the one
//! operation allowed to commit.
//!
//! # Single-flight
//!
//! [`start`](PixelOperationsController::start) hands out a
//! [`PendingOperation`] tagged with a fresh token and stores that token as
//! the in-flight one, superseding whatever was running. The pending
//! operation can run on any thread. Its result is offered back through
//! [`complete`](PixelOperationsController::complete), which commits only
//! if the token is still in flight:
//!
//! ```rust
//! use pixops_core::PixelBuffer;
//! use pixops_ops::{Completion, Operation, PixelOperationsController};
//!
//! let mut ctl = PixelOperationsController::new();
//! ctl.load(PixelBuffer::filled(8, 8, [200, 100, 50, 255]));
//!
//! let slow = ctl.start(Operation::Sharpen).unwrap();
//! let fast = ctl.start(Operation::Grayscale).unwrap();
//! assert!(!slow.is_current());
//!
//! let (t, r) = (fast.token(), fast.run());
//! assert_eq!(ctl.complete(t, r).unwrap(), Completion::Committed);
//! let (t, r) = (slow.token(), slow.run());
//! assert_eq!(ctl.complete(t, r).unwrap(), Completion::Superseded);
//!
//! assert_eq!(ctl.current().unwrap().get(0, 0).unwrap(), [116, 116, 116, 255]);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::filter::{self, EdgePolicy, Kernel};
use crate::resize::{self, Filter, ScaleFactor};
use crate::{crop, grayscale, OpsError, OpsResult};
use pixops_core::{PixelBuffer, Point};
use tracing::{debug, info, trace, warn};

/// Download name for upscaled output.
pub const UPSCALED_OUTPUT_NAME: &str = "upscaled_image.jpg";

/// Download name for every other operation.
pub const PROCESSED_OUTPUT_NAME: &str = "processed_image.png";

/// One transform and its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Unweighted RGB mean, alpha kept.
    Grayscale,
    /// [`Kernel::sharpen`] with truncated edges.
    Sharpen,
    /// Arbitrary kernel.
    Convolve {
        /// Kernel to apply
        kernel: Kernel,
        /// Edge handling
        edge: EdgePolicy,
    },
    /// Crop the region spanned by two points.
    Crop {
        /// First corner
        a: Point,
        /// Opposite corner
        b: Point,
    },
    /// Scale both dimensions.
    Resample {
        /// Scale ratio
        factor: ScaleFactor,
        /// Interpolation
        filter: Filter,
    },
}

impl Operation {
    /// Default upscale: 2x bilinear.
    pub fn upscale() -> Self {
        Operation::Resample {
            factor: ScaleFactor::default(),
            filter: Filter::default(),
        }
    }

    /// Runs the operation on `src` single-threaded.
    pub fn apply(&self, src: &PixelBuffer) -> OpsResult<PixelBuffer> {
        self.apply_with(src, false)
    }

    /// Runs the operation, using the rayon path for convolution and
    /// resampling when `parallel` is set and the feature is enabled.
    pub fn apply_with(&self, src: &PixelBuffer, parallel: bool) -> OpsResult<PixelBuffer> {
        let parallel = parallel && cfg!(feature = "parallel");
        trace!(op = self.name(), parallel, "apply");

        match self {
            Operation::Grayscale => Ok(grayscale::grayscale(src)),
            Operation::Sharpen => convolve(src, &Kernel::sharpen(), EdgePolicy::Truncate, parallel),
            Operation::Convolve { kernel, edge } => convolve(src, kernel, *edge, parallel),
            Operation::Crop { a, b } => crop::crop(src, *a, *b),
            Operation::Resample { factor, filter } => {
                #[cfg(feature = "parallel")]
                if parallel {
                    return crate::parallel::resample(src, factor.get(), *filter);
                }
                resize::resample(src, factor.get(), *filter)
            }
        }
    }

    /// Short name for logs and CLI output.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Grayscale => "grayscale",
            Operation::Sharpen => "sharpen",
            Operation::Convolve { .. } => "convolve",
            Operation::Crop { .. } => "crop",
            Operation::Resample { .. } => "resample",
        }
    }

    /// File name offered when saving the result.
    pub fn default_output_name(&self) -> &'static str {
        match self {
            Operation::Resample { .. } => UPSCALED_OUTPUT_NAME,
            _ => PROCESSED_OUTPUT_NAME,
        }
    }
}

fn convolve(src: &PixelBuffer, kernel: &Kernel, edge: EdgePolicy, parallel: bool) -> OpsResult<PixelBuffer> {
    #[cfg(feature = "parallel")]
    if parallel {
        return crate::parallel::convolve_with(src, kernel, edge);
    }
    let _ = parallel;
    filter::convolve_with(src, kernel, edge)
}

/// Controller tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Buffers with at least this many pixels use the parallel path.
    pub parallel_threshold: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: 512 * 512,
        }
    }
}

/// Two-click crop selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    /// No selection in progress.
    #[default]
    Idle,
    /// First corner recorded, waiting for the second.
    Selecting {
        /// First corner
        start: Point,
    },
}

/// Outcome of offering a result to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The result became the accepted buffer.
    Committed,
    /// A newer operation had started; the result was dropped.
    Superseded,
}

/// Token value meaning "nothing in flight". Real tokens start at 1.
const IDLE: u64 = 0;

/// An operation bound to its input, ready to run anywhere.
#[derive(Debug, Clone)]
pub struct PendingOperation {
    token: u64,
    input: PixelBuffer,
    op: Operation,
    parallel: bool,
    in_flight: Arc<AtomicU64>,
}

impl PendingOperation {
    /// Token to pass back to [`PixelOperationsController::complete`].
    #[inline]
    pub fn token(&self) -> u64 {
        self.token
    }

    /// The operation to run.
    pub fn operation(&self) -> &Operation {
        &self.op
    }

    /// Returns `false` once a newer operation has started, so long-running
    /// callers can give up early.
    pub fn is_current(&self) -> bool {
        self.in_flight.load(Ordering::Acquire) == self.token
    }

    /// Runs the transform on the captured input.
    pub fn run(&self) -> OpsResult<PixelBuffer> {
        debug!(token = self.token, op = self.op.name(), parallel = self.parallel, "Running operation");
        self.op.apply_with(&self.input, self.parallel)
    }
}

/// Session state for one image being edited.
#[derive(Debug, Default)]
pub struct PixelOperationsController {
    config: ControllerConfig,
    current: Option<PixelBuffer>,
    selection: SelectionState,
    in_flight: Arc<AtomicU64>,
    next_token: u64,
}

impl PixelOperationsController {
    /// Creates an empty controller with default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty controller.
    pub fn with_config(config: ControllerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Returns the config.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Replaces the accepted buffer with a freshly decoded one.
    ///
    /// Any in-flight operation is superseded and any selection is reset.
    pub fn load(&mut self, buffer: PixelBuffer) {
        info!(width = buffer.width(), height = buffer.height(), "Loaded image");
        self.in_flight.store(IDLE, Ordering::Release);
        self.selection = SelectionState::Idle;
        self.current = Some(buffer);
    }

    /// Drops the accepted buffer and returns it.
    pub fn unload(&mut self) -> Option<PixelBuffer> {
        self.in_flight.store(IDLE, Ordering::Release);
        self.selection = SelectionState::Idle;
        self.current.take()
    }

    /// The accepted buffer.
    pub fn current(&self) -> OpsResult<&PixelBuffer> {
        self.current.as_ref().ok_or(OpsError::NoImage)
    }

    /// Current selection state.
    pub fn selection(&self) -> SelectionState {
        self.selection
    }

    /// Returns `true` while an operation holds the in-flight slot.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire) != IDLE
    }

    /// Binds `op` to the accepted buffer and makes it the in-flight one.
    ///
    /// # Errors
    ///
    /// [`OpsError::NoImage`] if nothing is loaded.
    pub fn start(&mut self, op: Operation) -> OpsResult<PendingOperation> {
        let input = self.current()?.clone();
        self.next_token += 1;
        let token = self.next_token;

        let previous = self.in_flight.swap(token, Ordering::AcqRel);
        if previous != IDLE {
            info!(previous, token, "Superseding in-flight operation");
        }

        let parallel = input.pixel_count() >= self.config.parallel_threshold;
        debug!(token, op = op.name(), parallel, "Started operation");
        Ok(PendingOperation {
            token,
            input,
            op,
            parallel,
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    /// Offers the result of the operation started with `token`.
    ///
    /// Commits only if `token` is still in flight. A failed result
    /// releases the slot, leaves the accepted buffer untouched and is
    /// returned as the error. A superseded result is dropped whether it
    /// succeeded or not.
    pub fn complete(&mut self, token: u64, result: OpsResult<PixelBuffer>) -> OpsResult<Completion> {
        if let Err(current) = self
            .in_flight
            .compare_exchange(token, IDLE, Ordering::AcqRel, Ordering::Acquire)
        {
            warn!(token, current, "Discarding superseded result");
            return Ok(Completion::Superseded);
        }

        match result {
            Ok(buffer) => {
                info!(token, width = buffer.width(), height = buffer.height(), "Committed result");
                self.current = Some(buffer);
                Ok(Completion::Committed)
            }
            Err(e) => {
                warn!(token, error = %e, "Operation failed; keeping previous image");
                Err(e)
            }
        }
    }

    /// Starts, runs and completes `op` on the calling thread.
    pub fn apply(&mut self, op: Operation) -> OpsResult<&PixelBuffer> {
        let pending = self.start(op)?;
        let result = pending.run();
        self.complete(pending.token(), result)?;
        self.current()
    }

    /// Records the first crop corner, replacing any earlier one.
    pub fn begin_selection(&mut self, start: Point) -> OpsResult<()> {
        self.current()?;
        if let SelectionState::Selecting { start: prior } = self.selection {
            debug!(?prior, ?start, "Restarting selection");
        }
        self.selection = SelectionState::Selecting { start };
        Ok(())
    }

    /// Records the second corner and crops to the selection.
    ///
    /// The selection returns to idle whether or not the crop succeeds.
    ///
    /// # Errors
    ///
    /// [`OpsError::NoSelection`] if no selection was begun, otherwise any
    /// crop error.
    pub fn end_selection(&mut self, end: Point) -> OpsResult<&PixelBuffer> {
        let SelectionState::Selecting { start } = std::mem::take(&mut self.selection) else {
            return Err(OpsError::NoSelection);
        };
        self.apply(Operation::Crop { a: start, b: end })
    }

    /// Abandons the selection without cropping.
    pub fn cancel_selection(&mut self) {
        self.selection = SelectionState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(w: u32, h: u32) -> PixelOperationsController {
        let mut ctl = PixelOperationsController::new();
        ctl.load(PixelBuffer::from_fn(w, h, |x, y| [(x * 10) as u8, (y * 10) as u8, 60, 255]));
        ctl
    }

    #[test]
    fn test_operation_names() {
        assert_eq!(Operation::upscale().default_output_name(), "upscaled_image.jpg");
        assert_eq!(Operation::Grayscale.default_output_name(), "processed_image.png");
        assert_eq!(Operation::Sharpen.default_output_name(), "processed_image.png");
        assert_eq!(Operation::upscale().name(), "resample");
    }

    #[test]
    fn test_no_image() {
        let mut ctl = PixelOperationsController::new();
        assert_eq!(ctl.current().unwrap_err(), OpsError::NoImage);
        assert!(matches!(ctl.start(Operation::Grayscale), Err(OpsError::NoImage)));
        assert!(matches!(ctl.begin_selection(Point::new(0, 0)), Err(OpsError::NoImage)));
    }

    #[test]
    fn test_apply_commits() {
        let mut ctl = loaded(4, 4);
        let out = ctl.apply(Operation::upscale()).unwrap();
        assert_eq!(out.dimensions(), (8, 8));
        assert!(!ctl.is_busy());
    }

    #[test]
    fn test_superseded_result_discarded() {
        let mut ctl = loaded(6, 6);
        let before = ctl.current().unwrap().clone();

        let first = ctl.start(Operation::upscale()).unwrap();
        let second = ctl.start(Operation::Grayscale).unwrap();
        assert!(!first.is_current());
        assert!(second.is_current());

        let r = first.run();
        assert_eq!(ctl.complete(first.token(), r).unwrap(), Completion::Superseded);
        assert_eq!(ctl.current().unwrap(), &before);

        let r = second.run();
        assert_eq!(ctl.complete(second.token(), r).unwrap(), Completion::Committed);
        assert_eq!(ctl.current().unwrap().dimensions(), (6, 6));
    }

    #[test]
    fn test_failure_keeps_buffer() {
        let mut ctl = loaded(5, 5);
        let before = ctl.current().unwrap().clone();
        let bad = Operation::Convolve {
            kernel: Kernel {
                weights: vec![1.0; 4],
                size: 2,
                alpha_blend_factor: 0.0,
            },
            edge: EdgePolicy::Truncate,
        };
        assert!(matches!(ctl.apply(bad), Err(OpsError::InvalidKernel(_))));
        assert_eq!(ctl.current().unwrap(), &before);
        assert!(!ctl.is_busy());
    }

    #[test]
    fn test_pending_runs_on_other_thread() {
        let mut ctl = loaded(16, 16);
        let pending = ctl.start(Operation::Sharpen).unwrap();
        let token = pending.token();
        let result = std::thread::spawn(move || pending.run()).join().unwrap();
        assert_eq!(ctl.complete(token, result).unwrap(), Completion::Committed);
    }

    #[test]
    fn test_load_supersedes() {
        let mut ctl = loaded(4, 4);
        let pending = ctl.start(Operation::Grayscale).unwrap();
        ctl.load(PixelBuffer::filled(2, 2, [1, 2, 3, 4]));
        let r = pending.run();
        assert_eq!(ctl.complete(pending.token(), r).unwrap(), Completion::Superseded);
        assert_eq!(ctl.current().unwrap().dimensions(), (2, 2));
    }

    #[test]
    fn test_selection_crop() {
        let mut ctl = loaded(10, 10);
        let src = ctl.current().unwrap().clone();
        ctl.begin_selection(Point::new(7, 7)).unwrap();
        assert_eq!(ctl.selection(), SelectionState::Selecting { start: Point::new(7, 7) });
        let out = ctl.end_selection(Point::new(3, 3)).unwrap().clone();
        assert_eq!(out.dimensions(), (4, 4));
        assert_eq!(out.get(0, 0).unwrap(), src.get(3, 3).unwrap());
        assert_eq!(ctl.selection(), SelectionState::Idle);
    }

    #[test]
    fn test_selection_restart_replaces_start() {
        let mut ctl = loaded(10, 10);
        ctl.begin_selection(Point::new(9, 9)).unwrap();
        ctl.begin_selection(Point::new(1, 1)).unwrap();
        let out = ctl.end_selection(Point::new(3, 4)).unwrap();
        assert_eq!(out.dimensions(), (2, 3));
    }

    #[test]
    fn test_selection_errors() {
        let mut ctl = loaded(10, 10);
        assert_eq!(ctl.end_selection(Point::new(1, 1)).unwrap_err(), OpsError::NoSelection);

        ctl.begin_selection(Point::new(2, 2)).unwrap();
        ctl.cancel_selection();
        assert_eq!(ctl.end_selection(Point::new(5, 5)).unwrap_err(), OpsError::NoSelection);

        ctl.begin_selection(Point::new(4, 4)).unwrap();
        assert_eq!(ctl.end_selection(Point::new(4, 8)).unwrap_err(), OpsError::EmptySelection);
        assert_eq!(ctl.selection(), SelectionState::Idle);
        assert_eq!(ctl.current().unwrap().dimensions(), (10, 10));
    }

    #[test]
    fn test_parallel_threshold() {
        let mut ctl = PixelOperationsController::with_config(ControllerConfig { parallel_threshold: 0 });
        ctl.load(PixelBuffer::filled(9, 9, [50, 60, 70, 255]));
        let par = ctl.apply(Operation::Sharpen).unwrap().clone();
        let serial = Operation::Sharpen.apply(&PixelBuffer::filled(9, 9, [50, 60, 70, 255])).unwrap();
        assert_eq!(par, serial);
    }
}
