//! Parallel convolution and resampling using Rayon.
//!
//! Each output row depends only on a bounded band of input rows, so rows
//! are handed to workers with `par_chunks_mut` and written independently.
//! Results are bit-identical to [`crate::filter`] and [`crate::resize`].
//!
//! # Example
//!
//! ```rust
//! use pixops_core::PixelBuffer;
//! use pixops_ops::{filter::Kernel, parallel};
//!
//! let src = PixelBuffer::filled(256, 256, [10, 20, 30, 255]);
//! let sharp = parallel::convolve(&src, &Kernel::sharpen()).unwrap();
//! assert_eq!(sharp.dimensions(), (256, 256));
//! ```

use crate::filter::{convolve_row, EdgePolicy, Kernel};
use crate::resize::{prepare, resample_row, Filter};
use crate::OpsResult;
use pixops_core::{PixelBuffer, CHANNELS};
use rayon::prelude::*;
use tracing::trace;

/// Parallel [`crate::filter::convolve`] with [`EdgePolicy::Truncate`].
pub fn convolve(src: &PixelBuffer, kernel: &Kernel) -> OpsResult<PixelBuffer> {
    convolve_with(src, kernel, EdgePolicy::Truncate)
}

/// Parallel [`crate::filter::convolve_with`].
pub fn convolve_with(src: &PixelBuffer, kernel: &Kernel, edge: EdgePolicy) -> OpsResult<PixelBuffer> {
    trace!(width = src.width(), height = src.height(), size = kernel.size, ?edge, "par_convolve");
    kernel.validate()?;

    if src.is_empty() {
        return Ok(src.clone());
    }

    let mut out = vec![0u8; src.samples().len()];
    out.par_chunks_mut(src.row_len())
        .enumerate()
        .for_each(|(y, row)| convolve_row(src, kernel, edge, y as u32, row));

    Ok(PixelBuffer::from_samples(src.width(), src.height(), out)?)
}

/// Parallel [`crate::resize::resample`].
pub fn resample(src: &PixelBuffer, factor: f64, filter: Filter) -> OpsResult<PixelBuffer> {
    trace!(width = src.width(), height = src.height(), factor, ?filter, "par_resample");

    let (factor, dst) = prepare(src, factor)?;
    if dst.is_empty() {
        return Ok(dst);
    }

    let (w, h) = dst.dimensions();
    let mut out = dst.into_samples();
    out.par_chunks_mut(w as usize * CHANNELS)
        .enumerate()
        .for_each(|(y, row)| resample_row(src, factor, filter, y as u32, row));

    Ok(PixelBuffer::from_samples(w, h, out)?)
}
