//! Ratio-based resampling.
//!
//! # Filters
//!
//! - [`Filter::Nearest`] - Pixel replication, no interpolation (blocky)
//! - [`Filter::Bilinear`] - Four-neighbour linear interpolation (smooth)
//!
//! The output is `round(width * factor)` by `round(height * factor)`,
//! never smaller than 1x1 for a non-empty source. Destination pixel
//! `(x, y)` samples the source at `(x / factor, y / factor)`, so a factor
//! of exactly 1 reproduces the input.
//!
//! # Example
//!
//! ```rust
//! use pixops_core::PixelBuffer;
//! use pixops_ops::resize::{resample, Filter};
//!
//! let src = PixelBuffer::filled(3, 2, [0, 128, 255, 255]);
//! let dst = resample(&src, 2.0, Filter::Bilinear).unwrap();
//! assert_eq!(dst.dimensions(), (6, 4));
//! ```

use crate::{OpsError, OpsResult};
use pixops_core::{Error, PixelBuffer, CHANNELS};
use tracing::{debug, trace};

/// Resampling filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    /// Nearest-neighbor (fastest, no interpolation).
    Nearest,
    /// Bilinear interpolation (smooth, fast).
    #[default]
    Bilinear,
}

impl std::str::FromStr for Filter {
    type Err = OpsError;

    fn from_str(s: &str) -> OpsResult<Self> {
        match s.to_lowercase().as_str() {
            "nearest" | "point" => Ok(Filter::Nearest),
            "bilinear" | "linear" | "triangle" => Ok(Filter::Bilinear),
            other => Err(OpsError::InvalidParameter(format!("unknown filter '{other}'"))),
        }
    }
}

/// A validated, strictly positive and finite scale factor.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    /// Validates `factor`.
    ///
    /// # Errors
    ///
    /// [`OpsError::InvalidScale`] for zero, negative, NaN or infinite values.
    pub fn new(factor: f64) -> OpsResult<Self> {
        if factor.is_finite() && factor > 0.0 {
            Ok(Self(factor))
        } else {
            Err(OpsError::InvalidScale(factor))
        }
    }

    /// Returns the raw factor.
    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for ScaleFactor {
    /// The default upscale ratio, 2x.
    fn default() -> Self {
        Self(2.0)
    }
}

impl std::fmt::Display for ScaleFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x", self.0)
    }
}

/// Computes the output dimensions for `factor`.
///
/// ```rust
/// use pixops_ops::resize::{output_dimensions, ScaleFactor};
///
/// let f = ScaleFactor::new(0.01).unwrap();
/// assert_eq!(output_dimensions(10, 10, f).unwrap(), (1, 1));
/// ```
pub fn output_dimensions(width: u32, height: u32, factor: ScaleFactor) -> OpsResult<(u32, u32)> {
    if width == 0 || height == 0 {
        return Ok((0, 0));
    }
    let scale = |n: u32| -> OpsResult<u32> {
        let v = (n as f64 * factor.get()).round().max(1.0);
        if v > u32::MAX as f64 {
            return Err(Error::invalid_dimensions(width, height, format!("scaling by {factor} overflows")).into());
        }
        Ok(v as u32)
    };
    Ok((scale(width)?, scale(height)?))
}

/// Source sample positions and weights along one axis.
#[derive(Debug, Clone, Copy)]
struct Tap {
    i0: usize,
    i1: usize,
    frac: f32,
}

#[inline]
fn tap(dst: u32, factor: f64, len: u32, filter: Filter) -> Tap {
    let last = len as usize - 1;
    let pos = dst as f64 / factor;
    match filter {
        Filter::Nearest => {
            let i = (pos.floor() as usize).min(last);
            Tap { i0: i, i1: i, frac: 0.0 }
        }
        Filter::Bilinear => {
            let base = pos.floor();
            let i0 = (base as usize).min(last);
            Tap {
                i0,
                i1: (i0 + 1).min(last),
                frac: (pos - base) as f32,
            }
        }
    }
}

/// Resamples one output row of width `out.len() / 4`.
///
/// Shared with the parallel path.
pub(crate) fn resample_row(src: &PixelBuffer, factor: ScaleFactor, filter: Filter, y: u32, out: &mut [u8]) {
    let (width, height) = src.dimensions();
    let samples = src.samples();
    let stride = width as usize * CHANNELS;
    let ty = tap(y, factor.get(), height, filter);

    for (x, px) in out.chunks_exact_mut(CHANNELS).enumerate() {
        let tx = tap(x as u32, factor.get(), width, filter);
        let p00 = ty.i0 * stride + tx.i0 * CHANNELS;
        let p10 = ty.i0 * stride + tx.i1 * CHANNELS;
        let p01 = ty.i1 * stride + tx.i0 * CHANNELS;
        let p11 = ty.i1 * stride + tx.i1 * CHANNELS;

        for c in 0..CHANNELS {
            let top = samples[p00 + c] as f32 * (1.0 - tx.frac) + samples[p10 + c] as f32 * tx.frac;
            let bottom = samples[p01 + c] as f32 * (1.0 - tx.frac) + samples[p11 + c] as f32 * tx.frac;
            let v = top * (1.0 - ty.frac) + bottom * ty.frac;
            px[c] = v.round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Validates the factor and allocates the destination buffer.
pub(crate) fn prepare(src: &PixelBuffer, factor: f64) -> OpsResult<(ScaleFactor, PixelBuffer)> {
    let factor = ScaleFactor::new(factor)?;
    let (w, h) = output_dimensions(src.width(), src.height(), factor)?;
    debug!(src_w = src.width(), src_h = src.height(), dst_w = w, dst_h = h, "Resample target");
    Ok((factor, PixelBuffer::try_with_dimensions(w, h)?))
}

/// Resamples `src` by `factor`.
///
/// # Errors
///
/// - [`OpsError::InvalidScale`] if `factor` is not positive and finite
/// - [`OpsError::Core`] if the output size overflows
pub fn resample(src: &PixelBuffer, factor: f64, filter: Filter) -> OpsResult<PixelBuffer> {
    trace!(width = src.width(), height = src.height(), factor, ?filter, "resample");

    let (factor, dst) = prepare(src, factor)?;
    if dst.is_empty() {
        return Ok(dst);
    }

    let (w, h) = dst.dimensions();
    let mut out = dst.into_samples();
    for (y, row) in out.chunks_exact_mut(w as usize * CHANNELS).enumerate() {
        resample_row(src, factor, filter, y as u32, row);
    }

    Ok(PixelBuffer::from_samples(w, h, out)?)
}

/// Convenience: bilinear upscale by `factor`.
pub fn upscale(src: &PixelBuffer, factor: f64) -> OpsResult<PixelBuffer> {
    resample(src, factor, Filter::Bilinear)
}
