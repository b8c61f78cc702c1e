//! Rectangular crop.
//!
//! A crop is specified by two corner points in either order; see
//! [`Rect::from_points`]. The far corner is exclusive.
//!
//! # Example
//!
//! ```rust
//! use pixops_core::{PixelBuffer, Point};
//! use pixops_ops::crop::crop;
//!
//! let src = PixelBuffer::filled(10, 10, [1, 2, 3, 255]);
//! let out = crop(&src, Point::new(7, 7), Point::new(3, 3)).unwrap();
//! assert_eq!(out.dimensions(), (4, 4));
//! ```

use crate::{OpsError, OpsResult};
use pixops_core::{Error, PixelBuffer, Point, Rect, CHANNELS};
use tracing::{debug, trace};

/// Crops the region spanned by two points.
///
/// # Errors
///
/// - [`OpsError::EmptySelection`] if the points share an x or y coordinate
/// - [`OpsError::Core`] with [`Error::InvalidRegion`] if the region extends
///   past the buffer
pub fn crop(src: &PixelBuffer, a: Point, b: Point) -> OpsResult<PixelBuffer> {
    crop_rect(src, Rect::from_points(a, b))
}

/// Crops a normalized rectangle.
///
/// Output pixel (i, j) equals source pixel (rect.x + i, rect.y + j).
pub fn crop_rect(src: &PixelBuffer, rect: Rect) -> OpsResult<PixelBuffer> {
    trace!(width = src.width(), height = src.height(), %rect, "crop");

    if rect.is_empty() {
        return Err(OpsError::EmptySelection);
    }
    if !rect.fits_within(src.width(), src.height()) {
        return Err(Error::invalid_region(rect, src.width(), src.height()).into());
    }

    if rect == src.bounds() {
        debug!("Crop covers the whole buffer");
        return Ok(src.clone());
    }

    let x0 = rect.x as usize * CHANNELS;
    let x1 = rect.right() as usize * CHANNELS;
    let mut out = Vec::with_capacity(rect.area() as usize * CHANNELS);
    for y in rect.y..rect.bottom() {
        out.extend_from_slice(&src.row(y)?[x0..x1]);
    }

    Ok(PixelBuffer::from_samples(rect.width, rect.height, out)?)
}
