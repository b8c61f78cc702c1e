//! Grayscale conversion.
//!
//! Luminance here is the unweighted mean of R, G and B, not a perceptual
//! (Rec.601/709) luma. The mean is taken in integer arithmetic, so
//! `(200, 100, 50)` becomes `116`. Alpha is copied through.
//!
//! # Example
//!
//! ```rust
//! use pixops_core::PixelBuffer;
//! use pixops_ops::grayscale::grayscale;
//!
//! let src = PixelBuffer::filled(2, 2, [10, 20, 30, 128]);
//! let gray = grayscale(&src);
//! assert_eq!(gray.get(0, 0).unwrap(), [20, 20, 20, 128]);
//! ```

use pixops_core::{PixelBuffer, Rgba};
use tracing::trace;

/// Mean of the R, G, B channels of a pixel, truncated.
#[inline]
pub fn luminance(px: Rgba) -> u8 {
    // max sum is 765, so the quotient always fits in u8
    ((px[0] as u16 + px[1] as u16 + px[2] as u16) / 3) as u8
}

/// Returns a desaturated copy of `src` with identical dimensions.
///
/// Idempotent: a gray pixel has R = G = B, so its mean is itself.
pub fn grayscale(src: &PixelBuffer) -> PixelBuffer {
    trace!(width = src.width(), height = src.height(), "grayscale");

    src.map_pixels(|px| {
        let l = luminance(px);
        [l, l, l, px[3]]
    })
}
