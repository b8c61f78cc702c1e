//! RGBA8 pixel buffer.
//!
//! [`PixelBuffer`] is the only bitmap type in pixops. It stores samples
//! in **row-major** order, top-to-bottom, with the four channels of a pixel
//! interleaved:
//!
//! ```text
//! Memory: [R G B A R G B A R G B A ...]  ← Row 0
//!         [R G B A R G B A R G B A ...]  ← Row 1
//!         ...
//! ```
//!
//! # Memory Management
//!
//! Samples live in an [`Arc<Vec<u8>>`]:
//! - Cloning a buffer is cheap and shares the samples
//! - [`set`](PixelBuffer::set) is copy-on-write, so mutating a clone never
//!   touches a buffer someone else is holding
//! - Buffers are `Send + Sync` and can be read from many threads at once
//!
//! # Bounds
//!
//! [`get`](PixelBuffer::get) and [`set`](PixelBuffer::set) check their
//! coordinates and return [`Error::OutOfBounds`] instead of clamping.
//! Callers pass raw coordinates.

use crate::{Error, Rect, Result};
use std::sync::Arc;

/// Number of interleaved channels per pixel (R, G, B, A).
pub const CHANNELS: usize = 4;

/// One pixel as `[r, g, b, a]`.
pub type Rgba = [u8; CHANNELS];

/// Owned RGBA8 bitmap.
///
/// # Invariants
///
/// - `samples.len() == width * height * 4`
/// - a buffer with zero width or height is empty and holds no samples
///
/// # Example
///
/// ```rust
/// use pixops_core::PixelBuffer;
///
/// let mut buf = PixelBuffer::with_dimensions(2, 2);
/// buf.set(1, 0, [255, 0, 0, 255]).unwrap();
/// assert_eq!(buf.get(1, 0).unwrap(), [255, 0, 0, 255]);
/// assert!(buf.get(2, 0).is_err());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Interleaved RGBA samples (Arc for cheap cloning)
    samples: Arc<Vec<u8>>,
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
}

/// Computes `width * height * 4` without overflowing `usize`.
fn sample_len(width: u32, height: u32) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(CHANNELS))
        .ok_or_else(|| Error::invalid_dimensions(width, height, "sample count overflows"))
}

fn sample_len_or_panic(width: u32, height: u32) -> usize {
    match sample_len(width, height) {
        Ok(len) => len,
        Err(e) => panic!("{e}"),
    }
}

impl PixelBuffer {
    /// Creates a zero-filled buffer (transparent black).
    ///
    /// # Panics
    ///
    /// Panics if `width * height * 4` overflows `usize`. Use
    /// [`try_with_dimensions`](Self::try_with_dimensions) when the
    /// dimensions come from untrusted arithmetic.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        let len = sample_len_or_panic(width, height);
        Self {
            samples: Arc::new(vec![0u8; len]),
            width,
            height,
        }
    }

    /// Creates a zero-filled buffer, failing with
    /// [`Error::InvalidDimensions`] if the sample count overflows.
    pub fn try_with_dimensions(width: u32, height: u32) -> Result<Self> {
        let len = sample_len(width, height)?;
        Ok(Self {
            samples: Arc::new(vec![0u8; len]),
            width,
            height,
        })
    }

    /// Wraps existing interleaved RGBA samples.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if `samples.len()` is not
    /// `width * height * 4`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pixops_core::PixelBuffer;
    ///
    /// let buf = PixelBuffer::from_samples(1, 1, vec![1, 2, 3, 4]).unwrap();
    /// assert_eq!(buf.get(0, 0).unwrap(), [1, 2, 3, 4]);
    /// assert!(PixelBuffer::from_samples(2, 2, vec![0; 3]).is_err());
    /// ```
    pub fn from_samples(width: u32, height: u32, samples: Vec<u8>) -> Result<Self> {
        let expected = sample_len(width, height)?;
        if samples.len() != expected {
            return Err(Error::invalid_dimensions(
                width,
                height,
                format!("expected {} samples, got {}", expected, samples.len()),
            ));
        }
        Ok(Self {
            samples: Arc::new(samples),
            width,
            height,
        })
    }

    /// Creates a buffer with every pixel set to `pixel`.
    ///
    /// # Panics
    ///
    /// Panics if `width * height * 4` overflows `usize`.
    pub fn filled(width: u32, height: u32, pixel: Rgba) -> Self {
        let len = sample_len_or_panic(width, height);
        let mut samples = Vec::with_capacity(len);
        for _ in 0..len / CHANNELS {
            samples.extend_from_slice(&pixel);
        }
        Self {
            samples: Arc::new(samples),
            width,
            height,
        }
    }

    /// Creates a buffer by evaluating `f(x, y)` for every pixel.
    ///
    /// ```rust
    /// use pixops_core::PixelBuffer;
    ///
    /// let ramp = PixelBuffer::from_fn(4, 1, |x, _| [x as u8 * 10, 0, 0, 255]);
    /// assert_eq!(ramp.get(3, 0).unwrap(), [30, 0, 0, 255]);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `width * height * 4` overflows `usize`.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> Rgba,
    {
        let mut samples = Vec::with_capacity(sample_len_or_panic(width, height));
        for y in 0..height {
            for x in 0..width {
                samples.extend_from_slice(&f(x, y));
            }
        }
        Self {
            samples: Arc::new(samples),
            width,
            height,
        }
    }

    /// Returns the width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns (width, height).
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns a rectangle covering the whole buffer.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Returns the number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns `true` if the buffer has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns the number of bytes in one row.
    #[inline]
    pub fn row_len(&self) -> usize {
        self.width as usize * CHANNELS
    }

    /// Returns the raw interleaved samples.
    #[inline]
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// Consumes the buffer and returns its samples, copying only if the
    /// storage is still shared.
    pub fn into_samples(self) -> Vec<u8> {
        Arc::try_unwrap(self.samples).unwrap_or_else(|shared| (*shared).clone())
    }

    #[inline]
    fn check(&self, x: u32, y: u32) -> Result<usize> {
        if x >= self.width || y >= self.height {
            return Err(Error::out_of_bounds(x, y, self.width, self.height));
        }
        Ok((y as usize * self.width as usize + x as usize) * CHANNELS)
    }

    /// Returns the pixel at (x, y).
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] if `x >= width` or `y >= height`.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Result<Rgba> {
        let offset = self.check(x, y)?;
        let mut px = [0u8; CHANNELS];
        px.copy_from_slice(&self.samples[offset..offset + CHANNELS]);
        Ok(px)
    }

    /// Sets the pixel at (x, y).
    ///
    /// Copy-on-write: if the samples are shared with another buffer they
    /// are cloned first, so other holders never observe the write.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] if `x >= width` or `y >= height`.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, pixel: Rgba) -> Result<()> {
        let offset = self.check(x, y)?;
        let samples = Arc::make_mut(&mut self.samples);
        samples[offset..offset + CHANNELS].copy_from_slice(&pixel);
        Ok(())
    }

    /// Returns row `y` as a slice of `width * 4` samples.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] if `y >= height`.
    pub fn row(&self, y: u32) -> Result<&[u8]> {
        if y >= self.height {
            return Err(Error::out_of_bounds(0, y, self.width, self.height));
        }
        let start = y as usize * self.row_len();
        Ok(&self.samples[start..start + self.row_len()])
    }

    /// Returns a new buffer with `f` applied to every pixel.
    ///
    /// ```rust
    /// use pixops_core::PixelBuffer;
    ///
    /// let src = PixelBuffer::filled(2, 2, [10, 20, 30, 255]);
    /// let inverted = src.map_pixels(|[r, g, b, a]| [255 - r, 255 - g, 255 - b, a]);
    /// assert_eq!(inverted.get(1, 1).unwrap(), [245, 235, 225, 255]);
    /// ```
    pub fn map_pixels<F>(&self, f: F) -> PixelBuffer
    where
        F: Fn(Rgba) -> Rgba,
    {
        let mut samples = self.samples.as_ref().clone();
        for chunk in samples.chunks_exact_mut(CHANNELS) {
            let px = f([chunk[0], chunk[1], chunk[2], chunk[3]]);
            chunk.copy_from_slice(&px);
        }
        Self {
            samples: Arc::new(samples),
            width: self.width,
            height: self.height,
        }
    }

    /// Iterates over all pixels with their coordinates, row by row.
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32, Rgba)> + '_ {
        let width = self.width.max(1);
        self.samples
            .chunks_exact(CHANNELS)
            .enumerate()
            .map(move |(i, px)| {
                let i = i as u32;
                (i % width, i / width, [px[0], px[1], px[2], px[3]])
            })
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("samples", &self.samples.len())
            .finish()
    }
}
