//! # pixops-core
//!
//! Core types for pixel-level image transformation.
//!
//! This crate provides the foundational types used throughout pixops:
//!
//! - [`PixelBuffer`] - Owned RGBA8 bitmap with bounds-checked pixel access
//! - [`Rect`], [`Point`] - Selection geometry
//! - [`Error`] - Bounds and dimension errors
//!
//! ## Design Philosophy
//!
//! Buffers are values. Every transform borrows its input and returns a
//! freshly allocated buffer, so a buffer that has been handed to someone
//! else is never mutated underneath them:
//!
//! ```
//! use pixops_core::PixelBuffer;
//!
//! let white = PixelBuffer::filled(4, 4, [255, 255, 255, 255]);
//! let mut copy = white.clone();            // shares storage
//! copy.set(0, 0, [0, 0, 0, 255]).unwrap(); // copy-on-write
//! assert_eq!(white.get(0, 0).unwrap(), [255, 255, 255, 255]);
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//! pixops-core (this crate)
//!    ^
//!    |
//!    +-- pixops-ops (grayscale, convolution, crop, resample, controller)
//!    +-- pixops-io  (PNG / JPEG decode and encode)
//!    +-- pixops-cli
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod buffer;
pub mod error;
pub mod rect;

pub use buffer::{PixelBuffer, Rgba, CHANNELS};
pub use error::{Error, Result};
pub use rect::{Point, Rect};

/// Prelude module for convenient imports.
///
/// ```
/// use pixops_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::buffer::{PixelBuffer, Rgba, CHANNELS};
    pub use crate::error::{Error, Result};
    pub use crate::rect::{Point, Rect};
}
