//! # pixops-ops
//!
//! Pixel operations over [`PixelBuffer`](pixops_core::PixelBuffer).
//!
//! Every transform borrows its input and returns a new buffer.
//!
//! # Modules
//!
//! - [`grayscale`] - Unweighted RGB mean
//! - [`filter`] - Square-kernel convolution (sharpen, blur, edge, emboss)
//! - [`crop`] - Rectangular extraction from two corner points
//! - [`resize`] - Ratio-based resampling
//! - [`parallel`] - Rayon row-parallel convolution and resampling
//! - [`controller`] - Operation dispatch and the editing session state machine
//!
//! # Example
//!
//! ```rust
//! use pixops_core::{PixelBuffer, Point};
//! use pixops_ops::{crop, filter, grayscale, resize};
//!
//! let src = PixelBuffer::filled(16, 16, [200, 100, 50, 255]);
//! let gray = grayscale::grayscale(&src);
//! let sharp = filter::sharpen(&gray).unwrap();
//! let part = crop::crop(&sharp, Point::new(4, 4), Point::new(12, 10)).unwrap();
//! let big = resize::upscale(&part, 2.0).unwrap();
//! assert_eq!(big.dimensions(), (16, 12));
//! ```
//!
//! # Feature Flags
//!
//! - `parallel` - Rayon-backed [`parallel`] module (default)

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod controller;
pub mod crop;
pub mod filter;
pub mod grayscale;
pub mod resize;

#[cfg(feature = "parallel")]
pub mod parallel;

pub use controller::{
    Completion, ControllerConfig, Operation, PendingOperation, PixelOperationsController, SelectionState,
};
pub use error::{OpsError, OpsResult};
pub use filter::{EdgePolicy, Kernel};
pub use resize::{Filter, ScaleFactor};
