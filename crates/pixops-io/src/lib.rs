//! # pixops-io
//!
//! Decode and encode [`PixelBuffer`]s.
//!
//! Every decoder yields RGBA8, whatever the file stored.
//!
//! - **PNG** - 8/16-bit gray, gray+alpha, RGB, RGBA, palette; written as RGBA8
//! - **JPEG** - RGB, grayscale, CMYK; written as RGB, alpha dropped
//!
//! # Architecture
//!
//! - [`ImageDecoder`] / [`ImageEncoder`] - Per-format codec traits
//! - [`read`] / [`write`] - Path-based with format auto-detection
//! - [`decode`] / [`encode`] - In-memory
//!
//! # Quick Start
//!
//! ```rust
//! use pixops_core::PixelBuffer;
//! use pixops_io::Format;
//!
//! let src = PixelBuffer::filled(2, 2, [255, 0, 0, 128]);
//! let bytes = pixops_io::encode(&src, Format::Png).unwrap();
//! assert_eq!(pixops_io::decode(&bytes).unwrap(), src);
//! ```
//!
//! # Feature Flags
//!
//! - `png` - PNG support (default)
//! - `jpeg` - JPEG support (default)

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod detect;
mod error;
mod traits;

#[cfg(feature = "png")]
pub mod png;

#[cfg(feature = "jpeg")]
pub mod jpeg;

pub use detect::Format;
pub use error::{IoError, IoResult};
pub use traits::{ImageDecoder, ImageEncoder};

use pixops_core::PixelBuffer;
use std::path::Path;
use tracing::debug;

/// Decodes an in-memory file, detecting the format from its magic bytes.
pub fn decode(data: &[u8]) -> IoResult<PixelBuffer> {
    decode_as(data, Format::from_bytes(data))
}

/// Decodes an in-memory file of a known format.
pub fn decode_as(data: &[u8], format: Format) -> IoResult<PixelBuffer> {
    match format {
        #[cfg(feature = "png")]
        Format::Png => png::PngCodec.decode(data),

        #[cfg(feature = "jpeg")]
        Format::Jpeg => jpeg::JpegCodec::new().decode(data),

        other => Err(IoError::UnsupportedFormat(other.name().to_string())),
    }
}

/// Encodes `buffer` as `format`, JPEG at the default quality.
pub fn encode(buffer: &PixelBuffer, format: Format) -> IoResult<Vec<u8>> {
    match format {
        #[cfg(feature = "png")]
        Format::Png => png::PngCodec.encode(buffer),

        #[cfg(feature = "jpeg")]
        Format::Jpeg => jpeg::JpegCodec::new().encode(buffer),

        other => Err(IoError::UnsupportedFormat(other.name().to_string())),
    }
}

/// Reads an image file.
///
/// Format is detected from magic bytes, falling back to the extension.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<PixelBuffer> {
    let path = path.as_ref();
    let format = Format::detect(path)?;
    debug!(path = %path.display(), %format, "Reading image");

    if format == Format::Unknown {
        return Err(unsupported(path));
    }
    let data = std::fs::read(path)?;
    decode_as(&data, format)
}

/// Writes an image file, choosing the format from the extension.
pub fn write<P: AsRef<Path>>(path: P, buffer: &PixelBuffer) -> IoResult<()> {
    let path = path.as_ref();
    let format = Format::from_extension(path);
    debug!(path = %path.display(), %format, "Writing image");

    if format == Format::Unknown {
        return Err(unsupported(path));
    }
    let data = encode(buffer, format)?;
    std::fs::write(path, data)?;
    Ok(())
}

fn unsupported(path: &Path) -> IoError {
    IoError::UnsupportedFormat(
        path.extension()
            .and_then(|e| e.to_str())
            .unwrap_or("unknown")
            .to_string(),
    )
}
