//! JPEG format support.
//!
//! Decoding accepts RGB, grayscale (8 and 16 bit) and CMYK streams and
//! yields opaque RGBA8. Encoding drops alpha and writes baseline RGB at a
//! configurable quality.
//!
//! # Example
//!
//! ```rust
//! use pixops_core::PixelBuffer;
//! use pixops_io::jpeg::JpegCodec;
//! use pixops_io::{ImageDecoder, ImageEncoder};
//!
//! let codec = JpegCodec::with_quality(95).unwrap();
//! let bytes = codec.encode(&PixelBuffer::filled(8, 8, [128, 128, 128, 10])).unwrap();
//! let back = codec.decode(&bytes).unwrap();
//! assert_eq!(back.get(0, 0).unwrap()[3], 255);
//! ```

use crate::{ImageDecoder, ImageEncoder, IoError, IoResult};
use pixops_core::PixelBuffer;
use tracing::{debug, trace};

/// Default encode quality.
pub const DEFAULT_QUALITY: u8 = 90;

/// JPEG codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegCodec {
    quality: u8,
}

impl JpegCodec {
    /// Codec with [`DEFAULT_QUALITY`].
    pub fn new() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
        }
    }

    /// Codec with a quality in 1..=100.
    pub fn with_quality(quality: u8) -> IoResult<Self> {
        if !(1..=100).contains(&quality) {
            return Err(IoError::EncodeError(format!("JPEG quality {quality} outside 1..=100")));
        }
        Ok(Self { quality })
    }

    /// Encode quality.
    pub fn quality(&self) -> u8 {
        self.quality
    }
}

impl Default for JpegCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageDecoder for JpegCodec {
    fn format_name(&self) -> &'static str {
        "JPEG"
    }

    fn decode(&self, data: &[u8]) -> IoResult<PixelBuffer> {
        trace!(len = data.len(), "jpeg decode");

        let mut decoder = jpeg_decoder::Decoder::new(data);
        let pixels = decoder.decode().map_err(|e| IoError::DecodeError(e.to_string()))?;
        let info = decoder
            .info()
            .ok_or_else(|| IoError::DecodeError("missing JPEG info".into()))?;
        debug!(width = info.width, height = info.height, format = ?info.pixel_format, "JPEG frame");

        let rgba: Vec<u8> = match info.pixel_format {
            jpeg_decoder::PixelFormat::RGB24 => pixels
                .chunks_exact(3)
                .flat_map(|p| [p[0], p[1], p[2], 255])
                .collect(),
            jpeg_decoder::PixelFormat::L8 => pixels.iter().flat_map(|&g| [g, g, g, 255]).collect(),
            // big-endian, keep the high byte
            jpeg_decoder::PixelFormat::L16 => pixels
                .chunks_exact(2)
                .flat_map(|l| [l[0], l[0], l[0], 255])
                .collect(),
            jpeg_decoder::PixelFormat::CMYK32 => pixels
                .chunks_exact(4)
                .flat_map(|p| {
                    let k = 255 - p[3] as u32;
                    let ch = |v: u8| ((255 - v as u32) * k / 255) as u8;
                    [ch(p[0]), ch(p[1]), ch(p[2]), 255]
                })
                .collect(),
        };

        Ok(PixelBuffer::from_samples(info.width as u32, info.height as u32, rgba)?)
    }
}

impl ImageEncoder for JpegCodec {
    fn format_name(&self) -> &'static str {
        "JPEG"
    }

    fn encode(&self, buffer: &PixelBuffer) -> IoResult<Vec<u8>> {
        use jpeg_encoder::{ColorType, Encoder};

        trace!(width = buffer.width(), height = buffer.height(), quality = self.quality, "jpeg encode");

        let (w, h) = buffer.dimensions();
        if w > u16::MAX as u32 || h > u16::MAX as u32 {
            return Err(IoError::EncodeError(format!("{w}x{h} exceeds JPEG limits")));
        }

        let mut out = Vec::new();
        let encoder = Encoder::new(&mut out, self.quality);
        encoder
            .encode(buffer.samples(), w as u16, h as u16, ColorType::Rgba)
            .map_err(|e: jpeg_encoder::EncodingError| IoError::EncodeError(e.to_string()))?;
        Ok(out)
    }
}
