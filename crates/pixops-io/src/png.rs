//! PNG format support.
//!
//! Decoding accepts 8- and 16-bit grayscale, grayscale+alpha, RGB, RGBA
//! and palette images and always yields RGBA8: palettes and low bit depths
//! are expanded, 16-bit samples keep their high byte, and missing alpha is
//! opaque. Encoding always writes 8-bit RGBA, so a round trip is exact.
//!
//! # Example
//!
//! ```rust
//! use pixops_core::PixelBuffer;
//! use pixops_io::png::PngCodec;
//! use pixops_io::{ImageDecoder, ImageEncoder};
//!
//! let src = PixelBuffer::filled(3, 2, [10, 20, 30, 40]);
//! let bytes = PngCodec.encode(&src).unwrap();
//! assert_eq!(PngCodec.decode(&bytes).unwrap(), src);
//! ```

use crate::{ImageDecoder, ImageEncoder, IoError, IoResult};
use pixops_core::PixelBuffer;
use std::io::Cursor;
use tracing::{debug, trace};

/// PNG codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngCodec;

impl ImageDecoder for PngCodec {
    fn format_name(&self) -> &'static str {
        "PNG"
    }

    fn decode(&self, data: &[u8]) -> IoResult<PixelBuffer> {
        trace!(len = data.len(), "png decode");

        let mut decoder = png::Decoder::new(Cursor::new(data));
        decoder.set_transformations(png::Transformations::EXPAND);
        let mut reader = decoder
            .read_info()
            .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;

        let buf_size = reader
            .output_buffer_size()
            .ok_or_else(|| IoError::DecodeError("cannot determine output buffer size".into()))?;
        let mut buf = vec![0u8; buf_size];
        let info = reader
            .next_frame(&mut buf)
            .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;

        debug!(
            width = info.width,
            height = info.height,
            color = ?info.color_type,
            depth = ?info.bit_depth,
            "PNG frame"
        );
        let rgba = to_rgba8(info.color_type, info.bit_depth, &buf[..info.buffer_size()])?;
        Ok(PixelBuffer::from_samples(info.width, info.height, rgba)?)
    }
}

impl ImageEncoder for PngCodec {
    fn format_name(&self) -> &'static str {
        "PNG"
    }

    fn encode(&self, buffer: &PixelBuffer) -> IoResult<Vec<u8>> {
        trace!(width = buffer.width(), height = buffer.height(), "png encode");

        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, buffer.width(), buffer.height());
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            encoder.set_compression(png::Compression::default());
            encoder.set_source_srgb(png::SrgbRenderingIntent::Perceptual);

            let mut writer = encoder
                .write_header()
                .map_err(|e| IoError::EncodeError(e.to_string()))?;
            writer
                .write_image_data(buffer.samples())
                .map_err(|e| IoError::EncodeError(e.to_string()))?;
            writer.finish().map_err(|e| IoError::EncodeError(e.to_string()))?;
        }
        Ok(out)
    }
}

/// Expands a decoded frame to RGBA8.
fn to_rgba8(color: png::ColorType, depth: png::BitDepth, data: &[u8]) -> IoResult<Vec<u8>> {
    let narrowed;
    let samples: &[u8] = match depth {
        png::BitDepth::Eight => data,
        // big-endian, keep the high byte
        png::BitDepth::Sixteen => {
            narrowed = data.chunks_exact(2).map(|s| s[0]).collect::<Vec<u8>>();
            &narrowed
        }
        other => {
            return Err(IoError::DecodeError(format!("unexpected bit depth {other:?} after expansion")));
        }
    };

    let rgba = match color {
        png::ColorType::Rgba => samples.to_vec(),
        png::ColorType::Rgb => samples
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        png::ColorType::Grayscale => samples.iter().flat_map(|&g| [g, g, g, 255]).collect(),
        png::ColorType::GrayscaleAlpha => samples
            .chunks_exact(2)
            .flat_map(|ga| [ga[0], ga[0], ga[0], ga[1]])
            .collect(),
        png::ColorType::Indexed => {
            return Err(IoError::DecodeError("palette was not expanded".into()));
        }
    };
    Ok(rgba)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_png(w: u32, h: u32, color: png::ColorType, depth: png::BitDepth, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut enc = png::Encoder::new(&mut out, w, h);
            enc.set_color(color);
            enc.set_depth(depth);
            let mut wr = enc.write_header().unwrap();
            wr.write_image_data(data).unwrap();
            wr.finish().unwrap();
        }
        out
    }

    #[test]
    fn test_roundtrip_rgba_exact() {
        let src = PixelBuffer::from_fn(16, 9, |x, y| [(x * 16) as u8, (y * 28) as u8, 64, (x * y) as u8]);
        let bytes = PngCodec.encode(&src).unwrap();
        assert_eq!(crate::Format::from_bytes(&bytes), crate::Format::Png);
        assert_eq!(PngCodec.decode(&bytes).unwrap(), src);
    }

    #[test]
    fn test_decode_gray8() {
        let bytes = raw_png(2, 1, png::ColorType::Grayscale, png::BitDepth::Eight, &[7, 200]);
        let buf = PngCodec.decode(&bytes).unwrap();
        assert_eq!(buf.get(0, 0).unwrap(), [7, 7, 7, 255]);
        assert_eq!(buf.get(1, 0).unwrap(), [200, 200, 200, 255]);
    }

    #[test]
    fn test_decode_gray_alpha() {
        let bytes = raw_png(1, 1, png::ColorType::GrayscaleAlpha, png::BitDepth::Eight, &[90, 30]);
        assert_eq!(PngCodec.decode(&bytes).unwrap().get(0, 0).unwrap(), [90, 90, 90, 30]);
    }

    #[test]
    fn test_decode_rgb16() {
        let data = [0x12, 0x34, 0xAB, 0xCD, 0xFF, 0xFF];
        let bytes = raw_png(1, 1, png::ColorType::Rgb, png::BitDepth::Sixteen, &data);
        assert_eq!(PngCodec.decode(&bytes).unwrap().get(0, 0).unwrap(), [0x12, 0xAB, 0xFF, 255]);
    }

    #[test]
    fn test_decode_rgb8() {
        let bytes = raw_png(2, 1, png::ColorType::Rgb, png::BitDepth::Eight, &[1, 2, 3, 4, 5, 6]);
        let buf = PngCodec.decode(&bytes).unwrap();
        assert_eq!(buf.samples(), &[1, 2, 3, 255, 4, 5, 6, 255]);
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(PngCodec.decode(b"\x89PNG\r\n\x1a\nnope"), Err(IoError::DecodeError(_))));
        assert!(matches!(PngCodec.decode(&[]), Err(IoError::DecodeError(_))));
    }

    #[test]
    fn test_write_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let src = PixelBuffer::filled(4, 4, [1, 2, 3, 4]);
        PngCodec.write(&path, &src).unwrap();
        assert_eq!(PngCodec.read(&path).unwrap(), src);
    }
}
