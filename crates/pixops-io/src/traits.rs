//! Codec traits.
//!
//! Each format implements [`ImageDecoder`] and [`ImageEncoder`] over
//! in-memory bytes; the path-based methods are provided.

use crate::IoResult;
use pixops_core::PixelBuffer;
use std::path::Path;

/// Turns encoded bytes into an RGBA8 buffer.
pub trait ImageDecoder {
    /// Format name, e.g. `"PNG"`.
    fn format_name(&self) -> &'static str;

    /// Decodes an in-memory file.
    fn decode(&self, data: &[u8]) -> IoResult<PixelBuffer>;

    /// Reads and decodes a file.
    fn read<P: AsRef<Path>>(&self, path: P) -> IoResult<PixelBuffer> {
        let data = std::fs::read(path.as_ref())?;
        self.decode(&data)
    }
}

/// Turns an RGBA8 buffer into encoded bytes.
pub trait ImageEncoder {
    /// Format name, e.g. `"PNG"`.
    fn format_name(&self) -> &'static str;

    /// Encodes to memory.
    fn encode(&self, buffer: &PixelBuffer) -> IoResult<Vec<u8>>;

    /// Encodes and writes a file.
    fn write<P: AsRef<Path>>(&self, path: P, buffer: &PixelBuffer) -> IoResult<()> {
        let data = self.encode(buffer)?;
        std::fs::write(path.as_ref(), data)?;
        Ok(())
    }
}
