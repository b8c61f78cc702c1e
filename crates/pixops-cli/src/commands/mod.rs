//! CLI command implementations

pub mod convolve;
pub mod crop;
pub mod grayscale;
pub mod info;
pub mod sharpen;
pub mod upscale;

use crate::OutputArgs;
use anyhow::{Context, Result};
use pixops_core::PixelBuffer;
use pixops_io::jpeg::JpegCodec;
use pixops_io::{Format, ImageEncoder};
use pixops_ops::{Operation, PixelOperationsController};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Load image from path
pub fn load_image(path: &Path) -> Result<PixelBuffer> {
    pixops_io::read(path).with_context(|| format!("Failed to load: {}", path.display()))
}

/// Save image to path, honouring JPEG quality
pub fn save_image(path: &Path, image: &PixelBuffer, quality: u8) -> Result<()> {
    let format = Format::from_extension(path);
    if drops_alpha(format, image) {
        warn!(path = %path.display(), %format, "Output format has no alpha; transparency will be lost");
    }
    let result = match format {
        Format::Jpeg => JpegCodec::with_quality(quality).and_then(|codec| codec.write(path, image)),
        _ => pixops_io::write(path, image),
    };
    result.with_context(|| format!("Failed to save: {}", path.display()))
}

/// `true` when writing `image` as `format` would discard non-opaque alpha.
fn drops_alpha(format: Format, image: &PixelBuffer) -> bool {
    format != Format::Unknown
        && !format.has_alpha()
        && image.samples().chunks_exact(4).any(|px| px[3] != 255)
}

/// Loads `input`, runs `op` through a controller and saves the result.
///
/// Returns the path written.
pub fn process(input: &Path, op: Operation, out: &OutputArgs, verbose: bool) -> Result<PathBuf> {
    let output = out
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(op.default_output_name()));
    let name = op.name();

    let mut controller = PixelOperationsController::new();
    controller.load(load_image(input)?);

    if verbose {
        let (w, h) = controller.current()?.dimensions();
        println!("{} {} ({}x{})", name, input.display(), w, h);
    }

    let result = controller
        .apply(op)
        .with_context(|| format!("{} failed on {}", name, input.display()))?;
    save_image(&output, result, out.quality)?;
    info!(op = name, output = %output.display(), "Saved result");

    if verbose {
        println!("Wrote {} ({}x{})", output.display(), result.width(), result.height());
    }
    Ok(output)
}

/// Format file size for display
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn out_to(path: &Path) -> OutputArgs {
        OutputArgs {
            output: Some(path.to_path_buf()),
            quality: 90,
        }
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_process_grayscale_png() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("out.png");
        pixops_io::write(&input, &PixelBuffer::filled(3, 3, [200, 100, 50, 255])).unwrap();

        let written = process(&input, Operation::Grayscale, &out_to(&output), false).unwrap();
        assert_eq!(written, output);
        let back = pixops_io::read(&output).unwrap();
        assert_eq!(back.get(1, 1).unwrap(), [116, 116, 116, 255]);
    }

    #[test]
    fn test_process_reports_op_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        pixops_io::write(&input, &PixelBuffer::filled(4, 4, [0, 0, 0, 255])).unwrap();

        let op = Operation::Crop {
            a: pixops_core::Point::new(1, 1),
            b: pixops_core::Point::new(1, 3),
        };
        let err = process(&input, op, &out_to(&dir.path().join("o.png")), false).unwrap_err();
        assert!(format!("{err:#}").contains("empty selection"));
    }

    #[test]
    fn test_drops_alpha() {
        let translucent = PixelBuffer::from_fn(2, 1, |x, _| [0, 0, 0, if x == 1 { 128 } else { 255 }]);
        let opaque = PixelBuffer::filled(2, 1, [0, 0, 0, 255]);
        assert!(drops_alpha(Format::Jpeg, &translucent));
        assert!(!drops_alpha(Format::Jpeg, &opaque));
        assert!(!drops_alpha(Format::Png, &translucent));
        assert!(!drops_alpha(Format::Unknown, &translucent));
    }

    #[test]
    fn test_save_bad_quality() {
        let dir = tempfile::tempdir().unwrap();
        let buf = PixelBuffer::filled(2, 2, [1, 2, 3, 255]);
        assert!(save_image(&dir.path().join("x.jpg"), &buf, 0).is_err());
        save_image(&dir.path().join("x.jpg"), &buf, 75).unwrap();
    }
}
