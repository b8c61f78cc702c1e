//! Image info command.
//!
//! Displays dimensions, format, file size and alpha coverage.

use crate::InfoArgs;
use anyhow::{Context, Result};
use pixops_core::PixelBuffer;
use pixops_io::Format;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Facts reported for one file.
#[derive(Debug, Serialize)]
struct ImageInfo {
    file: String,
    format: String,
    width: u32,
    height: u32,
    pixels: u64,
    size_bytes: u64,
    opaque: bool,
    mean_rgba: [f64; 4],
}

impl ImageInfo {
    fn gather(path: &Path, image: &PixelBuffer, format: Format, size_bytes: u64) -> Self {
        let mut sums = [0u64; 4];
        for (_, _, px) in image.pixels() {
            for c in 0..4 {
                sums[c] += px[c] as u64;
            }
        }
        let n = image.pixel_count().max(1) as f64;

        Self {
            file: path.display().to_string(),
            format: format.name().to_string(),
            width: image.width(),
            height: image.height(),
            pixels: image.pixel_count() as u64,
            size_bytes,
            opaque: image.pixels().all(|(_, _, px)| px[3] == 255),
            mean_rgba: sums.map(|s| s as f64 / n),
        }
    }
}

/// Runs the info command.
pub fn run(args: InfoArgs, verbose: bool) -> Result<()> {
    let mut infos = Vec::with_capacity(args.input.len());
    for path in &args.input {
        let size_bytes = fs::metadata(path)
            .with_context(|| format!("Failed to stat: {}", path.display()))?
            .len();
        let format = Format::detect(path).unwrap_or(Format::Unknown);
        let image = super::load_image(path)?;
        infos.push(ImageInfo::gather(path, &image, format, size_bytes));
    }

    if args.json {
        let json = if infos.len() == 1 {
            serde_json::to_string_pretty(&infos[0])?
        } else {
            serde_json::to_string_pretty(&infos)?
        };
        println!("{json}");
        return Ok(());
    }

    for (idx, info) in infos.iter().enumerate() {
        if idx > 0 {
            println!();
        }
        print_text(info, verbose);
    }
    Ok(())
}

fn print_text(info: &ImageInfo, verbose: bool) {
    println!("{}", info.file);
    println!("  Resolution: {}x{}", info.width, info.height);
    println!("  Format:     {}", info.format);
    println!("  Pixels:     {}", info.pixels);
    println!("  File size:  {}", super::format_size(info.size_bytes));
    println!("  Opaque:     {}", if info.opaque { "yes" } else { "no" });

    if verbose {
        let [r, g, b, a] = info.mean_rgba;
        println!("  Mean RGBA:  {r:.2} {g:.2} {b:.2} {a:.2}");
    }
}
