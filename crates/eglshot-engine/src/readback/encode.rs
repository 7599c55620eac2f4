use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use image::ImageEncoder;
use image::codecs::png::PngEncoder;

use super::pixels::PixelBuffer;

/// Encodes `pixels` as an 8-bit RGBA PNG into `out`.
pub fn encode_png<W: Write>(pixels: &PixelBuffer, out: W) -> Result<()> {
    let rows = pixels.packed_rows();
    PngEncoder::new(out)
        .write_image(
            &rows,
            pixels.width(),
            pixels.height(),
            image::ExtendedColorType::Rgba8,
        )
        .context("png encoding failed")
}

/// Writes `pixels` to `path` as a PNG, replacing any existing file.
pub fn write_png(path: &Path, pixels: &PixelBuffer) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    encode_png(pixels, &mut out)?;
    out.flush()
        .with_context(|| format!("failed to flush {}", path.display()))
}
