/* Copyright @yucwang 2026 */

use crate::core::error::Result;
use crate::math::bitmap::Bitmap;
use crate::math::constants::Float;

use exr::prelude::write_rgb_file;
use std::path::{Path, PathBuf};

/// Writes linear radiance as an RGB float OpenEXR file.
pub fn write_exr(bitmap: &Bitmap, path: &Path) -> Result<()> {
    log::info!("Writing OpenEXR image: {}.", path.display());
    let width = bitmap.width();
    let pixels = bitmap.pixels();
    write_rgb_file(path, width, bitmap.height(), |x, y| {
        let p = pixels[y * width + x];
        (p.x, p.y, p.z)
    })?;
    Ok(())
}

/// Writes an 8-bit PNG, clamping each channel to [0, 1].
pub fn write_png(bitmap: &Bitmap, path: &Path) -> Result<()> {
    log::info!("Writing PNG image: {}.", path.display());
    let image = image::RgbImage::from_fn(bitmap.width() as u32, bitmap.height() as u32, |x, y| {
        let p = bitmap[(x as usize, y as usize)];
        image::Rgb([to_byte(p.x), to_byte(p.y), to_byte(p.z)])
    });
    image.save(path)?;
    Ok(())
}

/// Picks the encoder from the extension. Anything other than `.png` or
/// `.exr` is written as EXR next to the requested path.
pub fn write_image(bitmap: &Bitmap, path: &Path) -> Result<PathBuf> {
    let extension = path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => write_png(bitmap, path).map(|_| path.to_path_buf()),
        Some("exr") => write_exr(bitmap, path).map(|_| path.to_path_buf()),
        _ => {
            let fallback = path.with_extension("exr");
            log::warn!("Unknown image format for {}, writing {} instead.", path.display(), fallback.display());
            write_exr(bitmap, &fallback).map(|_| fallback)
        }
    }
}

fn to_byte(v: Float) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0) as u8
}
