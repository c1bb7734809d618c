use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use image::RgbaImage;
use image::imageops;
use tracing::debug;

/// Decodes an image to RGBA8 and applies EXIF orientation if available.
///
/// Missing or unreadable metadata keeps the stored orientation.
pub fn load_image(path: &Path) -> Result<RgbaImage> {
    let img = image::ImageReader::open(path)
        .with_context(|| format!("failed to open image at {}", path.display()))?
        .with_guessed_format()
        .context("failed to guess image format")?
        .decode()
        .with_context(|| format!("failed to decode image at {}", path.display()))?
        .to_rgba8();

    let orientation = read_orientation(path).unwrap_or(1);
    let img = apply_orientation(img, orientation);
    debug!(
        path = %path.display(),
        width = img.width(),
        height = img.height(),
        orientation,
        "image loaded"
    );
    Ok(img)
}

fn read_orientation(path: &Path) -> Option<u16> {
    let file = File::open(path).ok()?;
    let mut buf = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut buf).ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    field.value.get_uint(0).map(|v| v as u16)
}

/// Rotate/flip `img` so EXIF orientation `orientation` displays upright.
pub fn apply_orientation(img: RgbaImage, orientation: u16) -> RgbaImage {
    match orientation {
        2 => imageops::flip_horizontal(&img),
        3 => imageops::rotate180(&img),
        4 => imageops::flip_vertical(&img),
        // transpose
        5 => imageops::flip_horizontal(&imageops::rotate90(&img)),
        6 => imageops::rotate90(&img),
        // transverse
        7 => imageops::flip_horizontal(&imageops::rotate270(&img)),
        8 => imageops::rotate270(&img),
        _ => img,
    }
}
