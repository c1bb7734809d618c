use std::path::Path;

use anyhow::{Context, Result, anyhow};
use fast_image_resize as fir;
use image::{Rgba, RgbaImage, imageops};
use tracing::debug;

use crate::fit::{FitResult, fit};

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Fixed-size RGBA drawing surface.
#[derive(Debug, Clone)]
pub struct Surface {
    pixels: RgbaImage,
    background: Rgba<u8>,
}

impl Surface {
    pub fn new(width: u32, height: u32, background: [u8; 3]) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width.max(1), height.max(1), TRANSPARENT),
            background: Rgba([background[0], background[1], background[2], 255]),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn image_mut(&mut self) -> &mut RgbaImage {
        &mut self.pixels
    }

    /// Make every pixel transparent.
    pub fn clear(&mut self) {
        self.pixels.pixels_mut().for_each(|px| *px = TRANSPARENT);
    }

    pub fn fill_background(&mut self) {
        let bg = self.background;
        self.pixels.pixels_mut().for_each(|px| *px = bg);
    }

    /// Scale `content` to fit inside the surface and draw it centred.
    ///
    /// Whatever the content does not cover keeps its current pixels, so fill
    /// the background first to get solid bars.
    pub fn place(&mut self, content: &RgbaImage) -> Result<FitResult> {
        let placement = fit(
            f64::from(self.width()),
            f64::from(self.height()),
            f64::from(content.width()),
            f64::from(content.height()),
        )?;
        let rect = placement.to_pixel_rect(self.width(), self.height());
        debug!(
            src_w = content.width(),
            src_h = content.height(),
            x = rect.x,
            y = rect.y,
            w = rect.width,
            h = rect.height,
            "placing image"
        );
        let scaled = if content.dimensions() == (rect.width, rect.height) {
            content.clone()
        } else {
            let src = fir::images::ImageRef::new(
                content.width(),
                content.height(),
                content.as_raw(),
                fir::PixelType::U8x4,
            )
            .context("content is not a packed RGBA buffer")?;
            let (w, h) = (rect.width, rect.height);
            let mut dst = fir::images::Image::new(w, h, fir::PixelType::U8x4);
            let smooth = fir::ResizeOptions::new()
                .resize_alg(fir::ResizeAlg::Convolution(fir::FilterType::CatmullRom));
            fir::Resizer::new()
                .resize(&src, &mut dst, Some(&smooth))
                .with_context(|| format!("scaling content to {w}x{h}"))?;
            RgbaImage::from_raw(w, h, dst.into_vec())
                .ok_or_else(|| anyhow!("scaled buffer does not match {w}x{h}"))?
        };
        imageops::overlay(
            &mut self.pixels,
            &scaled,
            i64::from(rect.x),
            i64::from(rect.y),
        );
        Ok(placement)
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.pixels
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("failed to write canvas to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn is_red(px: &Rgba<u8>) -> bool {
        px[0] > 240 && px[1] < 16 && px[2] < 16 && px[3] > 240
    }

    #[test]
    fn new_surface_is_transparent() {
        let surface = Surface::new(4, 4, [0, 0, 0]);
        assert!(surface.image().pixels().all(|px| *px == TRANSPARENT));
    }

    #[test]
    fn landscape_content_is_letterboxed() {
        let mut surface = Surface::new(400, 400, [10, 20, 30]);
        surface.fill_background();
        let content = RgbaImage::from_pixel(800, 200, RED);
        let placement = surface.place(&content).unwrap();
        assert_eq!(placement.offset_y, 150.0);

        let img = surface.image();
        assert_eq!(*img.get_pixel(200, 10), Rgba([10, 20, 30, 255]));
        assert_eq!(*img.get_pixel(200, 390), Rgba([10, 20, 30, 255]));
        assert!(is_red(img.get_pixel(200, 200)));
        assert!(is_red(img.get_pixel(0, 200)));
    }

    #[test]
    fn portrait_content_is_pillarboxed() {
        let mut surface = Surface::new(400, 400, [0, 0, 0]);
        surface.fill_background();
        surface
            .place(&RgbaImage::from_pixel(200, 800, RED))
            .unwrap();
        let img = surface.image();
        assert_eq!(*img.get_pixel(100, 200), Rgba([0, 0, 0, 255]));
        assert!(is_red(img.get_pixel(200, 0)));
        assert_eq!(*img.get_pixel(300, 200), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn empty_content_is_rejected() {
        let mut surface = Surface::new(400, 400, [0, 0, 0]);
        let err = surface.place(&RgbaImage::new(0, 0)).unwrap_err();
        assert!(err.to_string().contains("degenerate"));
    }

    #[test]
    fn clear_discards_background() {
        let mut surface = Surface::new(8, 8, [5, 5, 5]);
        surface.fill_background();
        surface.clear();
        assert_eq!(*surface.image().get_pixel(3, 3), TRANSPARENT);
    }
}
