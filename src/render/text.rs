use std::fs;
use std::path::Path;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont, point};
use anyhow::{Context, Result, anyhow};
use fontdb::{Database, Family, Query, Source};
use image::Rgba;
use tracing::debug;

use crate::config::CaptionConfig;
use crate::events::Captions;
use crate::render::surface::Surface;

/// Where and how captions are drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptionStyle {
    pub font_size_px: f32,
    pub color: [u8; 3],
    pub top_anchor: (f32, f32),
    pub bottom_anchor: (f32, f32),
}

impl From<&CaptionConfig> for CaptionStyle {
    fn from(cfg: &CaptionConfig) -> Self {
        Self {
            font_size_px: cfg.font_size_px,
            color: cfg.color,
            top_anchor: (cfg.top_anchor[0], cfg.top_anchor[1]),
            bottom_anchor: (cfg.bottom_anchor[0], cfg.bottom_anchor[1]),
        }
    }
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self::from(&CaptionConfig::default())
    }
}

/// Draws caption text over whatever is already on the surface.
pub trait TextOverlay {
    fn draw(&self, surface: &mut Surface, captions: &Captions) -> Result<()>;
}

/// Rasterizes captions with an outline font.
#[derive(Clone)]
pub struct GlyphOverlay {
    font: FontArc,
    style: CaptionStyle,
}

impl GlyphOverlay {
    pub fn new(font: FontArc, style: CaptionStyle) -> Self {
        Self { font, style }
    }

    /// Font from `cfg.font-path`, falling back to a system sans-serif.
    pub fn from_config(cfg: &CaptionConfig) -> Result<Self> {
        let font = match &cfg.font_path {
            Some(path) => load_font_file(path)?,
            None => load_system_font()?,
        };
        Ok(Self::new(font, CaptionStyle::from(cfg)))
    }

    pub fn style(&self) -> &CaptionStyle {
        &self.style
    }

    /// Pixel scale for a CSS-style em size.
    fn scale(&self) -> PxScale {
        let size = self.style.font_size_px;
        match self.font.units_per_em() {
            Some(upem) if upem > 0.0 => PxScale::from(size * self.font.height_unscaled() / upem),
            _ => PxScale::from(size),
        }
    }

    /// Advance width of `text` at the overlay's scale.
    pub fn measure(&self, text: &str) -> f32 {
        let scaled = self.font.as_scaled(self.scale());
        let mut width = 0.0;
        let mut previous = None;
        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(prev) = previous {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            previous = Some(id);
        }
        width
    }

    /// Draw `text` centred on `anchor.0`, with `anchor.1` as the baseline.
    fn draw_centered(&self, surface: &mut Surface, text: &str, anchor: (f32, f32)) {
        if text.is_empty() {
            return;
        }
        let scale = self.scale();
        let scaled = self.font.as_scaled(scale);
        let color = self.style.color;
        let (surface_w, surface_h) = (surface.width(), surface.height());
        let image = surface.image_mut();

        let mut caret = point(anchor.0 - self.measure(text) / 2.0, anchor.1);
        let mut previous = None;
        for ch in text.chars() {
            let glyph_id = scaled.glyph_id(ch);
            if let Some(prev) = previous {
                caret.x += scaled.kern(prev, glyph_id);
            }
            let glyph = glyph_id.with_scale_and_position(scale, caret);
            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                let origin_x = bounds.min.x.floor() as i32;
                let origin_y = bounds.min.y.floor() as i32;
                outlined.draw(|gx, gy, coverage| {
                    let px = origin_x + gx as i32;
                    let py = origin_y + gy as i32;
                    if px < 0 || py < 0 || px as u32 >= surface_w || py as u32 >= surface_h {
                        return;
                    }
                    let dst = image.get_pixel_mut(px as u32, py as u32);
                    *dst = blend(*dst, color, coverage);
                });
            }
            caret.x += scaled.h_advance(glyph_id);
            previous = Some(glyph_id);
        }
    }
}

impl TextOverlay for GlyphOverlay {
    fn draw(&self, surface: &mut Surface, captions: &Captions) -> Result<()> {
        debug!(top = %captions.top, bottom = %captions.bottom, "drawing captions");
        self.draw_centered(surface, &captions.top, self.style.top_anchor);
        self.draw_centered(surface, &captions.bottom, self.style.bottom_anchor);
        Ok(())
    }
}

/// Source-over blend of an opaque `color` with `coverage` onto `dst`.
fn blend(dst: Rgba<u8>, color: [u8; 3], coverage: f32) -> Rgba<u8> {
    let a = coverage.clamp(0.0, 1.0);
    let dst_a = f32::from(dst[3]) / 255.0;
    let out_a = a + dst_a * (1.0 - a);
    if out_a <= 0.0 {
        return dst;
    }
    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = (f32::from(color[i]) * a + f32::from(dst[i]) * dst_a * (1.0 - a)) / out_a;
        out[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;
    Rgba(out)
}

pub fn load_font_file(path: &Path) -> Result<FontArc> {
    let data =
        fs::read(path).with_context(|| format!("failed to read font at {}", path.display()))?;
    FontArc::try_from_vec(data)
        .with_context(|| format!("failed to decode font at {}", path.display()))
}

/// First usable face among common caption families, then any installed face.
pub fn load_system_font() -> Result<FontArc> {
    let mut db = Database::new();
    db.load_system_fonts();

    let preferred_families = [
        Family::Name("Arial"),
        Family::Name("Liberation Sans"),
        Family::Name("Noto Sans"),
        Family::Name("DejaVu Sans"),
        Family::SansSerif,
    ];

    for family in preferred_families {
        if let Some(id) = db.query(&Query {
            families: &[family],
            ..Default::default()
        }) && let Some(font) = load_face(&db, id)?
        {
            return Ok(font);
        }
    }

    for face in db.faces() {
        if let Some(font) = load_face(&db, face.id)? {
            return Ok(font);
        }
    }

    Err(anyhow!("failed to load a system font for captions"))
}

fn load_face(db: &Database, id: fontdb::ID) -> Result<Option<FontArc>> {
    let face = db.face(id).context("missing font face in database")?;
    let data = match &face.source {
        Source::Binary(data) => data.as_ref().as_ref().to_vec(),
        Source::File(path) => {
            fs::read(path).with_context(|| format!("failed to read font at {}", path.display()))?
        }
        Source::SharedFile(_, data) => data.as_ref().as_ref().to_vec(),
    };
    match FontArc::try_from_vec(data) {
        Ok(font) => Ok(Some(font)),
        Err(err) => {
            debug!("skipping undecodable font face {}: {err}", face.post_script_name);
            Ok(None)
        }
    }
}
