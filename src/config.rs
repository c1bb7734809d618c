use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

use crate::volume::Volume;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    pub canvas: CanvasConfig,
    pub caption: CaptionConfig,
    pub speech: SpeechConfig,
    /// Directory holding the `volume-level-N.svg` icons.
    pub icons_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    /// RGB fill behind the image; shows as letterbox or pillarbox bars.
    pub background: [u8; 3],
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CaptionConfig {
    /// Font file to use instead of searching the system fonts.
    pub font_path: Option<PathBuf>,
    /// Em size in pixels.
    pub font_size_px: f32,
    pub color: [u8; 3],
    /// Centre of the top caption's baseline.
    pub top_anchor: [f32; 2],
    pub bottom_anchor: [f32; 2],
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SpeechConfig {
    /// espeak-compatible program used for speaking and listing voices.
    pub command: String,
    /// Voices in this language are flagged as the default.
    pub default_lang: String,
    pub voice: Option<String>,
    pub volume: Volume,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::default(),
            caption: CaptionConfig::default(),
            speech: SpeechConfig::default(),
            icons_dir: PathBuf::from("icons"),
        }
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 400,
            background: [0, 0, 0],
        }
    }
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            font_path: None,
            font_size_px: 30.0,
            color: [255, 255, 255],
            top_anchor: [200.0, 50.0],
            bottom_anchor: [200.0, 375.0],
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            command: "espeak-ng".to_string(),
            default_lang: "en".to_string(),
            voice: None,
            volume: Volume::default(),
        }
    }
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(
            self.canvas.width > 0 && self.canvas.height > 0,
            "canvas width and height must be greater than zero"
        );
        ensure!(
            self.caption.font_size_px.is_finite() && self.caption.font_size_px > 0.0,
            "caption.font-size-px must be positive"
        );
        ensure!(
            self.caption
                .top_anchor
                .iter()
                .chain(self.caption.bottom_anchor.iter())
                .all(|v| v.is_finite()),
            "caption anchors must be finite"
        );
        ensure!(
            !self.speech.command.trim().is_empty(),
            "speech.command must not be blank"
        );
        Ok(self)
    }
}
