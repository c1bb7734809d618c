//! One-shot render flow driven by the command line.
//!
//! Replays the page's events against an [`Editor`] and writes the canvas
//! before any speech runs, so a speech failure never costs the image.

use std::path::PathBuf;

use anyhow::Result;
use image::RgbaImage;
use tracing::{info, warn};

use crate::editor::Editor;
use crate::events::{Captions, EventOutcome, UiEvent};
use crate::fit::FitResult;
use crate::render::text::TextOverlay;
use crate::speech::SpeechSynth;

#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub captions: Captions,
    pub volume: u8,
    pub voice: Option<String>,
    pub speak: bool,
    pub output: PathBuf,
    pub icons_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderReport {
    pub placement: FitResult,
    /// Volume indicator matching the requested volume.
    pub icon: PathBuf,
    /// Utterances the synthesizer accepted.
    pub spoken: usize,
}

pub fn render<O: TextOverlay, S: SpeechSynth>(
    editor: &mut Editor<O, S>,
    content: RgbaImage,
    request: RenderRequest,
) -> Result<RenderReport> {
    if request.speak
        && let Err(err) = editor.dispatch(UiEvent::VoicesChanged)
    {
        warn!("voice list unavailable: {err}");
    }

    let placement = editor.image_selected(content)?;
    info!(
        width = placement.width,
        height = placement.height,
        offset_x = placement.offset_x,
        offset_y = placement.offset_y,
        "image placed"
    );

    let has_captions = !request.captions.top.is_empty() || !request.captions.bottom.is_empty();
    if has_captions {
        editor.dispatch(UiEvent::FormSubmitted(request.captions))?;
    }

    let icon = match editor.dispatch(UiEvent::VolumeChanged(request.volume))? {
        EventOutcome::VolumeLevel(level) => level.icon_path(&request.icons_dir),
        _ => editor.volume().level().icon_path(&request.icons_dir),
    };
    info!(volume = request.volume, icon = %icon.display(), "volume set");
    if let Some(name) = request.voice {
        editor.voice_selected(name);
    }

    editor.surface().save_png(&request.output)?;
    info!(path = %request.output.display(), "canvas written");

    let mut spoken = 0;
    if request.speak {
        if !has_captions {
            warn!("nothing to speak; no captions given");
        } else {
            match editor.dispatch(UiEvent::SpeakRequested) {
                Ok(EventOutcome::Spoken(count)) => spoken = count,
                Ok(_) => {}
                Err(err) => warn!("captions not spoken: {err}"),
            }
        }
    }

    Ok(RenderReport {
        placement,
        icon,
        spoken,
    })
}
