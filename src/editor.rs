//! Event handlers tying the surface, captions and speech together.
//!
//! Each handler runs to completion on the caller's thread. The only state
//! shared between handlers lives in [`Editor`]'s fields.

use std::fmt;

use image::RgbaImage;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::events::{Captions, EventOutcome, UiEvent};
use crate::fit::{FitError, FitResult};
use crate::render::surface::Surface;
use crate::render::text::TextOverlay;
use crate::speech::{SpeechSynth, Utterance, VoiceCatalog};
use crate::volume::{Volume, VolumeLevel};

/// Buttons and selectors whose enabled state the editor drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Generate,
    Clear,
    ReadText,
    VoiceSelect,
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Generate => "generate",
            Self::Clear => "clear",
            Self::ReadText => "read-text",
            Self::VoiceSelect => "voice-select",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    pub generate: bool,
    pub clear: bool,
    pub read_text: bool,
    pub voice_select: bool,
}

impl Controls {
    pub fn is_enabled(&self, control: Control) -> bool {
        match control {
            Control::Generate => self.generate,
            Control::Clear => self.clear,
            Control::ReadText => self.read_text,
            Control::VoiceSelect => self.voice_select,
        }
    }

    fn require(&self, control: Control) -> Result<()> {
        if self.is_enabled(control) {
            Ok(())
        } else {
            Err(Error::ControlDisabled(control))
        }
    }

    /// Ready to caption: generate on, clear and read-text off.
    fn editing(&mut self) {
        self.generate = true;
        self.clear = false;
        self.read_text = false;
    }

    fn captioned(&mut self) {
        self.generate = false;
        self.clear = true;
        self.read_text = true;
    }
}

pub struct Editor<O, S> {
    surface: Surface,
    overlay: O,
    synth: S,
    controls: Controls,
    voices: VoiceCatalog,
    image: Option<RgbaImage>,
    captions: Captions,
    volume: Volume,
    selected_voice: Option<String>,
}

impl<O: TextOverlay, S: SpeechSynth> Editor<O, S> {
    pub fn new(surface: Surface, overlay: O, synth: S) -> Self {
        Self {
            surface,
            overlay,
            synth,
            controls: Controls::default(),
            voices: VoiceCatalog::new(),
            image: None,
            captions: Captions::default(),
            volume: Volume::default(),
            selected_voice: None,
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn controls(&self) -> Controls {
        self.controls
    }

    pub fn captions(&self) -> &Captions {
        &self.captions
    }

    pub fn volume(&self) -> Volume {
        self.volume
    }

    pub fn voices(&self) -> &VoiceCatalog {
        &self.voices
    }

    pub fn selected_voice(&self) -> Option<&str> {
        self.selected_voice.as_deref()
    }

    pub fn synth(&self) -> &S {
        &self.synth
    }

    pub fn dispatch(&mut self, event: UiEvent) -> Result<EventOutcome> {
        debug!(event = event.name(), "dispatching");
        match event {
            UiEvent::ImageSelected(image) => {
                self.image_selected(image).map(EventOutcome::ImagePlaced)
            }
            UiEvent::FormSubmitted(captions) => {
                self.form_submitted(captions)?;
                Ok(EventOutcome::Done)
            }
            UiEvent::ResetClicked => {
                self.reset_clicked()?;
                Ok(EventOutcome::Done)
            }
            UiEvent::SpeakRequested => self.speak_requested().map(EventOutcome::Spoken),
            UiEvent::VolumeChanged(value) => {
                self.volume_changed(value).map(EventOutcome::VolumeLevel)
            }
            UiEvent::VoiceSelected(name) => {
                self.voice_selected(name);
                Ok(EventOutcome::Done)
            }
            UiEvent::VoicesChanged => {
                self.voices_changed()?;
                Ok(EventOutcome::VoicesListed(self.voices.labels()))
            }
        }
    }

    /// Draw a newly selected image over the background, letterboxed as needed.
    ///
    /// On a degenerate image the surface is left showing only the background
    /// and the controls keep their previous state.
    pub fn image_selected(&mut self, image: RgbaImage) -> Result<FitResult> {
        self.surface.clear();
        self.surface.fill_background();
        let placement = self.surface.place(&image).map_err(|err| {
            match err.downcast::<FitError>() {
                Ok(fit) => Error::Fit(fit),
                Err(other) => Error::Render(other),
            }
        })?;
        info!(
            width = image.width(),
            height = image.height(),
            "image selected"
        );
        self.controls.editing();
        self.image = Some(image);
        Ok(placement)
    }

    pub fn form_submitted(&mut self, captions: Captions) -> Result<()> {
        self.controls.require(Control::Generate)?;
        if self.image.is_none() {
            return Err(Error::NoImage);
        }
        self.overlay
            .draw(&mut self.surface, &captions)
            .map_err(Error::Render)?;
        self.captions = captions;
        self.controls.captioned();
        Ok(())
    }

    /// Wipe the surface and the form.
    pub fn reset_clicked(&mut self) -> Result<()> {
        self.controls.require(Control::Clear)?;
        self.controls.editing();
        self.surface.clear();
        self.captions = Captions::default();
        Ok(())
    }

    /// Speak the top caption, then the bottom one.
    pub fn speak_requested(&mut self) -> Result<usize> {
        self.controls.require(Control::ReadText)?;
        let voice = match self.selected_voice.as_deref() {
            Some(name) => {
                let found = self.voices.find(name).cloned();
                if found.is_none() {
                    warn!(voice = name, "selected voice not available; using default");
                }
                found
            }
            None => None,
        };
        let gain = self.volume.gain();
        let utterances = [&self.captions.top, &self.captions.bottom].map(|text| Utterance {
            text: text.clone(),
            voice: voice.clone(),
            volume: gain,
        });
        for utterance in &utterances {
            self.synth.speak(utterance).map_err(Error::Speech)?;
        }
        Ok(utterances.len())
    }

    pub fn volume_changed(&mut self, value: u8) -> Result<VolumeLevel> {
        self.volume = Volume::new(value)?;
        Ok(self.volume.level())
    }

    pub fn voice_selected(&mut self, name: String) {
        self.selected_voice = Some(name);
    }

    /// Reload the voice list; also used once at startup.
    pub fn voices_changed(&mut self) -> Result<()> {
        self.voices.refresh(&self.synth).map_err(Error::Speech)?;
        self.controls.voice_select = true;
        Ok(())
    }
}

impl<O, S> fmt::Debug for Editor<O, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("controls", &self.controls)
            .field("captions", &self.captions)
            .field("volume", &self.volume)
            .field("selected_voice", &self.selected_voice)
            .field("has_image", &self.image.is_some())
            .finish_non_exhaustive()
    }
}
