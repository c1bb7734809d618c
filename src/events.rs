use image::RgbaImage;

use crate::fit::FitResult;
use crate::volume::VolumeLevel;

/// Contents of the caption form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captions {
    pub top: String,
    pub bottom: String,
}

/// Interaction events raised by the host.
#[derive(Debug)]
pub enum UiEvent {
    ImageSelected(RgbaImage),
    FormSubmitted(Captions),
    ResetClicked,
    SpeakRequested,
    VolumeChanged(u8),
    VoiceSelected(String),
    VoicesChanged,
}

impl UiEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ImageSelected(_) => "image-selected",
            Self::FormSubmitted(_) => "form-submitted",
            Self::ResetClicked => "reset-clicked",
            Self::SpeakRequested => "speak-requested",
            Self::VolumeChanged(_) => "volume-changed",
            Self::VoiceSelected(_) => "voice-selected",
            Self::VoicesChanged => "voices-changed",
        }
    }
}

/// What the host should reflect after an event was handled.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// The image was drawn at this placement.
    ImagePlaced(FitResult),
    /// The volume indicator should switch to this tier.
    VolumeLevel(VolumeLevel),
    /// Number of utterances handed to the synthesizer.
    Spoken(usize),
    /// Voice options now on offer.
    VoicesListed(Vec<String>),
    Done,
}
