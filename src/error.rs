use thiserror::Error;

use crate::editor::Control;
use crate::fit::FitError;

/// Error type for editor event handling.
#[derive(Debug, Error)]
pub enum Error {
    /// The image could not be fitted onto the surface.
    #[error(transparent)]
    Fit(#[from] FitError),

    /// The event arrived while the control that raises it is disabled.
    #[error("{0} control is disabled")]
    ControlDisabled(Control),

    /// No image has been selected yet.
    #[error("no image selected")]
    NoImage,

    #[error("volume {0} is outside 0..=100")]
    InvalidVolume(u8),

    /// Drawing onto the surface failed.
    #[error("render error: {0}")]
    Render(anyhow::Error),

    /// The speech backend failed to list voices or speak.
    #[error("speech error: {0}")]
    Speech(anyhow::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
