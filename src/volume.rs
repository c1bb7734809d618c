use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Slider position in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "u8")]
pub struct Volume(u8);

impl Volume {
    pub const MAX: u8 = 100;

    pub fn new(value: u8) -> Result<Self> {
        if value > Self::MAX {
            return Err(Error::InvalidVolume(value));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Fractional gain handed to the synthesizer.
    pub fn gain(self) -> f32 {
        f32::from(self.0) / f32::from(Self::MAX)
    }

    pub fn level(self) -> VolumeLevel {
        VolumeLevel::from(self)
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self(Self::MAX)
    }
}

impl TryFrom<u8> for Volume {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Four-tier indicator shown next to the volume slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeLevel {
    Muted,
    Low,
    Medium,
    High,
}

impl From<Volume> for VolumeLevel {
    fn from(volume: Volume) -> Self {
        match volume.value() {
            0 => Self::Muted,
            1..=33 => Self::Low,
            34..=66 => Self::Medium,
            _ => Self::High,
        }
    }
}

impl VolumeLevel {
    pub fn index(self) -> u8 {
        match self {
            Self::Muted => 0,
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }

    pub fn icon_file(self) -> String {
        format!("volume-level-{}.svg", self.index())
    }

    pub fn icon_path(self, icons_dir: &Path) -> PathBuf {
        icons_dir.join(self.icon_file())
    }
}
