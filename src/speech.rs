use std::fmt;
use std::process::Command;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, warn};

use crate::config::SpeechConfig;

/// Voice offered by a speech backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    pub lang: String,
    pub default: bool,
}

impl Voice {
    /// Label shown in the voice selection list.
    pub fn label(&self) -> String {
        let mut label = format!("{} ({})", self.name, self.lang);
        if self.default {
            label.push_str(" -- DEFAULT");
        }
        label
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// One piece of text queued for speaking.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    /// `None` leaves the choice to the backend.
    pub voice: Option<Voice>,
    /// Gain in `0.0..=1.0`.
    pub volume: f32,
}

pub trait SpeechSynth {
    fn voices(&self) -> Result<Vec<Voice>>;

    /// Speak one utterance; returns once the backend has finished with it.
    fn speak(&mut self, utterance: &Utterance) -> Result<()>;
}

const PLACEHOLDER: &str = "No available voice options";

/// Cached voice list backing the voice selection control.
///
/// Holds a placeholder entry until the first refresh.
#[derive(Debug, Clone)]
pub struct VoiceCatalog {
    voices: Vec<Voice>,
    populated: bool,
}

impl Default for VoiceCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl VoiceCatalog {
    pub fn new() -> Self {
        Self {
            voices: Vec::new(),
            populated: false,
        }
    }

    /// Replace the cached list with the backend's current voices.
    pub fn refresh(&mut self, synth: &dyn SpeechSynth) -> Result<()> {
        let voices = synth.voices().context("failed to list voices")?;
        debug!(count = voices.len(), "voice list refreshed");
        self.voices = voices;
        self.populated = true;
        Ok(())
    }

    pub fn is_populated(&self) -> bool {
        self.populated
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn find(&self, name: &str) -> Option<&Voice> {
        self.voices.iter().find(|voice| voice.name == name)
    }

    pub fn labels(&self) -> Vec<String> {
        if !self.populated {
            return vec![PLACEHOLDER.to_string()];
        }
        self.voices.iter().map(Voice::label).collect()
    }
}

/// Speaks through an espeak-compatible command line program.
#[derive(Debug, Clone)]
pub struct CommandSynth {
    program: String,
    default_lang: String,
}

impl CommandSynth {
    pub fn new(program: impl Into<String>, default_lang: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            default_lang: default_lang.into(),
        }
    }

    pub fn from_config(cfg: &SpeechConfig) -> Self {
        Self::new(cfg.command.clone(), cfg.default_lang.clone())
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

/// espeak amplitude for a `0.0..=1.0` gain; 100 is the program's normal level.
fn amplitude(volume: f32) -> u32 {
    (volume.clamp(0.0, 1.0) * 100.0).round() as u32
}

impl SpeechSynth for CommandSynth {
    fn voices(&self) -> Result<Vec<Voice>> {
        let output = Command::new(&self.program)
            .arg("--voices")
            .output()
            .with_context(|| format!("failed to run {} --voices", self.program))?;
        if !output.status.success() {
            return Err(anyhow!(
                "{} --voices exited with status {}",
                self.program,
                output.status.code().unwrap_or(-1)
            ));
        }
        let listing = String::from_utf8_lossy(&output.stdout);
        Ok(parse_voice_table(&listing, &self.default_lang))
    }

    fn speak(&mut self, utterance: &Utterance) -> Result<()> {
        if utterance.text.trim().is_empty() {
            debug!("skipping empty utterance");
            return Ok(());
        }
        let mut cmd = Command::new(&self.program);
        if let Some(voice) = &utterance.voice {
            cmd.arg("-v").arg(&voice.name);
        }
        cmd.arg("-a")
            .arg(amplitude(utterance.volume).to_string())
            .arg("--")
            .arg(&utterance.text);
        let status = cmd
            .status()
            .with_context(|| format!("failed to spawn {}", self.program))?;
        if status.success() {
            Ok(())
        } else {
            Err(anyhow!(
                "{} exited with status {}",
                self.program,
                status.code().unwrap_or(-1)
            ))
        }
    }
}

/// Parse the table printed by `espeak-ng --voices`.
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File          Other Languages
///  5  af              --/M      Afrikaans          gmw/af
/// ```
///
/// Only the first voice in `default_lang` is flagged as the default.
pub fn parse_voice_table(listing: &str, default_lang: &str) -> Vec<Voice> {
    let mut voices = Vec::new();
    let mut default_taken = false;
    for line in listing.lines().skip(1) {
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() < 4 || cols[0].parse::<i32>().is_err() {
            if !line.trim().is_empty() {
                warn!(line, "ignoring malformed voice entry");
            }
            continue;
        }
        let default = !default_taken && cols[1] == default_lang;
        default_taken |= default;
        voices.push(Voice {
            name: cols[3].to_string(),
            lang: cols[1].to_string(),
            default,
        });
    }
    voices
}
