//! Binary entrypoint for the meme frame.
//!
//! Acts as the host page: turns the command line into editor events and shows
//! the result by writing the canvas to a PNG.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt};

use rust_meme_frame::config::Configuration;
use rust_meme_frame::editor::Editor;
use rust_meme_frame::events::Captions;
use rust_meme_frame::fit::fit;
use rust_meme_frame::render::loader::load_image;
use rust_meme_frame::render::surface::Surface;
use rust_meme_frame::render::text::GlyphOverlay;
use rust_meme_frame::session::{self, RenderRequest};
use rust_meme_frame::speech::{CommandSynth, SpeechSynth};

#[derive(Debug, Parser)]
#[command(name = "rust-meme-frame", about = "Caption an image on a fixed canvas")]
struct Cli {
    /// Path to YAML config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Draw an image with top/bottom captions and optionally read them aloud
    Render {
        image: PathBuf,
        #[arg(long, default_value = "")]
        top: String,
        #[arg(long, default_value = "")]
        bottom: String,
        /// Where the finished canvas is written
        #[arg(short, long, value_name = "FILE", default_value = "meme.png")]
        output: PathBuf,
        /// Read the captions aloud
        #[arg(long)]
        speak: bool,
        /// Voice name, as listed by `voices`
        #[arg(long)]
        voice: Option<String>,
        /// Speech volume, 0-100
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        volume: Option<u8>,
    },
    /// List available speech voices
    Voices,
    /// Print the placement of content inside a container
    Fit {
        container_width: f64,
        container_height: f64,
        content_width: f64,
        content_height: f64,
    },
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env().add_directive(
        format!("rust_meme_frame={level}")
            .parse()
            .context("building log filter")?,
    );
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<Configuration> {
    let cfg = match path {
        Some(path) => Configuration::from_yaml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Configuration::default(),
    };
    cfg.validated().context("validating configuration")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;
    let cfg = load_config(cli.config.as_ref())?;

    match cli.command {
        Command::Render {
            image,
            top,
            bottom,
            output,
            speak,
            voice,
            volume,
        } => {
            let surface = Surface::new(cfg.canvas.width, cfg.canvas.height, cfg.canvas.background);
            let overlay = GlyphOverlay::from_config(&cfg.caption).context("loading caption font")?;
            let synth = CommandSynth::from_config(&cfg.speech);
            let mut editor = Editor::new(surface, overlay, synth);

            let content = load_image(&image)?;
            let request = RenderRequest {
                captions: Captions { top, bottom },
                volume: volume.unwrap_or(cfg.speech.volume.value()),
                voice: voice.or_else(|| cfg.speech.voice.clone()),
                speak,
                output,
                icons_dir: cfg.icons_dir.clone(),
            };
            session::render(&mut editor, content, request)?;
        }
        Command::Voices => {
            let synth = CommandSynth::from_config(&cfg.speech);
            let voices = synth
                .voices()
                .with_context(|| format!("listing voices from {}", synth.program()))?;
            for voice in voices {
                println!("{}", voice.label());
            }
        }
        Command::Fit {
            container_width,
            container_height,
            content_width,
            content_height,
        } => {
            let placement = fit(
                container_width,
                container_height,
                content_width,
                content_height,
            )?;
            println!(
                "width={} height={} offset_x={} offset_y={}",
                placement.width, placement.height, placement.offset_x, placement.offset_y
            );
        }
    }
    Ok(())
}
