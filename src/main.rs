//! TuxReader - Read captured text aloud
//!
//! Command-line front end for the playback engine and OCR adapter.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use tuxreader::config::Settings;
use tuxreader::notify::LogNotifier;
use tuxreader::ocr::tesseract::TesseractOcr;
use tuxreader::ocr::{OcrProcessor, OcrRequest};
use tuxreader::speech::{PlaybackEngine, Progress, ProgressReceiver, SpeedProfile};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available voices
    Voices {
        /// Show every backend voice, even when the list is collapsed
        #[arg(long)]
        all: bool,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the speed presets
    Speeds,

    /// Read text aloud (from the argument, a file, or stdin)
    Speak {
        text: Option<String>,

        #[arg(short, long)]
        file: Option<PathBuf>,

        #[arg(long)]
        voice: Option<String>,

        #[arg(long, value_parser = parse_speed)]
        speed: Option<SpeedProfile>,

        /// Speak as one utterance, without fragment highlighting
        #[arg(long)]
        whole: bool,
    },

    /// Extract the text of an image and read it aloud
    Read {
        image: PathBuf,

        #[arg(long)]
        voice: Option<String>,

        #[arg(long, value_parser = parse_speed)]
        speed: Option<SpeedProfile>,

        /// Only print the extracted text
        #[arg(long)]
        no_speak: bool,
    },
}

fn parse_speed(label: &str) -> Result<SpeedProfile, String> {
    SpeedProfile::by_label(label).ok_or_else(|| {
        let labels: Vec<&str> = SpeedProfile::all().iter().map(|s| s.label).collect();
        format!("unknown speed '{}', expected one of {}", label, labels.join(", "))
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = Settings::load().unwrap_or_else(|e| {
        eprintln!("Failed to read settings, using defaults: {:#}", e);
        Settings::default()
    });

    // Setup logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if args.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new(settings.log_level.to_lowercase())
        }
    });
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("📖 TuxReader v{} starting...", env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::Speeds => {
            print_speeds(&settings);
            Ok(())
        }
        Command::Voices { all, json } => {
            let engine = PlaybackEngine::connect(&settings, Arc::new(LogNotifier)).await;
            print_voices(&engine, all, json)
        }
        Command::Speak {
            text,
            file,
            voice,
            speed,
            whole,
        } => {
            let text = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                (None, None) => {
                    let mut text = String::new();
                    std::io::stdin().read_to_string(&mut text)?;
                    text
                }
            };
            remember_choice(&mut settings, voice, speed);
            let engine = PlaybackEngine::connect(&settings, Arc::new(LogNotifier)).await;
            speak_text(&engine, &settings, &text, whole).await;
            Ok(())
        }
        Command::Read {
            image,
            voice,
            speed,
            no_speak,
        } => {
            remember_choice(&mut settings, voice, speed);
            let engine = PlaybackEngine::connect(&settings, Arc::new(LogNotifier)).await;
            let locale = engine.catalog().locale_of(settings.voice_name.as_deref());

            let ocr = TesseractOcr::new();
            info!("🔍 Reading {} with {} ({})", image.display(), ocr.name(), locale);
            let result = ocr.submit(OcrRequest { image, locale }).await?;
            println!("{}", result.text);

            if !no_speak && settings.auto_speak {
                speak_text(&engine, &settings, &result.text, false).await;
            }
            Ok(())
        }
    }
}

/// Persist a voice or speed picked on the command line
fn remember_choice(settings: &mut Settings, voice: Option<String>, speed: Option<SpeedProfile>) {
    if voice.is_none() && speed.is_none() {
        return;
    }
    if let Some(voice) = voice {
        settings.voice_name = Some(voice);
    }
    if let Some(speed) = speed {
        settings.set_speed(&speed);
    }
    if let Err(e) = settings.save() {
        warn!("⚠️ Failed to save settings: {:#}", e);
    }
}

/// Speak and echo each fragment as it is reached; Ctrl-C stops playback
async fn speak_text(engine: &PlaybackEngine, settings: &Settings, text: &str, whole: bool) {
    let speed = settings.speed();
    let voice = settings.voice_name.as_deref();

    let mut progress = if whole || !settings.speak_in_parts {
        engine.speak(text, voice, &speed).await;
        None
    } else {
        Some(engine.speak_in_parts(text, voice, &speed).await)
    };

    let mut speaking = engine.speaking();
    loop {
        tokio::select! {
            biased;
            Some(event) = next_progress(&mut progress) => {
                let fragment = text[event.start..event.end].trim();
                if !fragment.is_empty() {
                    println!("▶ {}", fragment);
                }
            }
            _ = speaking.wait_for(|speaking| !*speaking) => break,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                engine.stop();
                break;
            }
        }
    }
}

async fn next_progress(progress: &mut Option<ProgressReceiver>) -> Option<Progress> {
    match progress {
        Some(progress) => progress.recv().await,
        None => std::future::pending().await,
    }
}

fn print_speeds(settings: &Settings) {
    let current = settings.speed();
    for speed in SpeedProfile::all() {
        let marker = if *speed == current { "*" } else { " " };
        let default = if *speed == SpeedProfile::DEFAULT {
            " (default)"
        } else {
            ""
        };
        println!("{} {:<8} {:>4}{}", marker, speed.label, speed.rate, default);
    }
}

fn print_voices(engine: &PlaybackEngine, all: bool, json: bool) -> Result<()> {
    let catalog = engine.catalog();
    let voices = if all { catalog.raw() } else { catalog.list() };

    if json {
        println!("{}", serde_json::to_string_pretty(&voices)?);
        return Ok(());
    }

    for voice in &voices {
        println!("{:<40} {}", voice.name, voice.locale);
    }
    if !all && catalog.is_collapsed() {
        println!(
            "({} similar voices hidden, use --all to show them)",
            catalog.raw().len() - voices.len()
        );
    }
    Ok(())
}
