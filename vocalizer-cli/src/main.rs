//! # Vocalizer - Command Line Vocal Trainer
//!
//! Front end for the vocalizer core: live pitch tracking from the
//! microphone, vocal range finding from a short take or a WAV file, and a
//! per-window pitch dump for recorded files.
//!
//! ## Architecture
//! - **Main Thread**: refresh loop driving the tracker at 60 ticks per second
//! - **Audio Thread**: CPAL callback pushing mono chunks over a channel
//! - **Analysis**: pulled synchronously from the main thread, one frame per throttled tick

mod display;

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, info};
use vocalizer_core::{
    audio::{self, LiveInput},
    tuning, wav, AnalysisConfig, AudioBuffer, PitchEstimator, PitchTracker, TrackerUpdate,
    TrackingMode,
};

/// Display refresh period (about 60 ticks per second).
const TICK_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Parser)]
#[command(name = "vocalizer", version, about = "Pitch feedback and vocal range finder")]
struct Cli {
    /// JSON file with analysis settings (threshold, frame size, voice band, ...)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log analysis decisions
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the sung note live from the default microphone
    Track {
        /// Measure deviation from this note instead of the nearest one (e.g. Sol4, La#3)
        #[arg(long)]
        target: Option<String>,

        /// Stop after this many seconds
        #[arg(long)]
        seconds: Option<f32>,
    },
    /// Find the lowest and highest pitch of a take
    Range {
        /// Analyse a WAV file instead of recording
        #[arg(long)]
        file: Option<PathBuf>,

        /// Recording length when using the microphone
        #[arg(long, default_value_t = 3.0, conflicts_with = "file")]
        seconds: f32,
    },
    /// Print one pitch estimate per analysis window of a WAV file
    Estimate {
        /// WAV file to analyse
        file: PathBuf,
    },
    /// Write the default analysis settings to a JSON file
    Config {
        /// Destination path
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = match &cli.config {
        Some(path) => AnalysisConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    debug!("[MAIN] Analysis config: {:?}", config);

    match cli.command {
        Command::Track { target, seconds } => run_tracker(config, target.as_deref(), seconds),
        Command::Range { file, seconds } => run_range(&config, file, seconds),
        Command::Estimate { file } => run_estimate(config, &file),
        Command::Config { path } => {
            config
                .save(&path)
                .with_context(|| format!("writing config to {}", path.display()))?;
            println!("Wrote {}", path.display());
            Ok(())
        }
    }
}

/// Runs the realtime tracker until `seconds` elapse (or forever).
fn run_tracker(config: AnalysisConfig, target: Option<&str>, seconds: Option<f32>) -> Result<()> {
    let mode = match target {
        Some(name) => {
            let midi = tuning::parse_note(name)
                .with_context(|| format!("unknown note name `{}`", name))?;
            TrackingMode::target(midi)
        }
        None => TrackingMode::Auto,
    };

    let run_for = match seconds {
        Some(s) => Some(
            Duration::try_from_secs_f32(s)
                .with_context(|| format!("invalid tracking duration {}", s))?,
        ),
        None => None,
    };

    let mut input = LiveInput::open(config.frame_size).context("opening microphone")?;
    info!("[MAIN] Listening on {}", input.device_name());

    let mut tracker = PitchTracker::with_mode(config, mode);
    if let TrackingMode::Target { midi, target_frequency } = tracker.mode() {
        println!(
            "Target: {}{} ({:.1} Hz)",
            tuning::note_name(*midi),
            tuning::octave_of(*midi),
            target_frequency
        );
    }
    let deadline = run_for.map(|d| Instant::now() + d);

    loop {
        let tick_started = Instant::now();
        if let Some(deadline) = deadline {
            if tick_started >= deadline {
                break;
            }
        }

        if tracker.tick(&mut input) == TrackerUpdate::Updated {
            if let Some(reading) = tracker.reading() {
                println!("{}", display::format_reading(reading));
            }
        }

        if let Some(remaining) = TICK_INTERVAL.checked_sub(tick_started.elapsed()) {
            thread::sleep(remaining);
        }
    }

    input.close();
    Ok(())
}

/// Records (or loads) a take and prints its range.
fn run_range(config: &AnalysisConfig, file: Option<PathBuf>, seconds: f32) -> Result<()> {
    let buffer = match file {
        Some(path) => load(&path)?,
        None => {
            if !(seconds > 0.0 && seconds.is_finite()) {
                bail!("recording length must be positive, got {}", seconds);
            }
            println!("Sing your lowest and highest note for {:.1} seconds...", seconds);
            audio::record(Duration::from_secs_f32(seconds)).context("recording from microphone")?
        }
    };

    let range = vocalizer_core::find_range(&buffer, config);
    println!("{}", display::format_range(&range));
    Ok(())
}

/// Prints the pitch contour of a WAV file, one line per window.
fn run_estimate(config: AnalysisConfig, file: &Path) -> Result<()> {
    let buffer = load(file)?;
    let frame_size = config.frame_size;
    let hop = config.hop_size();
    let mut estimator = PitchEstimator::new(config);

    for (start, frame) in buffer.windows(frame_size, hop) {
        let seconds = start as f32 / buffer.sample_rate.max(1) as f32;
        let estimate = estimator.estimate(&frame);
        println!("{}", display::format_contour_line(seconds, estimate));
    }
    Ok(())
}

fn load(path: &Path) -> Result<AudioBuffer> {
    wav::read_wav(path).with_context(|| format!("reading {}", path.display()))
}
