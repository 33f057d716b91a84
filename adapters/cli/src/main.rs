#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line controller for Drift.
//!
//! Builds a simulation from defaults, an optional TOML file and command-line
//! overrides, performs the requested actions in order and prints the signal
//! produced after each one.

mod board_transfer;
mod controller;

use std::{
    fs,
    io::BufWriter,
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use drift_core::{RawConfig, SimulationConfig};
use drift_rendering::{
    svg::SvgBackend, Palette, Presentation, RenderingBackend, Scene, TileGridPresentation,
};
use drift_system_sound::Sound;
use drift_world::query;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use crate::{
    board_transfer::BoardSnapshot,
    controller::{Action, Controller, Signal},
};

/// Walk paths across a board of arrows until each one loops or falls off.
#[derive(Debug, Parser)]
#[command(name = "drift", version, about)]
struct Args {
    /// Actions to perform in order; defaults to `run`.
    #[arg(value_enum)]
    actions: Vec<Action>,

    /// Board width in tiles.
    #[arg(long, allow_hyphen_values = true)]
    width: Option<String>,

    /// Board height in tiles.
    #[arg(long, allow_hyphen_values = true)]
    height: Option<String>,

    /// Column the first path starts on; random when omitted.
    #[arg(long = "start-x", allow_hyphen_values = true)]
    start_x: Option<String>,

    /// Row the first path starts on; random when omitted.
    #[arg(long = "start-y", allow_hyphen_values = true)]
    start_y: Option<String>,

    /// Seed for board generation and random starts.
    #[arg(long)]
    seed: Option<String>,

    /// TOML file providing `[simulation]` and `[render]` settings.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Board snapshot (`drift:v1:WxH:...`) to replay instead of generating a board.
    #[arg(long, value_name = "SNAPSHOT")]
    board: Option<String>,

    /// Number of times each action is performed.
    #[arg(long, default_value_t = 1)]
    repeat: u32,

    /// Pause between repeated actions, in milliseconds.
    #[arg(long, value_name = "MS")]
    delay_ms: Option<u64>,

    /// Write the final state as an SVG document.
    #[arg(long, value_name = "PATH")]
    svg: Option<PathBuf>,

    /// Print a snapshot of the board once all actions ran.
    #[arg(long)]
    export_board: bool,

    /// Do not report tones.
    #[arg(long)]
    mute: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

/// Settings accepted from a configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    simulation: SimulationConfig,
    render: TileGridPresentation,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let file = match &args.config {
        Some(path) => load_config(path)?,
        None => FileConfig::default(),
    };
    let raw = RawConfig {
        width: args.width.clone(),
        height: args.height.clone(),
        start_x: args.start_x.clone(),
        start_y: args.start_y.clone(),
        seed: args.seed.clone(),
    };
    let config = file.simulation.overlay(&raw);
    let seed = config.seed.unwrap_or_else(rand::random);
    tracing::info!(
        seed,
        width = config.width,
        height = config.height,
        "starting simulation"
    );

    let template = match &args.board {
        Some(snapshot) => Some(
            BoardSnapshot::decode(snapshot)
                .context("failed to decode board snapshot")?
                .into_board()
                .context("board snapshot does not describe a valid board")?,
        ),
        None => None,
    };

    let mut sound = Sound::default();
    sound.set_muted(args.mute);
    let rng = ChaCha8Rng::seed_from_u64(seed);
    let mut controller =
        Controller::new(config, template, rng, sound).context("failed to start simulation")?;

    println!("seed: {seed}");
    for diagnostic in query::diagnostics(controller.simulation()) {
        println!("note: {diagnostic}");
    }
    print_signal(&controller.signal_start());

    let actions = if args.actions.is_empty() {
        vec![Action::Run]
    } else {
        args.actions.clone()
    };
    let delay = args.delay_ms.map(Duration::from_millis);
    for action in actions {
        for round in 0..args.repeat {
            if round > 0 {
                if let Some(delay) = delay {
                    thread::sleep(delay);
                }
            }
            for signal in controller.perform(action)? {
                print_signal(&signal);
            }
        }
    }

    if let Some(path) = &args.svg {
        write_svg(&controller, file.render, path)?;
    }
    if args.export_board {
        let snapshot = BoardSnapshot::capture(query::board(controller.simulation()));
        println!("{}", snapshot.encode().context("failed to encode board snapshot")?);
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: &Path) -> Result<FileConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

fn print_signal(signal: &Signal) {
    println!("{}", signal.report);
    for tone in &signal.tones {
        println!("tone: {} Hz", tone.frequency);
    }
}

fn write_svg(controller: &Controller, grid: TileGridPresentation, path: &Path) -> Result<()> {
    let grid = TileGridPresentation::new(grid.columns, grid.rows, grid.tile_px, grid.padding_px)
        .context("invalid render settings")?;
    let scene = Scene::from_simulation(controller.simulation(), grid);
    let presentation = Presentation::new("Drift", Palette::default(), scene);
    let file = fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut backend = SvgBackend::new(BufWriter::new(file));
    backend.present(&presentation)?;
    tracing::info!(path = %path.display(), "wrote SVG");
    Ok(())
}
