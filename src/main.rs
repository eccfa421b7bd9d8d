mod config;
mod driver;
mod game;
mod input;
mod render;
mod snake;
mod term;
mod tilt;
mod world;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::GameConfig;
use crate::driver::LoopDriver;
use crate::game::Session;
use crate::term::TermManager;

#[derive(Parser)]
#[command(name = "gridsnake")]
#[command(version, about = "Snake on a fixed grid with obstacles, steered by keys, mouse or tilt")]
struct Cli {
    /// Cells along each side of the square grid
    #[arg(long, default_value_t = config::GRID_SIZE)]
    grid_size: i32,

    /// Ticks per second at the start of a game
    #[arg(long, default_value_t = config::START_SPEED)]
    speed: f64,

    /// Upper bound of the random obstacle count
    #[arg(long, default_value_t = config::OBSTACLE_MAX)]
    max_obstacles: usize,

    /// Seed for obstacle and food placement, for reproducible games
    #[arg(long)]
    seed: Option<u64>,

    /// IIO accelerometer directory; the first one under /sys/bus/iio is used otherwise
    #[arg(long)]
    tilt_device: Option<PathBuf>,

    /// Write logs here (the terminal itself is taken by the game)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let config = GameConfig {
        grid_size: cli.grid_size,
        start_speed: cli.speed,
        obstacle_max: cli.max_obstacles,
        ..Default::default()
    };
    config.validate().context("Invalid game settings")?;

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    info!(?config, seed = ?cli.seed, "Starting");
    let session = Session::new(config, rng);
    let mut driver = LoopDriver::new(session, cli.tilt_device, Instant::now());

    // The frame loop restores the terminal itself, also on CTRL+C and errors
    driver.run(&mut TermManager::new())
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
