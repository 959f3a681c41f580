use std::path::PathBuf;

use clap::Parser;
use lightlvl_config::CONFIG_FILE_NAME;

/// Headless demo host: a generated world, a walking player and the light level overlay.
///
/// Commands are read from stdin one per line, e.g. `.lightlvl`, `.lightlvl radius 12`.
#[derive(Debug, Parser)]
#[command(name = "lightlvl", version)]
pub struct Cli {
    /// Settings file; created with defaults if missing.
    #[arg(long, default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,

    #[arg(long, default_value_t = 1337)]
    pub seed: i32,

    /// Loaded columns span -N..=N on x and z.
    #[arg(long, default_value_t = 48)]
    pub world_radius: i32,

    /// Stop after this many frames; 0 runs until stdin closes.
    #[arg(long, default_value_t = 0)]
    pub frames: u64,

    #[arg(long, default_value_t = 100)]
    pub period_ms: u64,

    /// Reload the settings file when it changes on disk.
    #[arg(long)]
    pub watch_config: bool,

    /// Start scanning without waiting for a command.
    #[arg(long)]
    pub start: bool,
}
