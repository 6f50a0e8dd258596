use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_SAVE_PATH: &str = "delvemon_save.json";

/// First-person creature-battling dungeon crawler
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Seed for dungeon generation and combat rolls (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Where the run is saved between sessions
    #[arg(long, default_value = DEFAULT_SAVE_PATH)]
    pub save: PathBuf,

    /// Draw flat-shaded walls and gradient floors instead of textures
    #[arg(long)]
    pub flat: bool,

    /// Show the whole floor on the minimap instead of only discovered cells
    #[arg(long)]
    pub no_fog: bool,

    /// Replay key presses from a script file before taking live input
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Resolved settings handed to the run controller.
#[derive(Clone, Debug)]
pub struct GameConfig {
    pub seed: u64,
    pub save_path: PathBuf,
    pub textured: bool,
    pub discovery_fog: bool,
}

impl GameConfig {
    pub fn from_args(args: &Args) -> Self {
        let seed = args.seed.unwrap_or_else(|| {
            // Clock-derived fallback; pass --seed for reproducible runs.
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default() as u64
        });
        Self {
            seed,
            save_path: args.save.clone(),
            textured: !args.flat,
            discovery_fog: !args.no_fog,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed_d00d,
            save_path: PathBuf::from(DEFAULT_SAVE_PATH),
            textured: true,
            discovery_fog: true,
        }
    }
}
