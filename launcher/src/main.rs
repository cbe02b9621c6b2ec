//! romdeck CLI
//!
//! # Commands
//!
//! - `romdeck launch` - Run the full launch pipeline with the headless engine
//! - `romdeck inspect` - Fetch and resolve a ROM, then print what was found
//!
//! # Usage
//!
//! ```bash
//! # Launch from a props file, exporting the save data afterwards
//! romdeck launch --config game.json --export-save saves.zip
//!
//! # Launch from launch parameters, falling back to a feed item
//! romdeck launch --query "rom=https://roms.example/tetris.zip&type=gb" --feed item.json
//!
//! # Show which ROM an archive resolves to
//! romdeck inspect roms/pokemon.zip --type gba
//! ```

mod inspect;
mod launch;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

/// romdeck - handheld ROM launcher
#[derive(Parser)]
#[command(name = "romdeck")]
#[command(about = "Launch and inspect handheld ROMs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the launch pipeline to a ready session
    Launch(launch::LaunchArgs),

    /// Fetch, resolve and fingerprint a ROM without launching it
    Inspect(inspect::InspectArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = match &cli.command {
        Commands::Launch(args) if args.debug => "debug",
        _ => "info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create runtime")?;

    match cli.command {
        Commands::Launch(args) => rt.block_on(launch::execute(args)),
        Commands::Inspect(args) => rt.block_on(inspect::execute(args)),
    }
}
