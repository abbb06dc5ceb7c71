//! Trimmy video trimmer
//!
//! Pick one of the most recent videos in a directory, set in and out points
//! with live thumbnails, and trim it with ffmpeg stream copy.
//!
//! # Usage
//!
//! ```bash
//! trimmy list --dir ~/Videos
//! trimmy trim ~/Videos/clip.mp4 --start 00:01:00 --end 00:02:00
//! trimmy session --dir ~/Videos --preview-dir /tmp/previews
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use trimmy::cli::commands::{self, CommandContext};
use trimmy::cli::{repl, Cli, Commands};
use trimmy::config_initialization::initialize_configuration_hierarchy;
use trimmy::utils::logging::init_logging;

/// Main entry point for the Trimmy CLI application
#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    let config = initialize_configuration_hierarchy(cli.config.as_deref(), &cli.overrides())
        .context("Failed to load configuration")?;
    init_logging(&config.settings.logging);
    info!("Starting Trimmy");
    config.log_sources();

    let ctx = CommandContext::new(config.settings, cli.state.clone());

    // Execute the requested command
    match cli.command {
        Commands::Check => commands::check(&ctx)?,
        Commands::List(args) => commands::list(&ctx, args).await?,
        Commands::Probe(args) => commands::probe(&ctx, args).await?,
        Commands::Thumbnail(args) => commands::thumbnail(&ctx, args).await?,
        Commands::Trim(args) => commands::trim(&ctx, args).await?,
        Commands::Dirs(args) => commands::dirs(&ctx, args).await?,
        Commands::Session(args) => repl::run(&ctx, args).await?,
    }

    info!("Trimmy completed successfully");
    Ok(())
}
