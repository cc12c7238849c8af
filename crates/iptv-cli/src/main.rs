//! IPTV CLI - Headless front end for the IPTV player
//!
//! Features:
//! - Playlist parsing (local files or remote URLs)
//! - Channel search by title or group
//! - Source resolution with proxy routing

use anyhow::Context;
use clap::{Parser, Subcommand};
use iptv_core::{PlayerConfig, PlaylistParser, ProxyEndpoint};
use std::path::PathBuf;

mod commands;
mod fetch;
mod output;

use output::OutputFormat;

/// IPTV CLI - Playlist toolkit
#[derive(Parser)]
#[command(name = "iptv-cli")]
#[command(author = "Purple Squirrel Media")]
#[command(version)]
#[command(about = "M3U playlist parsing and stream resolution toolkit", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json, table)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Player configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a playlist and list its channels
    Parse {
        /// Playlist file path or http(s) URL
        source: String,
    },

    /// Search channels by title or group
    Search {
        /// Playlist file path or http(s) URL
        source: String,

        /// Case-insensitive search term
        term: String,
    },

    /// Resolve a URL into the playback target the player would load
    Resolve {
        /// Playlist or stream URL
        url: String,

        /// Proxy endpoint used to reach the media
        #[arg(short, long, default_value = "/api/proxy")]
        proxy: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_writer(std::io::stderr)
        .init();

    iptv_core::init();

    let config = match &cli.config {
        Some(path) => PlayerConfig::load(path)
            .with_context(|| format!("Failed to load config file: {:?}", path))?,
        None => PlayerConfig::default(),
    };
    let parser = PlaylistParser::from_messages(&config.messages);
    let format = OutputFormat::from(cli.format.as_str());

    match cli.command {
        Commands::Parse { source } => {
            commands::parse(&source, &parser, format).await?;
        }
        Commands::Search { source, term } => {
            commands::search(&source, &term, &parser, format).await?;
        }
        Commands::Resolve { url, proxy } => {
            commands::resolve(&url, &ProxyEndpoint::new(proxy), &parser, format).await?;
        }
    }

    Ok(())
}
