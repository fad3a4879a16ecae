//! CLI command definitions and dispatch.
//!
//! Each group of subcommands lives in its own submodule:
//! - `tags`: tag parsing and cover extraction
//! - `resolve`: MusicBrainz artist id lookups
//! - `tools`: tool checks and config management

mod resolve;
mod tags;
mod tools;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;

use crate::config;
use crate::error::Result;

pub use resolve::{cmd_identify, cmd_resolve};
pub use tags::{cmd_cover, cmd_tags};
pub use tools::{cmd_check_tools, cmd_config};

/// tagprobe CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Use this config file instead of the default location
    #[arg(long, global = true, env = "TAGPROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Show the tags of an audio file or URL
    Tags {
        /// File path or URL understood by ffprobe
        input: String,
        /// Stream the file through ffprobe's stdin instead of passing the path
        #[arg(long)]
        stdin: bool,
        /// Print the raw ffprobe report as JSON
        #[arg(long)]
        raw: bool,
    },
    /// Extract the embedded cover image
    Cover {
        /// File path or URL understood by ffmpeg
        input: String,
        /// Where to write the image
        #[arg(short, long)]
        output: PathBuf,
        /// Stream the file through ffmpeg's stdin instead of passing the path
        #[arg(long)]
        stdin: bool,
    },
    /// Look up an artist's MusicBrainz id
    Resolve {
        /// Artist name
        #[arg(long)]
        artist: String,
        /// Album title
        #[arg(long)]
        album: Option<String>,
        /// Album barcode
        #[arg(long)]
        upc: Option<String>,
        /// Track title
        #[arg(long)]
        track: Option<String>,
        /// Track ISRC
        #[arg(long)]
        isrc: Option<String>,
    },
    /// Resolve the artist id of a file from its own tags
    Identify {
        /// Path to the audio file
        path: PathBuf,
    },
    /// Check if ffprobe and ffmpeg are installed
    CheckTools,
    /// Show or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default configuration to disk
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => config::load_from(path)?,
        None => config::load(),
    };
    let rt = Runtime::new()?;

    match &cli.command {
        Commands::Tags { input, stdin, raw } => cmd_tags(&rt, &config, input, *stdin, *raw),
        Commands::Cover {
            input,
            output,
            stdin,
        } => cmd_cover(&rt, &config, input, output, *stdin),
        Commands::Resolve {
            artist,
            album,
            upc,
            track,
            isrc,
        } => cmd_resolve(
            &rt,
            &config,
            artist,
            album.as_deref(),
            upc.as_deref(),
            track.as_deref(),
            isrc.as_deref(),
        ),
        Commands::Identify { path } => cmd_identify(&rt, &config, path),
        Commands::CheckTools => cmd_check_tools(&rt, &config),
        Commands::Config { action } => cmd_config(&config, cli.config.as_deref(), action),
    }
}
