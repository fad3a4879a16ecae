//! tagprobe - inspect audio tags and resolve MusicBrainz artist ids.

use clap::Parser;
use tagprobe::cli;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging; stdout is reserved for command output
    let level = if args.verbose {
        "tagprobe=debug"
    } else {
        "tagprobe=info"
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(level.parse()?))
        .init();

    cli::run_command(&args)?;
    Ok(())
}
