//! Tool checks and config management commands.

use std::path::Path;
use tokio::runtime::Runtime;

use super::ConfigAction;
use crate::config::{self, Config, ConfigError};
use crate::error::Result;
use crate::tags::tool_version;

/// Check that the inspection tools can be run
pub fn cmd_check_tools(rt: &Runtime, config: &Config) -> Result<()> {
    println!("Checking inspection tools...\n");

    let mut missing = false;
    for program in [&config.inspection.ffprobe, &config.inspection.ffmpeg] {
        match rt.block_on(tool_version(program)) {
            Some(version) => println!("✓ {}: {}", program, version),
            None => {
                println!("✗ {}: NOT FOUND", program);
                missing = true;
            }
        }
    }

    if missing {
        println!();
        println!("Install FFmpeg:");
        println!("  Windows: winget install Gyan.FFmpeg");
        println!("  macOS:   brew install ffmpeg");
        println!("  Linux:   apt install ffmpeg");
    }
    Ok(())
}

/// Show or initialize the configuration
pub fn cmd_config(
    config: &Config,
    explicit_path: Option<&Path>,
    action: &ConfigAction,
) -> Result<()> {
    match action {
        ConfigAction::Show => {
            print!("{}", toml::to_string_pretty(config).map_err(ConfigError::Serialize)?);
        }
        ConfigAction::Init { force } => {
            let path = match explicit_path {
                Some(path) => path.to_path_buf(),
                None => config::config_path().ok_or(ConfigError::NoConfigDir)?,
            };
            if path.exists() && !force {
                println!("Config already exists at {:?} (use --force to overwrite)", path);
                return Ok(());
            }
            match explicit_path {
                Some(path) => config::save_to(&Config::default(), path)?,
                None => {
                    config::save(&Config::default())?;
                }
            }
            println!("✓ Wrote default config to {:?}", path);
        }
    }
    Ok(())
}
