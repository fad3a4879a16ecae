//! Command-line interface for tagprobe.
//!
//! This module provides CLI commands for inspecting audio tags, extracting
//! cover art and resolving MusicBrainz artist ids.

mod commands;

pub use commands::{Cli, Commands, ConfigAction, run_command};
