//! tagprobe - audio tag extraction and MusicBrainz artist id resolution.
//!
//! Two engines share the crate:
//! - [`tags`]: runs ffprobe/ffmpeg on a file or byte stream and builds a
//!   normalized [`tags::AudioTags`] record (plus embedded cover extraction)
//! - [`catalog`]: resolves an artist's MusicBrainz id from fragmentary
//!   album/track details with tiered, fuzzy-matched searches

pub mod catalog;
pub mod cli;
pub mod compare;
pub mod config;
pub mod error;
pub mod process;
pub mod tags;
