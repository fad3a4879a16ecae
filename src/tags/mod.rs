//! Audio tag extraction via ffprobe/ffmpeg.
//!
//! - `probe`: ffprobe report DTOs
//! - `record`: the normalized [`AudioTags`] record and its derived fields
//! - `extract`: process drivers for tag parsing and cover extraction
//! - `feeder`: background stdin feeding for streamed input

mod error;
pub mod extract;
pub mod feeder;
mod probe;
mod record;

pub use error::{DataError, TagError};
pub use extract::{AudioSource, TagExtractor, tool_version};
pub use feeder::{FeedOutcome, FeedStop};
pub use record::{AudioTags, TAG_SPLITTER, UNKNOWN_ARTIST, split_artists, split_items};
