//! Tag extraction errors.

use std::io;

/// The single error kind surfaced by the extractor.
#[derive(Debug, thiserror::Error)]
pub enum TagError {
    #[error("Unable to retrieve info for {input}: {source}")]
    InvalidData {
        /// Path or URI, or `-` for streamed input
        input: String,
        #[source]
        source: DataError,
    },
}

impl TagError {
    pub fn invalid_data(input: impl Into<String>, source: impl Into<DataError>) -> Self {
        Self::InvalidData {
            input: input.into(),
            source: source.into(),
        }
    }

    /// The input this error is about.
    pub fn input(&self) -> &str {
        match self {
            Self::InvalidData { input, .. } => input,
        }
    }
}

/// What went wrong while producing or reading the inspection output.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// ffprobe emitted an `error` block
    #[error("{0}")]
    Reported(String),

    #[error("malformed report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no audio stream found")]
    NoAudioStream,

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
