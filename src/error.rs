//! Application-wide error types.
//!
//! Library modules use specific error types via `thiserror`. The CLI
//! commands return [`Result`] and `main` converts to `anyhow` at the very
//! top.
//!
//! # Design
//!
//! - [`Error`]: Top-level application error enum
//! - Module-specific errors ([`CatalogError`], [`TagError`], [`ConfigError`])
//!   for detailed handling
//!
//! # Example
//!
//! ```ignore
//! use tagprobe::error::{Result, ResultExt};
//!
//! async fn probe(path: &str) -> Result<AudioTags> {
//!     let source = AudioSource::open_file(path)
//!         .await
//!         .with_context(format!("Failed to open {}", path))?;
//!     Ok(extractor.parse_tags(source).await?)
//! }
//! ```

use std::path::PathBuf;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::tags::TagError;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// MusicBrainz client error
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Tag extraction error
    #[error(transparent)]
    Tags(#[from] TagError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// JSON rendering error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File not found
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a not found error.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound(path.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}
