//! MusicBrainz artist id resolution.
//!
//! Architecture:
//! - `domain`: query and error types
//! - `dto`: response shapes for release/recording searches
//! - `client`: throttled HTTP transport
//! - `cache`: in-memory read-through response cache
//! - `traits`: the [`CatalogApi`] seam (and test mocks)
//! - `resolver`: tiered search and fuzzy artist matching

pub mod cache;
pub mod client;
pub mod domain;
pub mod dto;
pub mod resolver;
mod throttle;
pub mod traits;

pub use cache::ResponseCache;
pub use client::MusicBrainzClient;
pub use domain::{CatalogError, Pass, SearchQuery, Tier};
pub use resolver::ArtistIdResolver;
pub use traits::CatalogApi;
