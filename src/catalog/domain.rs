//! Internal types for artist-id resolution.
//!
//! These are OUR types: the resolver takes a [`SearchQuery`] and hands back
//! a plain MBID string. Catalog responses never leak past `resolver.rs`.

use crate::tags::AudioTags;

/// Fragmentary identifying strings for one resolution attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    /// Artist name as known locally (required)
    pub artist_name: String,
    /// Album title
    pub album_name: Option<String>,
    /// Album barcode, preferred over the album title
    pub album_upc: Option<String>,
    /// Track title
    pub track_name: Option<String>,
    /// Track ISRC, preferred over the track title
    pub track_isrc: Option<String>,
}

impl SearchQuery {
    /// Start a query for the given artist.
    pub fn artist(name: impl Into<String>) -> Self {
        Self {
            artist_name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album_name = Some(album.into());
        self
    }

    pub fn with_upc(mut self, upc: impl Into<String>) -> Self {
        self.album_upc = Some(upc.into());
        self
    }

    pub fn with_track(mut self, track: impl Into<String>) -> Self {
        self.track_name = Some(track.into());
        self
    }

    pub fn with_isrc(mut self, isrc: impl Into<String>) -> Self {
        self.track_isrc = Some(isrc.into());
        self
    }

    /// Build a query from tags embedded in an audio file.
    ///
    /// Uses the first track artist; returns `None` when the only artist
    /// available is the unknown-artist placeholder.
    pub fn from_tags(tags: &AudioTags) -> Option<Self> {
        let artist = tags.artists().into_iter().next()?;
        if artist == crate::tags::UNKNOWN_ARTIST {
            return None;
        }
        Some(Self {
            artist_name: artist,
            album_name: tags.album().map(str::to_string),
            album_upc: tags.barcode().map(str::to_string),
            track_name: Some(tags.title()),
            track_isrc: tags.isrc().map(str::to_string),
        })
    }

    /// The lookup tiers this query allows, in the order they must be tried.
    pub fn tiers(&self) -> Vec<Tier<'_>> {
        let mut tiers = Vec::with_capacity(4);
        if let Some(upc) = non_empty(&self.album_upc) {
            tiers.push(Tier::AlbumByUpc(upc));
        }
        if let Some(isrc) = non_empty(&self.track_isrc) {
            tiers.push(Tier::TrackByIsrc(isrc));
        }
        if let Some(album) = non_empty(&self.album_name) {
            tiers.push(Tier::AlbumByName(album));
        }
        if let Some(track) = non_empty(&self.track_name) {
            tiers.push(Tier::TrackByName(track));
        }
        tiers
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// One lookup strategy against the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier<'a> {
    AlbumByUpc(&'a str),
    TrackByIsrc(&'a str),
    AlbumByName(&'a str),
    TrackByName(&'a str),
}

/// Fuzzy-match strictness level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Strict,
    Loose,
}

impl Pass {
    /// Passes in evaluation order: every strict match beats every loose one.
    pub const ORDER: [Pass; 2] = [Pass::Strict, Pass::Loose];

    pub fn is_strict(self) -> bool {
        self == Pass::Strict
    }
}

/// Errors talking to the catalog.
///
/// Only transport-level failures are errors; an undecodable body is
/// "no data" and comes back as `Ok(None)` from the client.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}
