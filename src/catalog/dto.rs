//! MusicBrainz search response DTOs
//!
//! These types match what the `/release`, `/recording` and `/isrc/<code>`
//! endpoints return. Only the fields the resolver reads are declared; serde
//! ignores the rest.
//! DO NOT use these types outside the catalog module.
//!
//! API Reference: https://musicbrainz.org/doc/MusicBrainz_API/Search

use serde::{Deserialize, Serialize};

/// Release search response (`/release?query=...`)
///
/// `releases` is absent when the body is something else entirely (an error
/// payload, a different endpoint); that is "no results", not a failure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReleaseSearch {
    pub releases: Option<Vec<Release>>,
}

/// Recording search response (`/recording?query=...`) and ISRC lookup
/// response (`/isrc/<code>?inc=artist-credits`)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RecordingSearch {
    pub recordings: Option<Vec<Recording>>,
}

/// Release (album/single/EP)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Release {
    /// MusicBrainz release ID
    #[serde(default)]
    pub id: String,
    /// Release title
    #[serde(default)]
    pub title: String,
    /// Search score (0-100)
    pub score: Option<u32>,
    /// Barcode, when the release has one
    pub barcode: Option<String>,
    /// Artist credits
    #[serde(default)]
    pub artist_credit: Vec<ArtistCredit>,
}

/// Recording (a distinct audio track)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Recording {
    /// MusicBrainz recording ID
    #[serde(default)]
    pub id: String,
    /// Recording title
    #[serde(default)]
    pub title: String,
    /// Search score (0-100)
    pub score: Option<u32>,
    /// Artist credits
    #[serde(default)]
    pub artist_credit: Vec<ArtistCredit>,
}

/// Artist credit (can be multiple for collaborations)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtistCredit {
    /// The artist
    pub artist: Artist,
    /// How this artist is credited (may differ from official name)
    pub name: Option<String>,
    /// Join phrase (e.g., " & ", " feat. ")
    pub joinphrase: Option<String>,
}

/// Artist info
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Artist {
    /// MusicBrainz artist ID
    pub id: String,
    /// Official artist name
    pub name: String,
    /// Sort name (e.g., "Beatles, The")
    pub sort_name: Option<String>,
    /// Known aliases (search results include these)
    #[serde(default)]
    pub aliases: Vec<Alias>,
}

/// Artist alias
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Alias {
    pub name: String,
    pub sort_name: Option<String>,
    pub locale: Option<String>,
}

/// Anything that carries a title and a list of artist credits.
pub trait Credited {
    fn title(&self) -> &str;
    fn artist_credit(&self) -> &[ArtistCredit];
}

impl Credited for Release {
    fn title(&self) -> &str {
        &self.title
    }

    fn artist_credit(&self) -> &[ArtistCredit] {
        &self.artist_credit
    }
}

impl Credited for Recording {
    fn title(&self) -> &str {
        &self.title
    }

    fn artist_credit(&self) -> &[ArtistCredit] {
        &self.artist_credit
    }
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the real API returns.
// ============================================================================

#[cfg(test)]
mod contract_tests {
    use super::*;

    #[test]
    fn test_parse_release_search() {
        let json = r#"{
            "created": "2024-01-01T00:00:00.000Z",
            "count": 1,
            "offset": 0,
            "releases": [{
                "id": "rel-1",
                "score": 100,
                "title": "A Night at the Opera",
                "barcode": "602547288233",
                "artist-credit": [{
                    "name": "Queen",
                    "artist": {
                        "id": "0383dadf-2a4e-4d10-a46a-e9e041da8eb3",
                        "name": "Queen",
                        "sort-name": "Queen",
                        "aliases": [{"name": "Queen", "sort-name": "Queen", "locale": null}]
                    }
                }]
            }]
        }"#;

        let search: ReleaseSearch = serde_json::from_str(json).expect("Should parse release search");
        let releases = search.releases.expect("releases present");
        assert_eq!(releases.len(), 1);
        assert_eq!(releases[0].title, "A Night at the Opera");
        assert_eq!(releases[0].score, Some(100));
        assert_eq!(releases[0].artist_credit[0].artist.aliases.len(), 1);
    }

    #[test]
    fn test_missing_releases_key_is_none() {
        let search: ReleaseSearch =
            serde_json::from_str(r#"{"not-releases": []}"#).expect("Should parse");
        assert!(search.releases.is_none());
    }

    #[test]
    fn test_parse_isrc_lookup() {
        let json = r#"{
            "isrc": "GBUM71029604",
            "recordings": [{
                "id": "rec-1",
                "title": "Bohemian Rhapsody",
                "length": 354000,
                "artist-credit": [{
                    "name": "Queen",
                    "joinphrase": "",
                    "artist": {"id": "queen-id", "name": "Queen", "sort-name": "Queen"}
                }]
            }]
        }"#;

        let search: RecordingSearch = serde_json::from_str(json).expect("Should parse isrc lookup");
        let recordings = search.recordings.expect("recordings present");
        assert_eq!(recordings[0].artist_credit[0].artist.id, "queen-id");
        assert!(recordings[0].artist_credit[0].artist.aliases.is_empty());
    }

    #[test]
    fn test_wrong_shape_is_an_error() {
        let result: Result<ReleaseSearch, _> = serde_json::from_str(r#"{"releases": "nope"}"#);
        assert!(result.is_err());
    }
}
