//! Artist MBID resolution.
//!
//! Given fragmentary info about a track or album, find the MusicBrainz
//! artist id by searching releases/recordings and fuzzy-matching the
//! credited artists. Lookups go through the shared [`ResponseCache`] and
//! the catalog's own throttle.
//!
//! Resolution order, first hit wins:
//! 1. album barcode (UPC)
//! 2. track ISRC
//! 3. artist + album title
//! 4. artist + track title
//!
//! Within one search every strict match beats every loose match; within a
//! pass the catalog's result order decides.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::cache::ResponseCache;
use super::client::MusicBrainzClient;
use super::domain::{CatalogError, Pass, SearchQuery, Tier};
use super::dto::{Credited, RecordingSearch, ReleaseSearch};
use super::traits::CatalogApi;
use crate::compare::{compare_string, compare_strings, escape_search_syntax};
use crate::config::CatalogConfig;

/// Resolves artist MBIDs against the catalog.
pub struct ArtistIdResolver {
    catalog: Arc<dyn CatalogApi>,
    cache: Arc<ResponseCache>,
}

impl ArtistIdResolver {
    pub fn new(catalog: Arc<dyn CatalogApi>, cache: Arc<ResponseCache>) -> Self {
        Self { catalog, cache }
    }

    /// Live MusicBrainz client with a fresh response cache.
    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = MusicBrainzClient::new(config)?;
        let cache = ResponseCache::new(Duration::from_secs(config.cache_ttl_secs));
        Ok(Self::new(Arc::new(client), Arc::new(cache)))
    }

    /// Retrieve the artist MBID for the given details, or `None` if no tier
    /// produced a match. Never fails: network trouble degrades to no match.
    pub async fn resolve_artist_id(&self, query: &SearchQuery) -> Option<String> {
        let artist = query.artist_name.trim();
        if artist.is_empty() {
            tracing::debug!("Skipping MusicBrainz search without an artist name");
            return None;
        }

        tracing::debug!(
            artist,
            album = ?query.album_name,
            upc = ?query.album_upc,
            track = ?query.track_name,
            isrc = ?query.track_isrc,
            "Searching MusicBrainz for artist id"
        );

        for tier in query.tiers() {
            let found = match tier {
                Tier::AlbumByUpc(upc) => self.search_artist_by_album(artist, None, Some(upc)).await,
                Tier::TrackByIsrc(isrc) => {
                    self.search_artist_by_track(artist, None, Some(isrc)).await
                }
                Tier::AlbumByName(album) => {
                    self.search_artist_by_album(artist, Some(album), None).await
                }
                Tier::TrackByName(track) => {
                    self.search_artist_by_track(artist, Some(track), None).await
                }
            };
            if let Some(id) = found {
                tracing::info!(artist, ?tier, mbid = %id, "Resolved MusicBrainz artist id");
                return Some(id);
            }
        }

        tracing::debug!(artist, "No MusicBrainz artist id found");
        None
    }

    /// Find the artist id through a release search, by barcode or by title.
    ///
    /// Two spellings of the artist are tried as separate queries: the
    /// escaped verbatim name, then its comparison form.
    pub async fn search_artist_by_album(
        &self,
        artist: &str,
        album: Option<&str>,
        upc: Option<&str>,
    ) -> Option<String> {
        if album.is_none() && upc.is_none() {
            return None;
        }

        let mut tried: Vec<String> = Vec::with_capacity(2);
        for search_artist in [escape_search_syntax(artist), compare_string(artist)] {
            if search_artist.is_empty() {
                continue;
            }

            let (cache_key, search) = match (upc, album) {
                (Some(upc), _) => (
                    format!("release.barcode.{}", upc),
                    format!("barcode:{}", upc),
                ),
                (None, Some(album)) => {
                    let search_album = escape_search_syntax(album);
                    (
                        format!("release.{}.{}", search_artist, search_album),
                        format!(r#"artist:"{}" AND release:"{}""#, search_artist, search_album),
                    )
                }
                (None, None) => return None,
            };
            // A repeated key would only replay the same (cached) answer
            if tried.contains(&cache_key) {
                continue;
            }
            tried.push(cache_key.clone());

            let Some(result) = self
                .fetch::<ReleaseSearch>(&cache_key, "release", vec![("query", search)])
                .await
            else {
                continue;
            };
            let Some(releases) = result.releases else {
                continue;
            };

            let wanted_title = if upc.is_some() { None } else { album };
            if let Some(id) = find_artist_id(&releases, wanted_title, artist) {
                return Some(id);
            }
        }
        None
    }

    /// Find the artist id through a recording search or a direct ISRC lookup.
    pub async fn search_artist_by_track(
        &self,
        artist: &str,
        track: Option<&str>,
        isrc: Option<&str>,
    ) -> Option<String> {
        let search_artist = escape_search_syntax(artist);

        let (endpoint, cache_key, params) = match (isrc, track) {
            (Some(isrc), _) => {
                let endpoint = format!("isrc/{}", isrc);
                (
                    endpoint.clone(),
                    endpoint,
                    vec![("inc", "artist-credits".to_string())],
                )
            }
            (None, Some(track)) => {
                let search_track = escape_search_syntax(track);
                (
                    "recording".to_string(),
                    format!("recording.{}.{}", search_track, search_artist),
                    vec![(
                        "query",
                        format!(r#""{}" AND artist:"{}""#, search_track, search_artist),
                    )],
                )
            }
            (None, None) => return None,
        };

        let result = self
            .fetch::<RecordingSearch>(&cache_key, &endpoint, params)
            .await?;
        let recordings = result.recordings?;

        // ISRCs are unique per recording: any recording returned is the one
        let wanted_title = if isrc.is_some() { None } else { track };
        find_artist_id(&recordings, wanted_title, artist)
    }

    /// Cached GET, decoded into the expected response shape.
    ///
    /// Transport errors, "no data" and wrong shapes all come back as `None`.
    async fn fetch<T: DeserializeOwned>(
        &self,
        cache_key: &str,
        endpoint: &str,
        params: Vec<(&'static str, String)>,
    ) -> Option<T> {
        let catalog = Arc::clone(&self.catalog);
        let result = self
            .cache
            .cached(cache_key, || async move {
                catalog.get_data(endpoint, &params).await
            })
            .await;

        let value: Value = match result {
            Ok(value) => value?,
            Err(e) => {
                tracing::warn!(endpoint, "MusicBrainz lookup failed: {}", e);
                return None;
            }
        };

        match serde_json::from_value(value) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!(endpoint, "Unexpected MusicBrainz response shape: {}", e);
                None
            }
        }
    }
}

/// Walk `items` under each pass and return the first matching artist id.
///
/// With `wanted_title` set, only items whose title matches it (at the same
/// strictness) are considered. An artist matches on its name or any alias.
pub fn find_artist_id<T: Credited>(
    items: &[T],
    wanted_title: Option<&str>,
    artist: &str,
) -> Option<String> {
    for pass in Pass::ORDER {
        let strict = pass.is_strict();
        for item in items {
            if let Some(title) = wanted_title
                && !compare_strings(item.title(), title, strict)
            {
                continue;
            }
            for credit in item.artist_credit() {
                let candidate = &credit.artist;
                let matches = compare_strings(&candidate.name, artist, strict)
                    || candidate
                        .aliases
                        .iter()
                        .any(|alias| compare_strings(&alias.name, artist, strict));
                if matches && !candidate.id.is_empty() {
                    return Some(candidate.id.clone());
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::traits::mocks::MockCatalog;
    use serde_json::json;

    fn resolver(mock: MockCatalog) -> (ArtistIdResolver, Arc<MockCatalog>) {
        let mock = Arc::new(mock);
        let catalog: Arc<dyn CatalogApi> = mock.clone();
        let cache = Arc::new(ResponseCache::new(Duration::from_secs(60)));
        (ArtistIdResolver::new(catalog, cache), mock)
    }

    fn credit(id: &str, name: &str) -> Value {
        json!({"name": name, "artist": {"id": id, "name": name}})
    }

    fn release(title: &str, credits: Vec<Value>) -> Value {
        json!({"id": format!("rel-{}", title), "title": title, "artist-credit": credits})
    }

    fn recording(title: &str, credits: Vec<Value>) -> Value {
        json!({"id": format!("rec-{}", title), "title": title, "artist-credit": credits})
    }

    #[tokio::test]
    async fn test_upc_match_short_circuits_text_search() {
        let mock = MockCatalog::new()
            .respond(
                "release",
                "barcode:0602527290147",
                json!({"releases": [release("Jazz", vec![credit("queen-upc", "Queen")])]}),
            )
            .respond(
                "release",
                "release:",
                json!({"releases": [release("Jazz", vec![credit("queen-text", "Queen")])]}),
            );
        let (resolver, mock) = resolver(mock);

        let query = SearchQuery::artist("Queen")
            .with_album("Jazz")
            .with_upc("0602527290147");
        let id = resolver.resolve_artist_id(&query).await;

        assert_eq!(id.as_deref(), Some("queen-upc"));
        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].query.as_deref(), Some("barcode:0602527290147"));
    }

    #[tokio::test]
    async fn test_upc_queried_before_text_when_it_misses() {
        let mock = MockCatalog::new().respond(
            "release",
            "release:",
            json!({"releases": [release("Jazz", vec![credit("queen-id", "Queen")])]}),
        );
        let (resolver, mock) = resolver(mock);

        let query = SearchQuery::artist("Queen").with_album("Jazz").with_upc("000");
        let id = resolver.resolve_artist_id(&query).await;

        assert_eq!(id.as_deref(), Some("queen-id"));
        let requests = mock.requests();
        assert_eq!(requests[0].query.as_deref(), Some("barcode:000"));
        assert!(requests[1].query.as_deref().unwrap().contains("release:\"Jazz\""));
    }

    #[tokio::test]
    async fn test_barcode_search_accepts_any_release_title() {
        let mock = MockCatalog::new().respond(
            "release",
            "barcode:123",
            json!({"releases": [release("Something Else Entirely", vec![credit("a-id", "Queen")])]}),
        );
        let (resolver, _) = resolver(mock);

        let id = resolver
            .search_artist_by_album("Queen", None, Some("123"))
            .await;
        assert_eq!(id.as_deref(), Some("a-id"));
    }

    #[tokio::test]
    async fn test_strict_match_beats_earlier_loose_match() {
        let mock = MockCatalog::new().respond(
            "release",
            "release:",
            json!({"releases": [
                release("Abbey Road", vec![credit("loose-id", "The Beatles")]),
                release("Abbey Road", vec![credit("strict-id", "Beatles")]),
            ]}),
        );
        let (resolver, _) = resolver(mock);

        let id = resolver
            .search_artist_by_album("Beatles", Some("Abbey Road"), None)
            .await;
        assert_eq!(id.as_deref(), Some("strict-id"));
    }

    #[tokio::test]
    async fn test_loose_match_used_when_no_strict_match() {
        let mock = MockCatalog::new().respond(
            "release",
            "release:",
            json!({"releases": [release("Abbey Road", vec![credit("loose-id", "The Beatles")])]}),
        );
        let (resolver, _) = resolver(mock);

        let id = resolver
            .search_artist_by_album("Beatles", Some("Abbey Road"), None)
            .await;
        assert_eq!(id.as_deref(), Some("loose-id"));
    }

    #[tokio::test]
    async fn test_alias_match_returns_artist_id() {
        let mock = MockCatalog::new().respond(
            "release",
            "release:",
            json!({"releases": [{
                "id": "rel-1",
                "title": "Homogenic",
                "artist-credit": [{
                    "name": "Björk",
                    "artist": {
                        "id": "bjork-id",
                        "name": "Björk Guðmundsdóttir",
                        "aliases": [{"name": "Bjork"}]
                    }
                }]
            }]}),
        );
        let (resolver, _) = resolver(mock);

        let id = resolver
            .search_artist_by_album("Bjork", Some("Homogenic"), None)
            .await;
        assert_eq!(id.as_deref(), Some("bjork-id"));
    }

    #[tokio::test]
    async fn test_missing_releases_key_is_no_match() {
        let mock = MockCatalog::new().respond("release", "", json!({"not-releases": []}));
        let (resolver, _) = resolver(mock);

        let id = resolver
            .search_artist_by_album("Queen", Some("Jazz"), None)
            .await;
        assert!(id.is_none());
    }

    #[tokio::test]
    async fn test_title_mismatch_is_skipped() {
        let mock = MockCatalog::new().respond(
            "release",
            "release:",
            json!({"releases": [release("Greatest Hits", vec![credit("queen-id", "Queen")])]}),
        );
        let (resolver, _) = resolver(mock);

        let id = resolver
            .search_artist_by_album("Queen", Some("Jazz"), None)
            .await;
        assert!(id.is_none());
    }

    #[tokio::test]
    async fn test_second_spelling_is_tried() {
        // Only the normalized spelling "acdc" finds anything
        let mock = MockCatalog::new().respond(
            "release",
            "artist:\"acdc\"",
            json!({"releases": [release("Back in Black", vec![credit("acdc-id", "AC/DC")])]}),
        );
        let (resolver, mock) = resolver(mock);

        let id = resolver
            .search_artist_by_album("AC/DC", Some("Back in Black"), None)
            .await;

        assert_eq!(id.as_deref(), Some("acdc-id"));
        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].query.as_deref().unwrap().contains(r"AC\/DC"));
    }

    #[tokio::test]
    async fn test_isrc_lookup_accepts_any_recording() {
        let mock = MockCatalog::new().respond(
            "isrc/GBUM71029604",
            "",
            json!({"isrc": "GBUM71029604", "recordings": [
                recording("Bohemian Rhapsody (Remastered 2011)", vec![credit("queen-id", "Queen")])
            ]}),
        );
        let (resolver, mock) = resolver(mock);

        let query = SearchQuery::artist("Queen")
            .with_isrc("GBUM71029604")
            .with_track("Something Different");
        let id = resolver.resolve_artist_id(&query).await;

        assert_eq!(id.as_deref(), Some("queen-id"));
        let requests = mock.requests();
        assert_eq!(requests[0].endpoint, "isrc/GBUM71029604");
        assert_eq!(requests[0].inc.as_deref(), Some("artist-credits"));
    }

    #[tokio::test]
    async fn test_track_text_search() {
        let mock = MockCatalog::new().respond(
            "recording",
            "\"Under Pressure\" AND artist:\"Queen\"",
            json!({"recordings": [recording("Under Pressure", vec![
                credit("queen-id", "Queen"),
                credit("bowie-id", "David Bowie"),
            ])]}),
        );
        let (resolver, _) = resolver(mock);

        let query = SearchQuery::artist("David Bowie").with_track("Under Pressure");
        let id = resolver.resolve_artist_id(&query).await;
        assert!(id.is_none(), "query text is built from the requested artist");

        let query = SearchQuery::artist("Queen").with_track("Under Pressure");
        let id = resolver.resolve_artist_id(&query).await;
        assert_eq!(id.as_deref(), Some("queen-id"));
    }

    #[tokio::test]
    async fn test_tiers_fall_through_in_order() {
        let mock = MockCatalog::new().respond(
            "recording",
            "",
            json!({"recordings": [recording("Bicycle Race", vec![credit("queen-id", "Queen")])]}),
        );
        let (resolver, mock) = resolver(mock);

        let query = SearchQuery::artist("Queen")
            .with_upc("1")
            .with_isrc("2")
            .with_album("Jazz")
            .with_track("Bicycle Race");
        let id = resolver.resolve_artist_id(&query).await;

        assert_eq!(id.as_deref(), Some("queen-id"));
        let endpoints: Vec<_> = mock.requests().into_iter().map(|r| r.endpoint).collect();
        assert_eq!(
            endpoints,
            vec!["release", "isrc/2", "release", "release", "recording"]
        );
    }

    #[tokio::test]
    async fn test_undecodable_response_is_no_match() {
        let mock = MockCatalog::new().respond_undecodable("release", "");
        let (resolver, _) = resolver(mock);

        let query = SearchQuery::artist("Queen").with_album("Jazz");
        assert!(resolver.resolve_artist_id(&query).await.is_none());
    }

    #[tokio::test]
    async fn test_network_error_is_no_match() {
        let mock = MockCatalog::with_error(CatalogError::Network("timeout".to_string()));
        let (resolver, _) = resolver(mock);

        let query = SearchQuery::artist("Queen").with_album("Jazz").with_track("Mustapha");
        assert!(resolver.resolve_artist_id(&query).await.is_none());
    }

    #[tokio::test]
    async fn test_repeated_lookup_is_served_from_cache() {
        let mock = MockCatalog::new().respond(
            "release",
            "release:",
            json!({"releases": [release("Jazz", vec![credit("queen-id", "Queen")])]}),
        );
        let (resolver, mock) = resolver(mock);

        let query = SearchQuery::artist("Queen").with_album("Jazz");
        assert_eq!(resolver.resolve_artist_id(&query).await.as_deref(), Some("queen-id"));
        assert_eq!(resolver.resolve_artist_id(&query).await.as_deref(), Some("queen-id"));
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_artist_resolves_nothing() {
        let (resolver, mock) = resolver(MockCatalog::new());
        let query = SearchQuery::artist("   ").with_album("Jazz");
        assert!(resolver.resolve_artist_id(&query).await.is_none());
        assert!(mock.requests().is_empty());
    }
}
