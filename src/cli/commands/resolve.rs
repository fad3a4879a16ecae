//! MusicBrainz artist id commands.

use std::path::Path;
use tokio::runtime::Runtime;

use crate::catalog::{ArtistIdResolver, SearchQuery};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::tags::{AudioSource, TagExtractor};

/// Resolve an artist id from command-line details
#[allow(clippy::too_many_arguments)]
pub fn cmd_resolve(
    rt: &Runtime,
    config: &Config,
    artist: &str,
    album: Option<&str>,
    upc: Option<&str>,
    track: Option<&str>,
    isrc: Option<&str>,
) -> Result<()> {
    let mut query = SearchQuery::artist(artist);
    if let Some(album) = album {
        query = query.with_album(album);
    }
    if let Some(upc) = upc {
        query = query.with_upc(upc);
    }
    if let Some(track) = track {
        query = query.with_track(track);
    }
    if let Some(isrc) = isrc {
        query = query.with_isrc(isrc);
    }

    let resolver = ArtistIdResolver::from_config(&config.catalog)?;
    match rt.block_on(resolver.resolve_artist_id(&query)) {
        Some(id) => {
            println!("✓ {}", id);
            println!("  https://musicbrainz.org/artist/{}", id);
        }
        None => println!("✗ No MusicBrainz artist found for {:?}", artist),
    }
    Ok(())
}

/// Resolve the artist id of a file from its tags and compare it with the
/// id already embedded in the file
pub fn cmd_identify(rt: &Runtime, config: &Config, path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(Error::not_found(path));
    }

    rt.block_on(async {
        let extractor = TagExtractor::new(&config.inspection);
        let tags = extractor
            .parse_tags(AudioSource::path(path.to_string_lossy()))
            .await?;

        println!("Identifying: {:?}", path);
        let Some(query) = SearchQuery::from_tags(&tags) else {
            println!("✗ No artist in tags or filename, nothing to search for");
            return Ok(());
        };
        println!("  Artist: {}", query.artist_name);
        if let Some(album) = &query.album_name {
            println!("  Album:  {}", album);
        }
        if let Some(track) = &query.track_name {
            println!("  Track:  {}", track);
        }
        println!();

        let resolver = ArtistIdResolver::from_config(&config.catalog)?;
        let resolved = resolver.resolve_artist_id(&query).await;
        let embedded = tags.musicbrainz_artistids();

        match resolved {
            Some(id) if embedded.contains(&id) => println!("✓ {} (matches embedded tag)", id),
            Some(id) if embedded.is_empty() => println!("✓ {} (file has no artist id tag)", id),
            Some(id) => {
                println!("! {} differs from embedded {}", id, embedded.join(", "));
            }
            None => println!("✗ No MusicBrainz artist found"),
        }
        Ok(())
    })
}
