//! Tag parsing and cover extraction commands.

use std::path::Path;
use tokio::runtime::Runtime;

use crate::config::Config;
use crate::error::{Result, ResultExt};
use crate::tags::{AudioSource, AudioTags, TagExtractor};

/// Open `input` either as a path for the tool or as a streamed local file.
async fn open_source(input: &str, stdin: bool) -> Result<AudioSource> {
    if stdin {
        AudioSource::open_file(input)
            .await
            .with_context(format!("Failed to open {}", input))
    } else {
        Ok(AudioSource::path(input))
    }
}

/// Show the tags of a file
pub fn cmd_tags(
    rt: &Runtime,
    config: &Config,
    input: &str,
    stdin: bool,
    raw: bool,
) -> Result<()> {
    rt.block_on(async {
        let extractor = TagExtractor::new(&config.inspection);
        let source = open_source(input, stdin).await?;
        let tags = extractor.parse_tags(source).await?;

        if raw {
            println!("{}", serde_json::to_string_pretty(&tags.raw)?);
        } else {
            print_tags(&tags);
        }
        Ok(())
    })
}

/// Extract the embedded cover of a file to `output`
pub fn cmd_cover(
    rt: &Runtime,
    config: &Config,
    input: &str,
    output: &Path,
    stdin: bool,
) -> Result<()> {
    rt.block_on(async {
        let extractor = TagExtractor::new(&config.inspection);
        let source = open_source(input, stdin).await?;

        match extractor.get_embedded_image(source).await? {
            Some(image) => {
                std::fs::write(output, &image)
                    .with_context(format!("Failed to write {:?}", output))?;
                println!("✓ Wrote {} bytes to {:?}", image.len(), output);
            }
            None => println!("✗ No embedded image in {}", input),
        }
        Ok(())
    })
}

fn print_tags(tags: &AudioTags) {
    println!("File:     {}", tags.filename);
    println!(
        "Format:   {} ({} Hz, {} ch, {} bit, {} kbps)",
        tags.format, tags.sample_rate, tags.channels, tags.bits_per_sample, tags.bit_rate
    );
    if let Some(duration) = tags.duration {
        println!("Duration: {}:{:02}", duration / 60, duration % 60);
    }
    println!();
    println!("  Title:   {}", tags.title());
    println!("  Artists: {}", tags.artists().join(", "));
    let album_artists = tags.album_artists();
    if !album_artists.is_empty() {
        println!("  Album artists: {}", album_artists.join(", "));
    }
    if let Some(album) = tags.album() {
        println!("  Album:   {}", album);
    }
    if let Some(album_type) = tags.album_type() {
        println!("  Type:    {}", album_type);
    }
    match (tags.disc(), tags.track()) {
        (Some(disc), Some(track)) => println!("  Track:   {}-{}", disc, track),
        (None, Some(track)) => println!("  Track:   {}", track),
        _ => {}
    }
    if let Some(year) = tags.year() {
        println!("  Year:    {}", year);
    }
    let genres = tags.genres();
    if !genres.is_empty() {
        println!("  Genres:  {}", genres.join(", "));
    }
    if let Some(isrc) = tags.isrc() {
        println!("  ISRC:    {}", isrc);
    }
    if let Some(barcode) = tags.barcode() {
        println!("  Barcode: {}", barcode);
    }
    println!("  Cover:   {}", if tags.has_cover_image { "yes" } else { "no" });

    let artist_ids = tags.musicbrainz_artistids();
    if !artist_ids.is_empty() || tags.musicbrainz_albumid().is_some() {
        println!();
        println!("  MusicBrainz:");
        for id in artist_ids {
            println!("    artist:        {}", id);
        }
        for id in tags.musicbrainz_albumartistids() {
            println!("    album artist:  {}", id);
        }
        if let Some(id) = tags.musicbrainz_albumid() {
            println!("    release:       {}", id);
        }
        if let Some(id) = tags.musicbrainz_releasegroupid() {
            println!("    release group: {}", id);
        }
        if let Some(id) = tags.musicbrainz_trackid() {
            println!("    recording:     {}", id);
        }
    }
}
