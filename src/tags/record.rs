//! Normalized audio tag record.
//!
//! [`AudioTags`] is built once from an ffprobe report and never changes.
//! Everything beyond the stored technical fields (title, artists, disc,
//! year, MusicBrainz ids, ...) is derived on access from the merged tag
//! table and the filename, with fallbacks for missing or sloppy tags.

use std::collections::HashMap;

use serde_json::Value;

use super::error::DataError;
use super::probe::{self, ProbeReport};

/// Placeholder used when no artist can be found anywhere.
pub const UNKNOWN_ARTIST: &str = "[unknown]";

/// The only multi-item splitter we accept (MusicBrainz Picard's default).
/// A slash would break artists like "AC/DC".
pub const TAG_SPLITTER: char = ';';

/// Freeform featuring markers inside a single artist string.
const FEATURING_SPLITTERS: &[&str] = &["featuring", " feat. ", " feat ", "feat."];

/// Codecs that mean an embedded cover image.
const COVER_CODECS: &[&str] = &["mjpeg", "png"];

const DEFAULT_SAMPLE_RATE: u32 = 44100;
const DEFAULT_CHANNELS: u32 = 2;
const DEFAULT_BITS_PER_SAMPLE: u32 = 16;
const DEFAULT_BIT_RATE: u64 = 320;

/// Audio metadata parsed from an audio file.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioTags {
    /// The untouched ffprobe report
    pub raw: Value,
    pub sample_rate: u32,
    pub channels: u32,
    pub bits_per_sample: u32,
    /// Container format name (e.g. "mp3", "flac", "mov,mp4,m4a,3gp,3g2,mj2")
    pub format: String,
    pub bit_rate: u64,
    /// Whole seconds, `None` when unknown or zero
    pub duration: Option<u64>,
    /// Merged tag table with normalized keys
    pub tags: HashMap<String, String>,
    pub has_cover_image: bool,
    /// Path or URI as reported by ffprobe ("pipe:" for stdin)
    pub filename: String,
}

/// Split a tag value on the tag splitter. Empty input gives no items.
pub fn split_items(value: &str) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    value
        .split(TAG_SPLITTER)
        .map(|item| item.trim().to_string())
        .collect()
}

/// Parse every artist out of a freeform artist string.
///
/// Without a multi-artist tag the artist string may hold several artists,
/// featuring credits included. Each tag item is split on the featuring
/// markers; the result is deduplicated and keeps first-seen order.
pub fn split_artists(value: &str) -> Vec<String> {
    let mut artists: Vec<String> = Vec::new();
    for item in split_items(value) {
        let mut parts = vec![item];
        for splitter in FEATURING_SPLITTERS {
            parts = parts
                .iter()
                .flat_map(|part| part.split(splitter))
                .map(|part| part.trim().to_string())
                .collect();
        }
        for part in parts {
            if !part.is_empty() && !artists.contains(&part) {
                artists.push(part);
            }
        }
    }
    artists
}

/// Lower-case a tag key and drop spaces and underscores.
pub fn normalize_tag_key(key: &str) -> String {
    key.to_lowercase().replace([' ', '_'], "")
}

fn non_empty(items: Vec<String>) -> Option<Vec<String>> {
    let items: Vec<String> = items.into_iter().filter(|i| !i.is_empty()).collect();
    if items.is_empty() { None } else { Some(items) }
}

/// Integer before any "/" ("2/10" -> 2).
fn parse_leading_number(value: &str) -> Option<u32> {
    value.split('/').next()?.trim().parse().ok()
}

impl AudioTags {
    /// Parse a raw ffprobe report.
    pub fn parse(raw: Value) -> Result<Self, DataError> {
        let report: ProbeReport = serde_json::from_value(raw.clone())?;
        Self::from_report(raw, report)
    }

    /// Build the record from an already-decoded report.
    pub fn from_report(raw: Value, report: ProbeReport) -> Result<Self, DataError> {
        let audio_stream = report
            .streams
            .iter()
            .find(|s| s.codec_type == "audio")
            .ok_or(DataError::NoAudioStream)?;

        let has_cover_image = report.streams.iter().any(|s| {
            s.codec_name
                .as_deref()
                .is_some_and(|codec| COVER_CODECS.contains(&codec))
        });

        // Later blocks win: streams in order, then the container
        let mut tags = HashMap::new();
        let blocks = report
            .streams
            .iter()
            .map(|s| &s.tags)
            .chain(std::iter::once(&report.format.tags));
        for block in blocks {
            for (key, value) in block {
                tags.insert(normalize_tag_key(key), probe::tag_text(value));
            }
        }

        let sample_rate = audio_stream
            .sample_rate
            .as_ref()
            .and_then(|v| v.as_positive())
            .map_or(DEFAULT_SAMPLE_RATE, |v| v as u32);
        let channels = audio_stream
            .channels
            .as_ref()
            .and_then(|v| v.as_positive())
            .map_or(DEFAULT_CHANNELS, |v| v as u32);
        let bits_per_sample = audio_stream
            .bits_per_raw_sample
            .as_ref()
            .and_then(|v| v.as_positive())
            .or_else(|| {
                audio_stream
                    .bits_per_sample
                    .as_ref()
                    .and_then(|v| v.as_positive())
            })
            .map_or(DEFAULT_BITS_PER_SAMPLE, |v| v as u32);

        let format = report.format;
        let bit_rate = format
            .bit_rate
            .as_ref()
            .and_then(|v| v.as_positive())
            .unwrap_or(DEFAULT_BIT_RATE);
        let duration = format.duration.as_ref().and_then(|v| v.as_positive());

        Ok(Self {
            raw,
            sample_rate,
            channels,
            bits_per_sample,
            format: format.format_name,
            bit_rate,
            duration,
            tags,
            has_cover_image,
            filename: format.filename,
        })
    }

    /// Get a tag by normalized key, empty values treated as missing.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.tags
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Last path segment of the filename without its extension.
    fn filename_stem(&self) -> &str {
        let name = self
            .filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.filename);
        match name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => name,
        }
    }

    /// "Artist - Title" split of the filename stem: the artist is the part
    /// before the first separator, the title the part after the last one.
    fn filename_parts(&self) -> Option<(&str, &str)> {
        let stem = self.filename_stem();
        let (artist, _) = stem.split_once(" - ")?;
        let (_, title) = stem.rsplit_once(" - ")?;
        Some((artist.trim(), title.trim()))
    }

    /// Title tag, else parsed from the filename.
    pub fn title(&self) -> String {
        if let Some(tag) = self.get("title") {
            return tag.to_string();
        }
        match self.filename_parts() {
            Some((_, title)) if !title.is_empty() => title.to_string(),
            _ => self.filename_stem().to_string(),
        }
    }

    pub fn album(&self) -> Option<&str> {
        self.get("album")
    }

    /// Track artists; never empty.
    pub fn artists(&self) -> Vec<String> {
        // prefer multi-artist tag
        if let Some(artists) = self.get("artists").and_then(|t| non_empty(split_items(t))) {
            return artists;
        }
        if let Some(artists) = self.get("artist").and_then(|t| non_empty(split_artist_tag(t))) {
            return artists;
        }
        if let Some(artists) = self
            .filename_parts()
            .and_then(|(artist, _)| non_empty(split_artists(artist)))
        {
            return artists;
        }
        vec![UNKNOWN_ARTIST.to_string()]
    }

    /// Album artists, if tagged. No filename fallback.
    pub fn album_artists(&self) -> Vec<String> {
        if let Some(artists) = self
            .get("albumartists")
            .and_then(|t| non_empty(split_items(t)))
        {
            return artists;
        }
        self.get("albumartist")
            .and_then(|t| non_empty(split_artist_tag(t)))
            .unwrap_or_default()
    }

    pub fn genres(&self) -> Vec<String> {
        self.get("genre")
            .and_then(|t| non_empty(split_items(t)))
            .unwrap_or_default()
    }

    /// Disc number ("2/10" -> 2).
    pub fn disc(&self) -> Option<u32> {
        self.get("disc").and_then(parse_leading_number)
    }

    /// Track number ("5/12" -> 5).
    pub fn track(&self) -> Option<u32> {
        self.get("track").and_then(parse_leading_number)
    }

    /// Release year from the first date-ish tag present.
    pub fn year(&self) -> Option<i32> {
        let tag = ["originalyear", "originaldate", "date"]
            .into_iter()
            .find_map(|key| self.get(key))?;
        tag.split('-').next()?.trim().parse().ok()
    }

    pub fn musicbrainz_artistids(&self) -> Vec<String> {
        self.get("musicbrainzartistid")
            .map(split_items)
            .unwrap_or_default()
    }

    pub fn musicbrainz_albumartistids(&self) -> Vec<String> {
        self.get("musicbrainzalbumartistid")
            .map(split_items)
            .unwrap_or_default()
    }

    /// MusicBrainz release id.
    pub fn musicbrainz_albumid(&self) -> Option<&str> {
        self.get("musicbrainzalbumid")
    }

    pub fn musicbrainz_releasegroupid(&self) -> Option<&str> {
        self.get("musicbrainzreleasegroupid")
    }

    /// Recording id, falling back to the release track id.
    pub fn musicbrainz_trackid(&self) -> Option<&str> {
        self.get("musicbrainztrackid")
            .or_else(|| self.get("musicbrainzreleasetrackid"))
    }

    /// Release track id, falling back to the recording id.
    pub fn musicbrainz_releasetrackid(&self) -> Option<&str> {
        self.get("musicbrainzreleasetrackid")
            .or_else(|| self.get("musicbrainztrackid"))
    }

    /// First ISRC (ID3 writes it as TSRC).
    pub fn isrc(&self) -> Option<&str> {
        let tag = self.get("isrc").or_else(|| self.get("tsrc"))?;
        tag.split(TAG_SPLITTER).map(str::trim).find(|t| !t.is_empty())
    }

    pub fn barcode(&self) -> Option<&str> {
        self.get("barcode").or_else(|| self.get("upc"))
    }

    /// Album type ("album", "single", "compilation", ...).
    pub fn album_type(&self) -> Option<&str> {
        self.get("musicbrainzalbumtype")
            .or_else(|| self.get("releasetype"))
    }
}

/// Single artist tag: semicolons mean a proper list, otherwise freeform.
fn split_artist_tag(tag: &str) -> Vec<String> {
    if tag.contains(TAG_SPLITTER) {
        split_items(tag)
    } else {
        split_artists(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Build a record from a container tag block and a filename.
    fn tags_with(filename: &str, tags: Value) -> AudioTags {
        AudioTags::parse(json!({
            "streams": [{"codec_type": "audio", "codec_name": "flac", "sample_rate": "48000", "channels": 2}],
            "format": {"format_name": "flac", "filename": filename, "tags": tags}
        }))
        .unwrap()
    }

    #[test]
    fn test_report_with_filename_fallbacks() {
        let raw = json!({
            "streams": [{"codec_type": "audio", "sample_rate": "44100", "channels": 2}],
            "format": {"format_name": "mp3", "duration": "181.2", "filename": "Artist - Title.mp3", "tags": {}}
        });

        let tags = AudioTags::parse(raw).unwrap();

        assert_eq!(tags.sample_rate, 44100);
        assert_eq!(tags.channels, 2);
        assert_eq!(tags.duration, Some(181));
        assert_eq!(tags.title(), "Title");
        assert_eq!(tags.artists(), vec!["Artist".to_string()]);
        assert_eq!(tags.bits_per_sample, 16);
        assert_eq!(tags.bit_rate, 320);
        assert!(!tags.has_cover_image);
    }

    #[test]
    fn test_technical_fields_from_first_audio_stream() {
        let raw = json!({
            "streams": [
                {"codec_type": "video", "codec_name": "png"},
                {"codec_type": "audio", "codec_name": "flac", "sample_rate": "96000", "channels": 6,
                 "bits_per_raw_sample": "24", "bits_per_sample": 0},
                {"codec_type": "audio", "codec_name": "aac", "sample_rate": "22050", "channels": 1}
            ],
            "format": {"format_name": "matroska,webm", "filename": "x.mkv", "bit_rate": "2400000", "duration": "0.000"}
        });

        let tags = AudioTags::parse(raw).unwrap();

        assert_eq!(tags.sample_rate, 96000);
        assert_eq!(tags.channels, 6);
        assert_eq!(tags.bits_per_sample, 24);
        assert_eq!(tags.bit_rate, 2_400_000);
        assert_eq!(tags.duration, None);
        assert!(tags.has_cover_image);
        assert_eq!(tags.format, "matroska,webm");
    }

    #[test]
    fn test_bits_per_sample_falls_back_to_standard_field() {
        let raw = json!({
            "streams": [{"codec_type": "audio", "bits_per_sample": 24}],
            "format": {"format_name": "wav", "filename": "x.wav"}
        });
        assert_eq!(AudioTags::parse(raw).unwrap().bits_per_sample, 24);
    }

    #[test]
    fn test_no_audio_stream_is_a_data_error() {
        let raw = json!({
            "streams": [{"codec_type": "video", "codec_name": "mjpeg"}],
            "format": {"format_name": "image2", "filename": "cover.jpg"}
        });
        assert!(matches!(AudioTags::parse(raw), Err(DataError::NoAudioStream)));
    }

    #[test]
    fn test_missing_required_key_is_a_data_error() {
        let raw = json!({
            "streams": [{"codec_type": "audio"}],
            "format": {"filename": "x.mp3"}
        });
        assert!(matches!(AudioTags::parse(raw), Err(DataError::Json(_))));
    }

    #[test]
    fn test_tag_keys_are_normalized_and_container_wins() {
        let raw = json!({
            "streams": [{"codec_type": "audio", "tags": {"ALBUM ARTIST": "Stream AA", "Title": "Stream Title"}}],
            "format": {"format_name": "ogg", "filename": "x.ogg", "tags": {"title": "Container Title", "MUSICBRAINZ_TRACKID": "rec-1"}}
        });

        let tags = AudioTags::parse(raw).unwrap();

        assert_eq!(tags.get("albumartist"), Some("Stream AA"));
        assert_eq!(tags.title(), "Container Title");
        assert_eq!(tags.musicbrainz_trackid(), Some("rec-1"));
    }

    #[test]
    fn test_multi_artist_tag_wins_over_artist_tag() {
        let tags = tags_with(
            "x.flac",
            json!({"artists": "Queen;David Bowie", "artist": "Queen feat. Someone Else"}),
        );
        assert_eq!(tags.artists(), vec!["Queen", "David Bowie"]);
    }

    #[test]
    fn test_artist_tag_with_semicolons_is_a_list() {
        let tags = tags_with("x.flac", json!({"artist": "Daft Punk; Pharrell Williams"}));
        assert_eq!(tags.artists(), vec!["Daft Punk", "Pharrell Williams"]);
    }

    #[test]
    fn test_artist_tag_featuring_split() {
        let tags = tags_with("x.flac", json!({"artist": "Daft Punk feat. Pharrell Williams"}));
        assert_eq!(tags.artists(), vec!["Daft Punk", "Pharrell Williams"]);

        let tags = tags_with("x.flac", json!({"artist": "Santana featuring Rob Thomas"}));
        assert_eq!(tags.artists(), vec!["Santana", "Rob Thomas"]);
    }

    #[test]
    fn test_artist_from_filename() {
        let tags = tags_with("/music/Daft Punk feat. Pharrell - Get Lucky.flac", json!({}));
        assert_eq!(tags.artists(), vec!["Daft Punk", "Pharrell"]);
        assert_eq!(tags.title(), "Get Lucky");
    }

    #[test]
    fn test_filename_with_several_separators() {
        let tags = tags_with("C:\\Music\\Queen - Jazz - Mustapha.flac", json!({}));
        assert_eq!(tags.artists(), vec!["Queen"]);
        assert_eq!(tags.title(), "Mustapha");
    }

    #[test]
    fn test_unknown_artist_sentinel() {
        let tags = tags_with("/music/track01.flac", json!({}));
        assert_eq!(tags.artists(), vec![UNKNOWN_ARTIST.to_string()]);
        assert_eq!(tags.title(), "track01");
    }

    #[test]
    fn test_empty_artist_tag_falls_through() {
        let tags = tags_with("Artist - Title.flac", json!({"artist": ""}));
        assert_eq!(tags.artists(), vec!["Artist"]);
    }

    #[test]
    fn test_album_artists_have_no_filename_fallback() {
        let tags = tags_with("Artist - Title.flac", json!({}));
        assert!(tags.album_artists().is_empty());

        let tags = tags_with("x.flac", json!({"album_artist": "Various Artists"}));
        assert_eq!(tags.album_artists(), vec!["Various Artists"]);

        let tags = tags_with("x.flac", json!({"albumartists": "A;B", "albumartist": "C"}));
        assert_eq!(tags.album_artists(), vec!["A", "B"]);
    }

    #[test]
    fn test_disc_and_track_numbers() {
        let tags = tags_with("x.flac", json!({"disc": "2/10", "track": "07"}));
        assert_eq!(tags.disc(), Some(2));
        assert_eq!(tags.track(), Some(7));

        let tags = tags_with("x.flac", json!({"disc": "two"}));
        assert_eq!(tags.disc(), None);
        assert_eq!(tags.track(), None);
    }

    #[test]
    fn test_year_priority_and_parsing() {
        let tags = tags_with(
            "x.flac",
            json!({"date": "2011-06-20", "originaldate": "1978-11-10"}),
        );
        assert_eq!(tags.year(), Some(1978));

        let tags = tags_with("x.flac", json!({"date": "2011-06-20"}));
        assert_eq!(tags.year(), Some(2011));

        let tags = tags_with("x.flac", json!({"date": "unknown"}));
        assert_eq!(tags.year(), None);
    }

    #[test]
    fn test_genres_and_ids() {
        let tags = tags_with(
            "x.flac",
            json!({
                "genre": "Rock; Glam Rock",
                "MUSICBRAINZ_ARTISTID": "a1;a2",
                "musicbrainz_albumartistid": "aa1",
                "musicbrainz_releasegroupid": "rg1",
                "musicbrainz_albumid": "rel1",
                "MusicBrainz Release Track Id": "rt1",
                "RELEASETYPE": "album",
                "ISRC": "GBUM71029604",
                "BARCODE": "0602527290147"
            }),
        );

        assert_eq!(tags.genres(), vec!["Rock", "Glam Rock"]);
        assert_eq!(tags.musicbrainz_artistids(), vec!["a1", "a2"]);
        assert_eq!(tags.musicbrainz_albumartistids(), vec!["aa1"]);
        assert_eq!(tags.musicbrainz_releasegroupid(), Some("rg1"));
        assert_eq!(tags.musicbrainz_albumid(), Some("rel1"));
        assert_eq!(tags.musicbrainz_releasetrackid(), Some("rt1"));
        assert_eq!(tags.musicbrainz_trackid(), Some("rt1"));
        assert_eq!(tags.album_type(), Some("album"));
        assert_eq!(tags.isrc(), Some("GBUM71029604"));
        assert_eq!(tags.barcode(), Some("0602527290147"));
    }

    #[test]
    fn test_split_items() {
        assert!(split_items("").is_empty());
        assert_eq!(split_items("a; b ;c"), vec!["a", "b", "c"]);
        assert_eq!(split_items(" solo "), vec!["solo"]);
    }

    #[test]
    fn test_split_artists_dedupes() {
        assert_eq!(split_artists("A feat. B; B"), vec!["A", "B"]);
    }

    #[test]
    fn test_normalize_tag_key() {
        assert_eq!(normalize_tag_key("MusicBrainz Album_Artist Id"), "musicbrainzalbumartistid");
    }
}
