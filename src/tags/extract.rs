//! ffprobe/ffmpeg drivers.
//!
//! Both operations take either a path/URI the tool can open itself, or a
//! stream of byte chunks that is fed through the tool's stdin by a
//! background task while stdout is drained here.

use std::io;
use std::path::Path;
use std::time::Duration;

use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt};
use serde_json::Value;
use tokio::io::AsyncReadExt;
use tokio::sync::oneshot;

use super::error::{DataError, TagError};
use super::feeder::{FeedOutcome, feed_chunks};
use super::probe::reported_error;
use super::record::AudioTags;
use crate::config::InspectionConfig;
use crate::process::{AsyncProcess, ProcessOptions};

/// Chunk size used when streaming a local file.
pub const FILE_CHUNK_SIZE: usize = 64 * 1024;

/// Stand-in input name for streamed data.
pub const STDIN_INPUT: &str = "-";

/// Bytes of `-version` output read before giving up on a newline.
const VERSION_READ_LIMIT: usize = 4096;

/// How long a finished tool's feeder gets to report back.
const FEED_SETTLE: Duration = Duration::from_secs(1);

/// Where the inspection tool reads its input from.
pub enum AudioSource {
    /// Local path or URL, opened by the tool itself
    Path(String),
    /// Raw file contents, piped through stdin
    Stream(BoxStream<'static, Vec<u8>>),
}

impl AudioSource {
    pub fn path(path: impl Into<String>) -> Self {
        Self::Path(path.into())
    }

    pub fn stream<S>(chunks: S) -> Self
    where
        S: Stream<Item = Vec<u8>> + Send + 'static,
    {
        Self::Stream(chunks.boxed())
    }

    /// Stream a local file in fixed-size chunks.
    pub async fn open_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = tokio::fs::File::open(path.as_ref()).await?;
        Ok(Self::stream(file_chunks(file, FILE_CHUNK_SIZE)))
    }

    /// The `-i` argument for this source.
    pub fn input_arg(&self) -> &str {
        match self {
            Self::Path(path) => path,
            Self::Stream(_) => STDIN_INPUT,
        }
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, Self::Stream(_))
    }
}

impl std::fmt::Debug for AudioSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Read `file` as a stream of chunks; a read error ends the stream.
pub fn file_chunks(file: tokio::fs::File, chunk_size: usize) -> impl Stream<Item = Vec<u8>> {
    stream::unfold(file, move |mut file| async move {
        let mut buf = vec![0u8; chunk_size];
        match file.read(&mut buf).await {
            Ok(0) => None,
            Ok(n) => {
                buf.truncate(n);
                Some((buf, file))
            }
            Err(e) => {
                tracing::warn!("Reading input file failed: {}", e);
                None
            }
        }
    })
}

/// ffprobe arguments for a JSON report on `input`.
pub fn probe_args(input: &str) -> Vec<String> {
    [
        "-hide_banner",
        "-loglevel",
        "fatal",
        "-show_error",
        "-show_format",
        "-show_streams",
        "-print_format",
        "json",
        "-i",
        input,
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// ffmpeg arguments that copy the first video (cover) stream out as mjpeg.
pub fn cover_args(input: &str) -> Vec<String> {
    [
        "-hide_banner",
        "-loglevel",
        "fatal",
        "-i",
        input,
        "-map",
        "0:v",
        "-c",
        "copy",
        "-f",
        "mjpeg",
        "-",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Parse ffprobe's stdout into a tag record.
pub fn parse_report(stdout: &[u8]) -> Result<AudioTags, DataError> {
    let raw: Value = serde_json::from_slice(stdout)?;
    if let Some(message) = reported_error(&raw) {
        return Err(DataError::Reported(message));
    }
    AudioTags::parse(raw)
}

/// First line of `<program> -version`, or `None` if it cannot be run.
pub async fn tool_version(program: &str) -> Option<String> {
    let options = ProcessOptions {
        enable_stdin: false,
        enable_stdout: true,
    };
    let mut proc = AsyncProcess::spawn(program, ["-version"], options).ok()?;
    // The banner's first line is all we print
    let head = proc.read(VERSION_READ_LIMIT).await.ok()?;
    if let Err(e) = proc.close().await {
        tracing::debug!(program, "Waiting for version check failed: {}", e);
    }

    String::from_utf8_lossy(&head)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

/// Runs the inspection tools.
#[derive(Debug, Clone)]
pub struct TagExtractor {
    ffprobe: String,
    ffmpeg: String,
    cover_feed_limit: usize,
}

impl Default for TagExtractor {
    fn default() -> Self {
        Self::new(&InspectionConfig::default())
    }
}

impl TagExtractor {
    pub fn new(config: &InspectionConfig) -> Self {
        Self {
            ffprobe: config.ffprobe.clone(),
            ffmpeg: config.ffmpeg.clone(),
            cover_feed_limit: config.cover_feed_limit,
        }
    }

    /// Probe `source` and build its [`AudioTags`].
    pub async fn parse_tags(&self, source: AudioSource) -> Result<AudioTags, TagError> {
        let input = source.input_arg().to_string();
        let args = probe_args(&input);

        let (stdout, feed) = run_tool(&self.ffprobe, &args, source, None)
            .await
            .map_err(|e| TagError::invalid_data(&input, e))?;

        parse_report(&stdout).map_err(|e| {
            if let Some(feed) = feed
                && feed.cut_short()
            {
                tracing::warn!(
                    input = %input,
                    bytes_written = feed.bytes_written,
                    "ffprobe stopped reading before the end of the input"
                );
            }
            TagError::invalid_data(&input, e)
        })
    }

    /// Extract the embedded cover image, if any.
    ///
    /// Streamed input is capped at the configured feed limit; the cover is
    /// expected near the start of the file.
    pub async fn get_embedded_image(
        &self,
        source: AudioSource,
    ) -> Result<Option<Vec<u8>>, TagError> {
        let input = source.input_arg().to_string();
        let args = cover_args(&input);

        let (stdout, _) = run_tool(&self.ffmpeg, &args, source, Some(self.cover_feed_limit))
            .await
            .map_err(|e| TagError::invalid_data(&input, e))?;

        if stdout.is_empty() {
            tracing::debug!(input = %input, "No embedded image");
            return Ok(None);
        }
        tracing::debug!(input = %input, bytes = stdout.len(), "Extracted embedded image");
        Ok(Some(stdout))
    }
}

/// Run `program`, feeding streamed input in the background, and collect
/// all of its stdout.
///
/// The feed outcome is collected once the child has exited; a feeder still
/// stuck on its producer after [`FEED_SETTLE`] is reported as `None`.
async fn run_tool(
    program: &str,
    args: &[String],
    source: AudioSource,
    feed_limit: Option<usize>,
) -> Result<(Vec<u8>, Option<FeedOutcome>), DataError> {
    let options = ProcessOptions {
        enable_stdin: source.is_stream(),
        enable_stdout: true,
    };
    let mut proc = AsyncProcess::spawn(program, args, options).map_err(|source| {
        DataError::Spawn {
            program: program.to_string(),
            source,
        }
    })?;

    let mut feed_rx = None;
    if let AudioSource::Stream(chunks) = source
        && let Some(stdin) = proc.take_stdin()
    {
        let (tx, rx) = oneshot::channel();
        proc.attach_task(async move {
            let outcome = feed_chunks(stdin, chunks, feed_limit).await;
            let _ = tx.send(outcome);
        });
        feed_rx = Some(rx);
    }

    let stdout = proc.read_to_end().await?;
    let status = proc.wait().await?;
    if !status.success() {
        tracing::debug!(program, %status, "Inspection tool exited with failure");
    }

    let feed = match feed_rx {
        Some(rx) => tokio::time::timeout(FEED_SETTLE, rx)
            .await
            .ok()
            .and_then(Result::ok),
        None => None,
    };

    proc.close().await?;
    Ok((stdout, feed))
}
