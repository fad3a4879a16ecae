//! Background stdin feeder for streamed inspection input.
//!
//! Pulls chunks from a producer and writes them into the child's stdin,
//! optionally stopping at a byte budget. The sink is always shut down at
//! the end so the child sees EOF.

use futures::{Stream, StreamExt};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Why the feeder stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStop {
    /// The producer ran out of chunks
    Exhausted,
    /// The byte budget was used up
    LimitReached,
    /// The child closed its end of the pipe
    ReaderClosed,
    /// Any other write error
    WriteFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedOutcome {
    pub bytes_written: usize,
    pub stopped: FeedStop,
}

impl FeedOutcome {
    /// True when the child did not receive the whole input.
    pub fn cut_short(&self) -> bool {
        matches!(self.stopped, FeedStop::ReaderClosed | FeedStop::WriteFailed)
    }
}

/// Write every chunk from `chunks` into `sink`, then shut the sink down.
///
/// With a `limit`, no more than `limit` bytes are written: the chunk that
/// crosses the boundary is truncated and no further chunk is pulled.
pub async fn feed_chunks<W, S>(mut sink: W, mut chunks: S, limit: Option<usize>) -> FeedOutcome
where
    W: AsyncWrite + Unpin,
    S: Stream<Item = Vec<u8>> + Unpin,
{
    let mut bytes_written = 0usize;

    let stopped = loop {
        if let Some(limit) = limit
            && bytes_written >= limit
        {
            break FeedStop::LimitReached;
        }
        let Some(chunk) = chunks.next().await else {
            break FeedStop::Exhausted;
        };

        let take = match limit {
            Some(limit) => chunk.len().min(limit - bytes_written),
            None => chunk.len(),
        };
        match sink.write_all(&chunk[..take]).await {
            Ok(()) => bytes_written += take,
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                tracing::debug!(bytes_written, "Reader closed the pipe, stopping feeder");
                break FeedStop::ReaderClosed;
            }
            Err(e) => {
                tracing::warn!(bytes_written, "Feeding input failed: {}", e);
                break FeedStop::WriteFailed;
            }
        }
    };

    if let Err(e) = sink.shutdown().await {
        tracing::debug!("Closing feeder sink: {}", e);
    }

    FeedOutcome {
        bytes_written,
        stopped,
    }
}
