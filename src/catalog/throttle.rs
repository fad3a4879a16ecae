//! Request pacing for the catalog.
//!
//! MusicBrainz allows one request per second per client. Callers await
//! [`Throttle::wait`] before each request; the tokio mutex is fair, so
//! concurrent callers queue in arrival order instead of being rejected.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Allows at most one request start per `period`, application-wide.
#[derive(Debug)]
pub struct Throttle {
    last_request: Mutex<Option<Instant>>,
    period: Duration,
}

impl Throttle {
    pub fn new(period: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            period,
        }
    }

    /// Wait until the next request may start, then claim the slot.
    pub async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.period {
                let wait_time = self.period - elapsed;
                tracing::debug!("Throttling catalog request for {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}
