//! Read-through response cache.
//!
//! Catalog responses are memoized per query key for a fixed TTL. A "no
//! data" outcome (`None`) is cached like any other value so an undecodable
//! response is not refetched on every lookup. Fetch errors are never cached.
//! Expired entries are dropped whenever a new one is stored.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::Instant;

struct Entry {
    stored_at: Instant,
    value: Option<Value>,
}

/// In-memory response cache, safe to share between concurrent lookups.
pub struct ResponseCache {
    entries: Mutex<HashMap<String, Entry>>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Get a live entry. The outer `Option` is hit/miss.
    pub async fn get(&self, key: &str) -> Option<Option<Value>> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store `value` under `key`, dropping every entry that has expired.
    pub async fn put(&self, key: impl Into<String>, value: Option<Value>) {
        let mut entries = self.entries.lock().await;
        entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        entries.insert(
            key.into(),
            Entry {
                stored_at: Instant::now(),
                value,
            },
        );
    }

    /// Return the cached value for `key`, or run `fetch` and store its result.
    ///
    /// The lock is not held while fetching, so lookups for other keys are
    /// not blocked behind a slow request.
    pub async fn cached<F, Fut, E>(&self, key: &str, fetch: F) -> Result<Option<Value>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<Value>, E>>,
    {
        if let Some(value) = self.get(key).await {
            tracing::debug!(key, "Catalog cache hit");
            return Ok(value);
        }

        let value = fetch().await?;
        self.put(key, value.clone()).await;
        Ok(value)
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
