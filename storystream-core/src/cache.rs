use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::post::Post;
use crate::storage::KeyValueStore;

/// A cached value and the instant its content was last imported.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    pub value: T,
    pub written_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T, written_at: DateTime<Utc>) -> Self {
        Self { value, written_at }
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.written_at
    }

    pub fn is_fresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.age(now) < window
    }
}

// Persisted shape: { "posts": [...], "timestamp": <epoch millis> }
#[derive(Deserialize)]
struct Snapshot {
    posts: Vec<Post>,
    timestamp: i64,
}

#[derive(Clone)]
pub struct PostCache {
    store: Arc<dyn KeyValueStore>,
    key: String,
    staleness_window: Duration,
}

impl PostCache {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>, staleness_window: Duration) -> Self {
        Self {
            store,
            key: key.into(),
            staleness_window,
        }
    }

    pub fn staleness_window(&self) -> Duration {
        self.staleness_window
    }

    /// Reads the cached snapshot. Anything unusable reads as no cache.
    pub fn read(&self) -> Option<CacheEntry<Vec<Post>>> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.key, "no cached posts");
                return None;
            }
            Err(e) => {
                warn!(error = %e, key = %self.key, "failed to read cached posts");
                return None;
            }
        };
        let snapshot: Snapshot = match serde_json::from_str(&raw) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, key = %self.key, "cached posts are malformed, ignoring");
                return None;
            }
        };
        let Some(written_at) = Utc.timestamp_millis_opt(snapshot.timestamp).single() else {
            warn!(timestamp = snapshot.timestamp, "cached timestamp out of range, ignoring");
            return None;
        };
        Some(CacheEntry::new(snapshot.posts, written_at))
    }

    pub fn write(&self, entry: &CacheEntry<Vec<Post>>) -> Result<(), StoreError> {
        let snapshot = SnapshotRef {
            posts: &entry.value,
            timestamp: entry.written_at.timestamp_millis(),
        };
        let json = serde_json::to_string(&snapshot)?;
        self.store.set(&self.key, &json).inspect_err(|e| {
            warn!(error = %e, key = %self.key, "failed to persist cached posts");
        })?;
        debug!(key = %self.key, posts = entry.value.len(), "persisted cached posts");
        Ok(())
    }

    /// Persists `posts` under the timestamp already stored, or `now` if none is.
    ///
    /// Local interactions go through here so they never reset the staleness clock.
    pub fn write_preserving_timestamp(&self, posts: &[Post], now: DateTime<Utc>) -> Result<(), StoreError> {
        // Nothing stored (or unreadable): this write starts a new window.
        let written_at = self.stored_timestamp().unwrap_or(now);
        let snapshot = SnapshotRef {
            posts,
            timestamp: written_at.timestamp_millis(),
        };
        let json = serde_json::to_string(&snapshot)?;
        self.store.set(&self.key, &json)
    }

    fn stored_timestamp(&self) -> Option<DateTime<Utc>> {
        #[derive(Deserialize)]
        struct TimestampOnly {
            timestamp: i64,
        }

        let raw = self.store.get(&self.key).ok().flatten()?;
        let parsed: TimestampOnly = serde_json::from_str(&raw).ok()?;
        Utc.timestamp_millis_opt(parsed.timestamp).single()
    }
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    posts: &'a [Post],
    timestamp: i64,
}
