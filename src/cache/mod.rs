//! Short-lived cache for CMS query responses
//!
//! Responses are keyed by query text and parameters and reused until they are
//! older than the revalidation window. Staleness is bounded by that window;
//! an expired entry is simply refetched.

use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Cached query response
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: Value,
    pub fetched_at: Instant,
}

/// Response cache with a fixed time-to-live
#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// A zero TTL disables caching entirely
    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// Build the cache key for a query and its parameters
    pub fn key(query: &str, params: &[(&str, &str)]) -> String {
        let mut key = query.to_string();
        for (name, value) in params {
            key.push('\u{0}');
            key.push_str(name);
            key.push('=');
            key.push_str(value);
        }
        key
    }

    /// Get a fresh entry
    pub async fn get(&self, key: &str) -> Option<Value> {
        if !self.is_enabled() {
            return None;
        }
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if entry.fetched_at.elapsed() < self.ttl {
            tracing::trace!("Cache hit");
            Some(entry.value.clone())
        } else {
            None
        }
    }

    pub async fn insert(&self, key: String, value: Value) {
        if !self.is_enabled() {
            return;
        }
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.fetched_at.elapsed() < self.ttl);
        entries.insert(
            key,
            CacheEntry {
                value,
                fetched_at: Instant::now(),
            },
        );
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
