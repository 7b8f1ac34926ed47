//! Tag-invalidated query cache.
//!
//! Every cached read is stored under a request key together with the tags it
//! provides. Mutations invalidate tags rather than patching entries; an
//! invalidated entry is kept until its next read refetches it.

use std::collections::HashMap;
use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::ClientError;

/// Labels connecting cached reads to the mutations that outdate them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheTag {
    Products,
    Product,
    Orders,
    Order,
    Reviews,
    Review,
    ReviewStats,
}

struct CacheEntry {
    tags: Vec<CacheTag>,
    value: serde_json::Value,
    stale: bool,
}

/// Shared read cache; wrap in `Arc` to share between tasks.
#[derive(Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key` unless it is missing or stale, in
    /// which case `fetch` runs and its result replaces the entry. A failed
    /// fetch leaves the old entry in place.
    pub async fn get_or_fetch<T, F, Fut>(
        &self,
        key: &str,
        tags: &[CacheTag],
        fetch: F,
    ) -> Result<T, ClientError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        if let Some(value) = self.fresh(key).await {
            match serde_json::from_value(value) {
                Ok(hit) => {
                    tracing::trace!(%key, "cache hit");
                    return Ok(hit);
                }
                Err(e) => tracing::warn!(%key, error = %e, "Discarding unreadable cache entry"),
            }
        }

        let value = fetch().await?;
        self.insert(key, tags, &value).await?;
        Ok(value)
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub async fn insert<T: Serialize>(
        &self,
        key: &str,
        tags: &[CacheTag],
        value: &T,
    ) -> Result<(), ClientError> {
        let entry = CacheEntry {
            tags: tags.to_vec(),
            value: serde_json::to_value(value)?,
            stale: false,
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    /// Mark every entry providing any of `tags` as stale. Returns how many
    /// entries were affected.
    pub async fn invalidate(&self, tags: &[CacheTag]) -> usize {
        let mut entries = self.entries.write().await;
        let mut count = 0;
        for entry in entries.values_mut() {
            if entry.tags.iter().any(|t| tags.contains(t)) {
                entry.stale = true;
                count += 1;
            }
        }
        tracing::debug!(?tags, count, "Invalidated cache entries");
        count
    }

    /// `None` when nothing is cached under `key`.
    pub async fn is_stale(&self, key: &str) -> Option<bool> {
        self.entries.read().await.get(key).map(|e| e.stale)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    async fn fresh(&self, key: &str) -> Option<serde_json::Value> {
        self.entries
            .read()
            .await
            .get(key)
            .filter(|e| !e.stale)
            .map(|e| e.value.clone())
    }
}
