//! In-memory TTL cache built on moka.

use std::time::Duration;

use moka::future::Cache;

/// Time-bounded cache for vulnerability lookup results.
///
/// Shared by all requests; constructed once at process start and injected
/// into the lookup client. Entries expire after the configured TTL and the
/// cache is bounded by entry count. Values are stored as serialized JSON so
/// one cache serves both single and batch result shapes.
pub struct VulnerabilityCache {
    cache: Cache<String, Vec<u8>>,
}

impl VulnerabilityCache {
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();
        Self { cache }
    }

    pub async fn get<T>(&self, key: &str) -> Result<Option<T>, serde_json::Error>
    where
        T: serde::de::DeserializeOwned,
    {
        match self.cache.get(key).await {
            Some(data) => serde_json::from_slice(&data).map(Some),
            None => Ok(None),
        }
    }

    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), serde_json::Error>
    where
        T: serde::Serialize,
    {
        let data = serde_json::to_vec(value)?;
        self.cache.insert(key.to_string(), data).await;
        Ok(())
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}
