//! Persistent page cache with a fixed freshness window.
//!
//! Rendered pages and decoded forecasts are stored in an fjall keyspace as
//! postcard-encoded entries stamped with an expiry time. The freshness
//! window comes from configuration and applies to every entry; key
//! construction lives here so the `{city}_{unit}` scheme has a single owner.
//! Reads drop stale entries and report a miss.

use std::fmt::Display;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use fjall::Keyspace;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::sync::OnceCell;
use tokio::task;
use tracing::debug;

use crate::Result;
use crate::config::SkycastConfig;
use crate::error::SkycastError;
use crate::units::UnitSystem;

static GLOBAL_CACHE: OnceCell<PageCache> = OnceCell::const_new();

/// Cache key for a built home page.
pub fn page_key(city: &str, unit: UnitSystem) -> String {
    format!("{}_{}", city.to_lowercase(), unit.as_query())
}

/// Cache key for the decoded forecast behind the day-detail pages.
pub fn details_key(city: &str, unit: UnitSystem) -> String {
    format!("details_{}_{}", city.to_lowercase(), unit.as_query())
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry<T> {
    value: T,
    /// Unix timestamp, seconds.
    expires_at: u64,
}

impl<T> StoredEntry<T> {
    fn fresh_at(&self, now_secs: u64) -> bool {
        now_secs < self.expires_at
    }
}

pub struct PageCache {
    store: Keyspace,
    ttl: Duration,
}

impl PageCache {
    fn open(config: &SkycastConfig) -> Result<Self> {
        let db = fjall::Database::builder(&config.cache_dir)
            .open()
            .map_err(|e| SkycastError::cache(format!("failed to open cache store: {e}")))?;
        let store = db
            .keyspace("pages", fjall::KeyspaceCreateOptions::default)
            .map_err(|e| SkycastError::cache(format!("failed to open pages keyspace: {e}")))?;
        Ok(PageCache {
            store,
            ttl: Duration::from_secs(config.cache_ttl_secs),
        })
    }

    /// Store a value under `key`; it stays fresh for the configured window.
    #[tracing::instrument(name = "cache_put", level = "debug", skip(self, value))]
    pub async fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let expires_at = unix_now()? + self.ttl.as_secs();
        let entry = StoredEntry { value, expires_at };
        let bytes = postcard::to_stdvec(&entry)
            .map_err(|e| SkycastError::cache(format!("failed to encode entry: {e}")))?;

        let store = self.store.clone();
        let key = key.as_bytes().to_vec();
        run_blocking(move || store.insert(key, bytes)).await?;
        Ok(())
    }

    /// Fetch a value if present and still fresh. Stale entries are dropped
    /// and reported as a miss.
    #[tracing::instrument(name = "cache_get", level = "debug", skip(self))]
    pub async fn get<T: DeserializeOwned + Send + 'static>(&self, key: &str) -> Result<Option<T>> {
        let store = self.store.clone();
        let key_bytes = key.as_bytes().to_vec();
        let raw = run_blocking(move || {
            store.get(key_bytes).map(|found| found.map(|v| v.to_vec()))
        })
        .await?;

        let Some(bytes) = raw else {
            debug!("cache miss");
            return Ok(None);
        };

        let entry: StoredEntry<T> = decode(&bytes)?;
        if !entry.fresh_at(unix_now()?) {
            debug!("cache entry expired, dropping");
            self.evict(key).await?;
            return Ok(None);
        }

        debug!("cache hit");
        Ok(Some(entry.value))
    }

    async fn evict(&self, key: &str) -> Result<()> {
        let store = self.store.clone();
        let key = key.as_bytes().to_vec();
        run_blocking(move || store.remove(key)).await?;
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<StoredEntry<T>> {
    postcard::from_bytes(bytes)
        .map_err(|e| SkycastError::cache(format!("failed to decode entry: {e}")))
}

fn unix_now() -> Result<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| SkycastError::cache(format!("system clock before epoch: {e}")))
}

async fn run_blocking<F, R, E>(work: F) -> Result<R>
where
    F: FnOnce() -> std::result::Result<R, E> + Send + 'static,
    R: Send + 'static,
    E: Display + Send + 'static,
{
    task::spawn_blocking(work)
        .await
        .map_err(|e| SkycastError::cache(format!("cache worker failed: {e}")))?
        .map_err(|e| SkycastError::cache(format!("cache store error: {e}")))
}

/// Open the store and install it as the process-wide cache. Must be called
/// once at startup, before any `get`/`put`.
pub fn init(config: &SkycastConfig) -> Result<()> {
    let cache = PageCache::open(config)?;
    GLOBAL_CACHE
        .set(cache)
        .map_err(|_| SkycastError::cache("cache already initialized"))?;
    Ok(())
}

fn get_cache() -> &'static PageCache {
    GLOBAL_CACHE
        .get()
        .expect("cache::init() must run before cache use")
}

// Process-wide accessors used by the handlers.
pub async fn put<T: Serialize>(key: &str, value: &T) -> Result<()> {
    get_cache().put(key, value).await
}

pub async fn get<T: DeserializeOwned + Send + 'static>(key: &str) -> Result<Option<T>> {
    get_cache().get(key).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_lowercased_per_unit() {
        assert_eq!(page_key("London", UnitSystem::Metric), "london_metric");
        assert_eq!(page_key("New York", UnitSystem::Imperial), "new york_imperial");
        assert_eq!(
            details_key("London", UnitSystem::Standard),
            "details_london_standard"
        );
    }

    #[test]
    fn test_entry_freshness_is_exclusive_at_expiry() {
        let entry = StoredEntry {
            value: 1u32,
            expires_at: 100,
        };
        assert!(entry.fresh_at(99));
        assert!(!entry.fresh_at(100));
        assert!(!entry.fresh_at(101));
    }

    #[test]
    fn test_decode_failure_is_a_cache_error() {
        let err = decode::<String>(&[0xff, 0xff, 0xff]).unwrap_err();
        assert!(matches!(err, SkycastError::Cache { .. }));
    }
}
