//! Time-boxed response cache
//!
//! Entries are stored as JSON text (`{"data": ..., "timestamp": <ms>}`) in a
//! string key/value [`CacheStore`], under `prefix + key`. An entry is served
//! while its age is below the TTL; a stale or undecodable entry is removed the
//! first time it is read.
//!
//! Caching is best effort. Write failures (store full, serialization errors)
//! are logged and dropped, so callers never have to handle them. A write that
//! hits the store quota first sweeps expired entries and retries once.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{CacheConfig, Error, Result};

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += chrono::Duration::milliseconds(by.as_millis() as i64);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// String key/value storage behind the cache
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String) -> Result<()>;
    fn remove(&self, key: &str);
    fn keys(&self) -> Vec<String>;
}

/// In-process store with an optional entry quota
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    max_entries: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that refuses new keys once `max_entries` are held
    pub fn with_capacity_limit(max_entries: usize) -> Self {
        Self {
            entries: RwLock::default(),
            max_entries: Some(max_entries),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| Error::Config("cache store lock poisoned".to_string()))?;

        if let Some(max_entries) = self.max_entries {
            if !entries.contains_key(key) && entries.len() >= max_entries {
                return Err(Error::CacheFull { max_entries });
            }
        }

        entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(key);
        }
    }

    fn keys(&self) -> Vec<String> {
        self.entries
            .read()
            .map(|e| e.keys().cloned().collect())
            .unwrap_or_default()
    }
}

/// A cached value and the moment it was written (ms since the Unix epoch)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub data: T,
    pub timestamp: i64,
}

#[derive(Deserialize)]
struct EntryStamp {
    timestamp: i64,
}

/// Cache with a fixed validity window
#[derive(Clone)]
pub struct TtlCache {
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    prefix: String,
}

impl TtlCache {
    pub fn new(store: Arc<dyn CacheStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            store,
            clock,
            ttl,
            prefix: String::new(),
        }
    }

    /// Build a cache backed by a [`MemoryStore`] and the wall clock
    pub fn from_config(config: &CacheConfig) -> Self {
        let store = match config.max_entries {
            Some(max) => MemoryStore::with_capacity_limit(max),
            None => MemoryStore::new(),
        };
        Self::new(Arc::new(store), Arc::new(SystemClock), config.ttl).with_prefix(&config.prefix)
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Cached value for `key` if it is younger than the TTL
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let full_key = self.full_key(key);
        let raw = self.store.get(&full_key)?;

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(key = %full_key, error = %e, "Dropping undecodable cache entry");
                self.store.remove(&full_key);
                return None;
            }
        };

        if self.is_expired(entry.timestamp) {
            trace!(key = %full_key, "Cache entry expired");
            self.store.remove(&full_key);
            return None;
        }

        Some(entry.data)
    }

    fn is_expired(&self, timestamp: i64) -> bool {
        let age_ms = i128::from(self.clock.now().timestamp_millis()) - i128::from(timestamp);
        age_ms >= self.ttl.as_millis() as i128
    }

    /// Remove every expired or undecodable entry under this cache's prefix
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        let mut removed = 0;
        for key in self.store.keys() {
            if !key.starts_with(&self.prefix) {
                continue;
            }
            let Some(raw) = self.store.get(&key) else {
                continue;
            };
            let stale = serde_json::from_str::<EntryStamp>(&raw)
                .map(|stamp| self.is_expired(stamp.timestamp))
                .unwrap_or(true);
            if stale {
                self.store.remove(&key);
                removed += 1;
            }
        }
        debug!(removed, "Purged expired cache entries");
        removed
    }

    /// Store `data` under `key`, stamped with the current time
    ///
    /// Failures are logged and ignored.
    pub fn set<T: Serialize>(&self, key: &str, data: &T) {
        if let Err(e) = self.try_set(key, data) {
            debug!(key, error = %e, "Cache write skipped");
        }
    }

    fn try_set<T: Serialize>(&self, key: &str, data: &T) -> Result<()> {
        let entry = CacheEntry {
            data,
            timestamp: self.clock.now().timestamp_millis(),
        };
        let raw = serde_json::to_string(&entry)?;
        let full_key = self.full_key(key);

        match self.store.set(&full_key, raw.clone()) {
            Err(Error::CacheFull { .. }) if self.purge_expired() > 0 => {
                self.store.set(&full_key, raw)
            }
            result => result,
        }
    }

    /// Remove the entry for `key`, if any
    pub fn evict(&self, key: &str) {
        self.store.remove(&self.full_key(key));
    }
}

impl std::fmt::Debug for TtlCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("ttl", &self.ttl)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}
