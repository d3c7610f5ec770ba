//! Search result caching and persistence.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

use crate::earthquakes::models::{DateRange, SearchOutcome};
use crate::observability::metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct CacheKey {
    city_id: u64,
    range: DateRange,
}

/// A cached outcome and when it was stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedOutcome {
    pub outcome: SearchOutcome,
    pub stored_at: DateTime<Utc>,
}

impl CachedOutcome {
    fn is_fresh(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        match (now - self.stored_at).to_std() {
            Ok(age) => age < ttl,
            // stored_at in the future (clock skew): treat as fresh
            Err(_) => true,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct CacheRecord {
    key: CacheKey,
    entry: CachedOutcome,
}

/// A thread-safe TTL cache of search outcomes keyed by city and date range.
#[derive(Clone)]
pub struct ResultCache {
    inner: Arc<DashMap<CacheKey, CachedOutcome>>,
    ttl: Duration,
    persistence_path: Option<PathBuf>,
}

impl ResultCache {
    /// Create a new empty cache.
    pub fn new(ttl: Duration, persistence_path: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            ttl,
            persistence_path,
        }
    }

    /// Load from file if it exists, dropping entries that already expired.
    pub fn load_from_file(path: &Path, ttl: Duration) -> std::io::Result<Self> {
        let cache = Self::new(ttl, Some(path.to_path_buf()));
        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            let records: Vec<CacheRecord> = serde_json::from_reader(reader)?;
            let now = Utc::now();
            let total = records.len();

            for record in records {
                if record.entry.is_fresh(ttl, now) {
                    cache.inner.insert(record.key, record.entry);
                }
            }
            tracing::info!(
                loaded = cache.inner.len(),
                expired = total - cache.inner.len(),
                "Loaded search results from cache file"
            );
        }
        Ok(cache)
    }

    /// Save fresh entries to the persistence file, if one is configured.
    pub fn save_to_file(&self) -> std::io::Result<()> {
        if let Some(path) = &self.persistence_path {
            let now = Utc::now();
            let records: Vec<CacheRecord> = self
                .inner
                .iter()
                .filter(|r| r.value().is_fresh(self.ttl, now))
                .map(|r| CacheRecord {
                    key: *r.key(),
                    entry: r.value().clone(),
                })
                .collect();

            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer(writer, &records)?;
            tracing::info!(entries = records.len(), path = %path.display(), "Saved search results to cache file");
        }
        Ok(())
    }

    /// Cached outcome for a search, if present and not expired.
    pub fn get(&self, city_id: u64, range: DateRange) -> Option<SearchOutcome> {
        let key = CacheKey { city_id, range };
        let expired = match self.inner.get(&key) {
            Some(entry) if entry.is_fresh(self.ttl, Utc::now()) => {
                metrics::record_cache_lookup(true);
                return Some(entry.outcome.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.inner.remove(&key);
        }
        metrics::record_cache_lookup(false);
        None
    }

    pub fn insert(&self, city_id: u64, range: DateRange, outcome: SearchOutcome) {
        self.insert_at(city_id, range, outcome, Utc::now());
    }

    fn insert_at(&self, city_id: u64, range: DateRange, outcome: SearchOutcome, stored_at: DateTime<Utc>) {
        self.inner.insert(
            CacheKey { city_id, range },
            CachedOutcome { outcome, stored_at },
        );
    }

    /// Drop every entry for a city (after it moved or was deleted).
    pub fn invalidate_city(&self, city_id: u64) {
        self.inner.retain(|key, _| key.city_id != city_id);
    }

    /// Remove expired entries, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut removed = 0;
        self.inner.retain(|_, entry| {
            let fresh = entry.is_fresh(self.ttl, now);
            if !fresh {
                removed += 1;
            }
            fresh
        });
        removed
    }

    /// Periodically purge expired outcomes until shutdown.
    pub async fn run_sweeper(self, interval: Duration, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await; // first tick completes immediately

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = self.purge_expired();
                    if removed > 0 {
                        tracing::debug!(removed, remaining = self.len(), "Purged expired search results");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Cache sweeper stopping");
                    break;
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
