//! Per-host log stores and the read-mostly store cache
//!
//! A [`LogStore`] is the full parsed record set for one host, in
//! file-appearance order: files in the registry's deterministic order,
//! lines in file order. Source files are not guaranteed to be sorted by
//! timestamp and the store does not reorder them.
//!
//! The [`StoreCache`] keeps one completed store per host. Stores are built
//! fully before they are inserted, so a reader observes either the prior
//! complete store or the new complete one. Rebuilds take a per-host lock:
//! concurrent queries for the same host wait for one rebuild instead of
//! racing, while queries for other hosts proceed unaffected.

use crate::parser::LineParser;
use crate::types::LogRecord;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Parsed records for one host, in file-appearance order
pub struct LogStore {
    host: String,
    records: Vec<LogRecord>,
    built_at: Instant,
}

impl LogStore {
    /// Read and parse every file backing a host.
    ///
    /// A file that vanishes or is unreadable mid-load is skipped with a
    /// warning; the rest of the host's files still load. Building is
    /// idempotent: the same inputs produce the same records.
    pub async fn build(host: &str, files: &[PathBuf], parser: &LineParser) -> Self {
        let mut records = Vec::new();

        for file in files {
            let bytes = match tokio::fs::read(file).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Skipping unreadable log file {}: {}", file.display(), e);
                    continue;
                }
            };

            let service = file_stem(file);
            let text = String::from_utf8_lossy(&bytes);
            for line in text.lines() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let mut record = parser.parse(line);
                record.service = service.clone();
                records.push(record);
            }
        }

        debug!(host, records = records.len(), "log store built");
        Self {
            host: host.to_string(),
            records,
            built_at: Instant::now(),
        }
    }

    /// An empty store, used for hosts the registry does not know.
    pub fn empty(host: &str) -> Self {
        Self::from_records(host, Vec::new())
    }

    /// Build a store from already-parsed records.
    pub fn from_records(host: &str, records: Vec<LogRecord>) -> Self {
        Self {
            host: host.to_string(),
            records,
            built_at: Instant::now(),
        }
    }

    /// Host this store belongs to
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Records in file-appearance order
    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Time since this store was built
    pub fn age(&self) -> Duration {
        self.built_at.elapsed()
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Cache of completed per-host stores with TTL invalidation
pub struct StoreCache {
    stores: DashMap<String, Arc<LogStore>>,
    build_locks: DashMap<String, Arc<Mutex<()>>>,
    ttl: Option<Duration>,
}

impl StoreCache {
    /// Create a cache whose stores go stale after `refresh_seconds`;
    /// zero disables expiry.
    pub fn new(refresh_seconds: u64) -> Self {
        Self {
            stores: DashMap::new(),
            build_locks: DashMap::new(),
            ttl: (refresh_seconds > 0).then(|| Duration::from_secs(refresh_seconds)),
        }
    }

    fn is_fresh(&self, store: &LogStore) -> bool {
        self.ttl.map_or(true, |ttl| store.age() < ttl)
    }

    /// Return the cached store for a host, rebuilding it first when absent
    /// or stale.
    ///
    /// A cache hit returns the same `Arc` as the previous call. The caller
    /// that discovers staleness performs the rebuild; callers for the same
    /// host wait on it, callers for other hosts are unaffected.
    pub async fn get_or_build(
        &self,
        host: &str,
        files: &[PathBuf],
        parser: &LineParser,
    ) -> Arc<LogStore> {
        if let Some(existing) = self.stores.get(host) {
            if self.is_fresh(&existing) {
                return Arc::clone(&existing);
            }
        }

        let lock = self
            .build_locks
            .entry(host.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Another caller may have finished the rebuild while we waited.
        if let Some(existing) = self.stores.get(host) {
            if self.is_fresh(&existing) {
                return Arc::clone(&existing);
            }
        }

        let store = Arc::new(LogStore::build(host, files, parser).await);
        self.stores.insert(host.to_string(), Arc::clone(&store));
        store
    }

    /// Drop the cached store for one host.
    pub fn invalidate(&self, host: &str) {
        self.stores.remove(host);
    }

    /// Drop every cached store.
    pub fn clear(&self) {
        self.stores.clear();
    }
}
