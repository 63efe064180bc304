//! One-file-per-key page store.
//!
//! Layout: `<dir>/docs_<key>.json`, content is the decompressed page body.
//! `fetched_at` is the file's modification time, stamped from the store's
//! clock before the entry becomes visible.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use chrono::{DateTime, Duration, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::clock::{Clock, SystemClock};
use super::hash::PageKey;
use crate::Error;

const ENTRY_PREFIX: &str = "docs_";
const ENTRY_SUFFIX: &str = ".json";

/// Read-only snapshot of the cache directory.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheStats {
    pub path: PathBuf,
    pub total_size_bytes: u64,
    pub entry_count: usize,
    pub newest_fetched_at: Option<DateTime<Utc>>,
}

/// TTL-governed page cache shared across process invocations.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl CacheStore {
    /// Open (creating if needed) a cache directory.
    pub fn open(dir: impl AsRef<Path>, ttl: std::time::Duration) -> Result<Self, Error> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)
            .map_err(|e| Error::Config(format!("cannot create cache dir {}: {e}", dir.display())))?;
        let ttl = Duration::from_std(ttl).map_err(|e| Error::Config(format!("cache ttl out of range: {e}")))?;

        Ok(Self { dir, ttl, clock: Arc::new(SystemClock) })
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cache key for a page request shape.
    pub fn key_for(shape: &PageKey) -> String {
        shape.key()
    }

    fn entry_path(&self, key: &str) -> Option<PathBuf> {
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        Some(self.dir.join(format!("{ENTRY_PREFIX}{key}{ENTRY_SUFFIX}")))
    }

    /// Return the payload for `key` if present and younger than the TTL.
    ///
    /// Stale entries are ignored, not deleted. Any I/O failure is a miss.
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let path = self.entry_path(key)?;

        let fetched_at = match tokio::fs::metadata(&path).await.and_then(|m| m.modified()) {
            Ok(mtime) => DateTime::<Utc>::from(mtime),
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(key, error = %e, "cache metadata read failed; treating as miss");
                }
                return None;
            }
        };

        if self.clock.now() - fetched_at >= self.ttl {
            tracing::debug!(key, %fetched_at, "cache entry stale");
            return None;
        }

        match tokio::fs::read(&path).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!(key, error = %e, "cache read failed; treating as miss");
                None
            }
        }
    }

    /// Write or overwrite the entry for `key`, stamping the current time.
    ///
    /// The payload goes to a temp file in the same directory which is then
    /// renamed over the entry, so readers see either the old or the new bytes.
    pub async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), Error> {
        let path = self
            .entry_path(key)
            .ok_or_else(|| Error::Cache(format!("invalid cache key: {key:?}")))?;
        let dir = self.dir.clone();
        let bytes = bytes.to_vec();
        let stamp = SystemTime::from(self.clock.now());

        tokio::task::spawn_blocking(move || -> Result<(), Error> {
            let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
            tmp.write_all(&bytes)?;
            tmp.as_file().sync_all()?;
            tmp.as_file().set_modified(stamp)?;
            tmp.persist(&path).map_err(|e| Error::Cache(e.to_string()))?;
            Ok(())
        })
        .await
        .map_err(|e| Error::Internal(format!("cache writer panicked: {e}")))?
    }

    /// Summarize the directory: entry count, total bytes, newest entry time.
    pub async fn stat(&self) -> Result<CacheStats, Error> {
        let mut stats =
            CacheStats { path: self.dir.clone(), total_size_bytes: 0, entry_count: 0, newest_fetched_at: None };

        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(stats),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !name.starts_with(ENTRY_PREFIX) || !name.ends_with(ENTRY_SUFFIX) {
                continue;
            }
            let meta = entry.metadata().await?;
            stats.entry_count += 1;
            stats.total_size_bytes += meta.len();
            if let Ok(mtime) = meta.modified() {
                let at = DateTime::<Utc>::from(mtime);
                stats.newest_fetched_at = Some(stats.newest_fetched_at.map_or(at, |n| n.max(at)));
            }
        }

        Ok(stats)
    }
}
