//! The document-source seam.
//!
//! A [`DocumentSource`] produces the complete normalized document set for one
//! fetch cycle. The adapter holds exactly one source, chosen at startup.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::SourceKind;
use crate::document::Meeting;
use crate::Error;

/// Whether the source guarantees an order for the set it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOrder {
    /// Reverse-chronological by `start_ts`, as the backend served it.
    NewestFirst,
    /// No declared order; the adapter sorts.
    Unspecified,
}

/// Non-fatal degradations seen while producing a set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FetchWarnings {
    /// Raw documents that could not be normalized.
    pub skipped_documents: usize,
    /// Documents dropped because an earlier one had the same id.
    pub duplicate_ids: usize,
    /// Pages fetched but not persisted to the cache.
    pub cache_write_failures: usize,
    pub pages_from_cache: usize,
    pub pages_fetched: usize,
}

impl FetchWarnings {
    pub fn is_clean(&self) -> bool {
        self.skipped_documents == 0 && self.duplicate_ids == 0 && self.cache_write_failures == 0
    }
}

/// The complete collection of meetings as of one fetch cycle.
#[derive(Debug, Clone)]
pub struct DocumentSet {
    pub documents: Vec<Meeting>,
    pub order: SetOrder,
    pub warnings: FetchWarnings,
    pub fetched_at: DateTime<Utc>,
}

impl DocumentSet {
    /// Build a set, keeping the first document seen for each id.
    pub fn from_documents(
        documents: impl IntoIterator<Item = Meeting>, order: SetOrder, mut warnings: FetchWarnings,
    ) -> Self {
        let mut seen = std::collections::HashSet::new();
        let mut unique = Vec::new();
        for doc in documents {
            if seen.insert(doc.id.clone()) {
                unique.push(doc);
            } else {
                tracing::warn!(id = %doc.id, "duplicate document id; keeping first occurrence");
                warnings.duplicate_ids += 1;
            }
        }

        Self { documents: unique, order, warnings, fetched_at: Utc::now() }
    }
}

/// Storage facts a source can report about itself.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SourceStatus {
    pub source: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub entry_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_fetched_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl_secs: Option<u64>,
}

/// A backend that yields the full normalized document set.
#[async_trait]
pub trait DocumentSource: Send + Sync + std::fmt::Debug {
    fn kind(&self) -> SourceKind;

    /// Produce the full set. `force` bypasses any cache freshness.
    async fn fetch_all(&self, force: bool) -> Result<DocumentSet, Error>;

    /// Read-only storage snapshot; never triggers a fetch.
    async fn status(&self) -> Result<SourceStatus, Error>;
}
