//! Source adapter: the single query surface over whichever source is configured.
//!
//! Every query asks the source for the full set, filters it, and slices one
//! page. Cursors carry the offset into the filtered set plus a fingerprint of
//! that set; a cursor cut from a different set is rejected as stale rather
//! than replayed.

pub mod cursor;
pub mod filter;

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub use cursor::Cursor;
pub use filter::{DayEdge, MeetingFilters, parse_timestamp_param};

use crate::Error;
use crate::config::SourceKind;
use crate::document::{Meeting, MeetingSummary};
use crate::source::{DocumentSet, DocumentSource, FetchWarnings, SetOrder, SourceStatus};

/// Smallest accepted page size.
pub const MIN_LIMIT: u32 = 1;
/// Largest accepted page size.
pub const MAX_LIMIT: u32 = 500;
/// Page size when the caller gives none.
pub const DEFAULT_LIMIT: u32 = 50;

/// Parameters for [`SourceAdapter::list`].
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub filters: MeetingFilters,
    pub limit: u32,
    pub cursor: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self { filters: MeetingFilters::default(), limit: DEFAULT_LIMIT, cursor: None }
    }
}

/// Parameters for [`SourceAdapter::search`].
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub query: String,
    pub filters: MeetingFilters,
    pub limit: u32,
    pub cursor: Option<String>,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), filters: MeetingFilters::default(), limit: DEFAULT_LIMIT, cursor: None }
    }
}

/// One page of list/search results.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Page {
    pub items: Vec<MeetingSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    /// Size of the filtered set across all pages.
    pub total: usize,
    pub warnings: FetchWarnings,
}

/// Status surface: source storage facts plus the last successful load.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StatusReport {
    #[serde(flatten)]
    pub storage: SourceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_loaded_ts: Option<DateTime<Utc>>,
}

/// Clamp a requested page size into `MIN_LIMIT..=MAX_LIMIT`.
pub fn clamp_limit(limit: u32) -> usize {
    limit.clamp(MIN_LIMIT, MAX_LIMIT) as usize
}

/// Backend-agnostic query surface.
#[derive(Debug)]
pub struct SourceAdapter {
    source: Arc<dyn DocumentSource>,
    last_loaded: Mutex<Option<DateTime<Utc>>>,
}

impl SourceAdapter {
    pub fn new(source: Arc<dyn DocumentSource>) -> Self {
        Self { source, last_loaded: Mutex::new(None) }
    }

    pub fn source_kind(&self) -> SourceKind {
        self.source.kind()
    }

    /// Fetch the full set from the source; the only call that does I/O.
    ///
    /// Sets without a declared order are stable-sorted by `start_ts` descending.
    pub async fn get_full_set(&self, force: bool) -> Result<DocumentSet, Error> {
        let mut set = self.source.fetch_all(force).await?;

        if set.order == SetOrder::Unspecified {
            set.documents.sort_by(|a, b| b.start_ts.cmp(&a.start_ts));
            set.order = SetOrder::NewestFirst;
        }

        *self.last_loaded.lock().unwrap_or_else(|e| e.into_inner()) = Some(set.fetched_at);

        if !set.warnings.is_clean() {
            tracing::warn!(
                skipped = set.warnings.skipped_documents,
                duplicates = set.warnings.duplicate_ids,
                cache_write_failures = set.warnings.cache_write_failures,
                "document set loaded with warnings"
            );
        }

        Ok(set)
    }

    /// Filtered listing in set order.
    pub async fn list(&self, query: &ListQuery) -> Result<Page, Error> {
        let limit = clamp_limit(query.limit);
        let cursor = query.cursor.as_deref().map(Cursor::decode).transpose()?;

        let set = self.get_full_set(false).await?;
        paginate(&set, |m| query.filters.matches(m), limit, cursor)
    }

    /// Case-insensitive text search over title and note bodies, plus filters.
    pub async fn search(&self, query: &SearchQuery) -> Result<Page, Error> {
        let needle = query.query.trim().to_lowercase();
        if needle.is_empty() {
            return Err(Error::InvalidInput("q: search query must not be empty".into()));
        }
        let limit = clamp_limit(query.limit);
        let cursor = query.cursor.as_deref().map(Cursor::decode).transpose()?;

        let set = self.get_full_set(false).await?;
        paginate(&set, |m| query.filters.matches(m) && m.matches_text(&needle), limit, cursor)
    }

    /// Exact id lookup.
    pub async fn get_by_id(&self, id: &str) -> Result<Meeting, Error> {
        if id.trim().is_empty() {
            return Err(Error::InvalidInput("id: must not be empty".into()));
        }

        let set = self.get_full_set(false).await?;
        set.documents
            .into_iter()
            .find(|m| m.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Read-only status; does not fetch.
    pub async fn status(&self) -> Result<StatusReport, Error> {
        let storage = self.source.status().await?;
        let last_loaded_ts = *self.last_loaded.lock().unwrap_or_else(|e| e.into_inner());
        Ok(StatusReport { storage, last_loaded_ts })
    }
}

fn paginate(
    set: &DocumentSet, predicate: impl Fn(&Meeting) -> bool, limit: usize, cursor: Option<Cursor>,
) -> Result<Page, Error> {
    let filtered: Vec<&Meeting> = set.documents.iter().filter(|m| predicate(*m)).collect();
    let fingerprint = cursor::fingerprint(filtered.iter().map(|m| m.id.as_str()));

    let offset = match cursor {
        None => 0,
        Some(c) if c.fingerprint != fingerprint => {
            return Err(Error::StaleCursor(
                "cursor: the result set changed since this cursor was issued; restart without a cursor".into(),
            ));
        }
        Some(c) if c.offset > filtered.len() => {
            return Err(Error::InvalidInput(format!("cursor: offset {} is past the end", c.offset)));
        }
        Some(c) => c.offset,
    };

    let end = (offset + limit).min(filtered.len());
    let next_cursor = (end < filtered.len()).then(|| Cursor::new(end, fingerprint).encode());

    Ok(Page {
        items: filtered[offset..end].iter().map(|m| MeetingSummary::from(*m)).collect(),
        next_cursor,
        total: filtered.len(),
        warnings: set.warnings.clone(),
    })
}
