//! Local file document source.
//!
//! Reads the desktop application's synced cache file in one piece. Two layouts
//! are understood, both double-encoded (an outer JSON document carrying inner
//! JSON as string values):
//!
//! - `{"conversations": [{"doc": "<json>"}, ...]}`: one inner blob per document.
//! - `{"cache": "<json>"}`: one inner blob holding `state.documents` keyed by id,
//!   with `meetingsMetadata` and folder lists alongside.
//!
//! There is no TTL here; every fetch re-reads the file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use minutes_core::document::RawContext;
use minutes_core::{
    AppConfig, DocumentSet, DocumentSource, Error, FetchWarnings, Meeting, Normalized, SetOrder, SourceKind,
    SourceStatus,
};
use serde_json::{Map, Value};

/// Whole-file source over the desktop cache.
#[derive(Debug, Clone)]
pub struct LocalFileSource {
    path: PathBuf,
}

impl LocalFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::new(&config.local_path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DocumentSource for LocalFileSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Local
    }

    async fn fetch_all(&self, _force: bool) -> Result<DocumentSet, Error> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| Error::Config(format!("cannot read local cache file {}: {e}", self.path.display())))?;

        let outer: Value = serde_json::from_slice(&bytes)
            .map_err(|e| Error::Parse(format!("local cache file {} is not JSON: {e}", self.path.display())))?;

        let mut warnings = FetchWarnings::default();
        let documents = decode_file(&outer, &mut warnings)?;

        tracing::debug!(
            path = %self.path.display(),
            documents = documents.len(),
            skipped = warnings.skipped_documents,
            "local document set loaded"
        );

        Ok(DocumentSet::from_documents(documents, SetOrder::Unspecified, warnings))
    }

    async fn status(&self) -> Result<SourceStatus, Error> {
        let (size_bytes, modified) = match tokio::fs::metadata(&self.path).await {
            Ok(meta) => (meta.len(), meta.modified().ok().map(DateTime::<Utc>::from)),
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "local cache file not readable");
                (0, None)
            }
        };

        Ok(SourceStatus {
            source: SourceKind::Local.as_str().into(),
            path: self.path.clone(),
            size_bytes,
            entry_count: usize::from(modified.is_some()),
            newest_fetched_at: modified,
            ttl_secs: None,
        })
    }
}

/// Dispatch on the outer layout.
fn decode_file(outer: &Value, warnings: &mut FetchWarnings) -> Result<Vec<Meeting>, Error> {
    if let Some(conversations) = outer.get("conversations") {
        let items = conversations
            .as_array()
            .ok_or_else(|| Error::Parse("`conversations` is not a list".into()))?;
        return Ok(decode_conversations(items, warnings));
    }

    if let Some(cache) = outer.get("cache") {
        let inner = match cache {
            Value::String(blob) => serde_json::from_str::<Value>(blob)
                .map_err(|e| Error::Parse(format!("inner `cache` blob is not JSON: {e}")))?,
            Value::Object(_) => cache.clone(),
            _ => return Err(Error::Parse("`cache` is neither a string nor an object".into())),
        };
        return decode_desktop_state(&inner, warnings);
    }

    Err(Error::Parse("unrecognized local cache layout: expected `conversations` or `cache`".into()))
}

fn decode_conversations(items: &[Value], warnings: &mut FetchWarnings) -> Vec<Meeting> {
    let mut out = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let doc = match item.get("doc") {
            Some(Value::String(blob)) => match serde_json::from_str::<Value>(blob) {
                Ok(doc) => doc,
                Err(e) => {
                    tracing::warn!(index, error = %e, "skipping conversation with unparseable doc");
                    warnings.skipped_documents += 1;
                    continue;
                }
            },
            Some(doc @ Value::Object(_)) => doc.clone(),
            _ => {
                tracing::warn!(index, "skipping conversation without a doc blob");
                warnings.skipped_documents += 1;
                continue;
            }
        };

        push_normalized(&mut out, Meeting::from_raw(&doc), warnings);
    }

    out
}

fn decode_desktop_state(inner: &Value, warnings: &mut FetchWarnings) -> Result<Vec<Meeting>, Error> {
    let state = inner.get("state").unwrap_or(inner);
    let documents = state
        .get("documents")
        .and_then(Value::as_object)
        .ok_or_else(|| Error::Parse("desktop cache has no `state.documents` map".into()))?;

    let metadata = state.get("meetingsMetadata").and_then(Value::as_object);
    let folders = folder_lookup(state);

    let mut out = Vec::with_capacity(documents.len());
    for (key, raw) in documents {
        let raw = with_id(raw, key);
        let folder = folders.get(key.as_str());
        let ctx = RawContext {
            meeting_metadata: metadata.and_then(|m| m.get(key)),
            folder_id: folder.map(|(id, _)| *id),
            folder_name: folder.and_then(|(_, name)| *name),
        };
        push_normalized(&mut out, Meeting::from_raw_with(&raw, &ctx), warnings);
    }

    Ok(out)
}

/// Document id -> (list id, list title). The first list containing a document wins.
fn folder_lookup(state: &Value) -> HashMap<&str, (&str, Option<&str>)> {
    let titles = state.get("documentListsMetadata").and_then(Value::as_object);
    let mut lookup = HashMap::new();

    let Some(lists) = state.get("documentLists").and_then(Value::as_object) else {
        return lookup;
    };

    for (list_id, members) in lists {
        let title = titles
            .and_then(|t| t.get(list_id))
            .and_then(|m| m.get("title"))
            .and_then(Value::as_str);
        for doc_id in members.as_array().into_iter().flatten().filter_map(Value::as_str) {
            lookup.entry(doc_id).or_insert((list_id.as_str(), title));
        }
    }

    lookup
}

/// Documents keyed by id may omit the id inside the object.
fn with_id(raw: &Value, key: &str) -> Value {
    match raw {
        Value::Object(obj) if !obj.contains_key("id") => {
            let mut obj: Map<String, Value> = obj.clone();
            obj.insert("id".into(), Value::String(key.to_string()));
            Value::Object(obj)
        }
        _ => raw.clone(),
    }
}

fn push_normalized(out: &mut Vec<Meeting>, normalized: Normalized, warnings: &mut FetchWarnings) {
    match normalized {
        Normalized::Meeting(m) => out.push(*m),
        Normalized::NotAMeeting => {}
        Normalized::Malformed(reason) => {
            tracing::warn!(%reason, "skipping malformed local document");
            warnings.skipped_documents += 1;
        }
    }
}
