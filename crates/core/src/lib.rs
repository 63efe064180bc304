//! Core types and shared functionality for granola-mcp.
//!
//! This crate provides:
//! - The normalized meeting model and raw-payload normalization
//! - File-backed page cache with TTL freshness
//! - The `DocumentSource` trait and the source adapter (filters, search, pagination)
//! - Unified error types
//! - Configuration structures

pub mod adapter;
pub mod cache;
pub mod config;
pub mod document;
pub mod error;
pub mod source;

pub use adapter::{Cursor, ListQuery, MeetingFilters, Page, SearchQuery, SourceAdapter, StatusReport};
pub use cache::{CacheStats, CacheStore, Clock, PageKey, SystemClock};
pub use config::{AppConfig, ConfigError, SourceKind};
pub use document::{Meeting, MeetingSummary, Normalized};
pub use error::Error;
pub use source::{DocumentSet, DocumentSource, FetchWarnings, SetOrder, SourceStatus};
