//! File-backed cache for raw remote pages.
//!
//! This module provides a persistent, keyed page cache. It supports:
//!
//! - Deterministic SHA-256 keys over the page request shape
//! - TTL freshness with an injectable clock
//! - Atomic per-key overwrite (temp file + rename)
//! - Read-only directory statistics for status reporting

pub mod clock;
pub mod hash;
pub mod store;

pub use crate::Error;

pub use clock::{Clock, SystemClock};
pub use hash::{PageKey, compute_cache_key};
pub use store::{CacheStats, CacheStore};
