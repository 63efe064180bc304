//! Cache-related MCP tools.
//!
//! This module provides tools for inspecting and refreshing the document cache.

pub mod refresh;
pub mod status;

pub use refresh::{CacheRefreshParams, refresh_impl};
pub use status::{CacheStatusParams, status_impl};
