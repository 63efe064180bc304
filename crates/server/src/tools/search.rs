//! meetings_search tool implementation.

use minutes_core::adapter::DEFAULT_LIMIT;
use minutes_core::{SearchQuery, SourceAdapter};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{build_filters, json_result};

/// Input parameters for meetings_search tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MeetingSearchParams {
    /// Text to find in titles and note bodies (case-insensitive).
    pub q: String,

    /// Optional filters applied before matching.
    #[serde(default)]
    pub filters: Option<SearchFilters>,

    /// Page size, clamped to 1..=500 (default 50).
    #[serde(default)]
    pub limit: Option<u32>,

    /// Continuation cursor from a previous page of the same search.
    #[serde(default)]
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SearchFilters {
    /// Earliest start time, RFC 3339 or YYYY-MM-DD.
    pub from_ts: Option<String>,
    /// Latest start time, RFC 3339 or YYYY-MM-DD.
    pub to_ts: Option<String>,
    /// Participant names that must all be present.
    pub participants: Option<Vec<String>>,
}

/// Implementation of the meetings_search tool.
pub async fn search_impl(adapter: &SourceAdapter, params: MeetingSearchParams) -> Result<CallToolResult, McpError> {
    let f = params.filters.unwrap_or_default();
    let filters = build_filters(f.from_ts.as_deref(), f.to_ts.as_deref(), f.participants.as_deref(), None)?;

    let query = SearchQuery {
        query: params.q,
        filters,
        limit: params.limit.unwrap_or(DEFAULT_LIMIT),
        cursor: params.cursor,
    };
    let page = adapter.search(&query).await?;

    json_result(&page)
}
