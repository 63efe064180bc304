//! meetings_list tool implementation.
//!
//! Lists meetings newest first with optional date, participant and title
//! filters, one page at a time.

use minutes_core::adapter::DEFAULT_LIMIT;
use minutes_core::{ListQuery, SourceAdapter};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{build_filters, json_result};

/// Input parameters for meetings_list tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct MeetingListParams {
    /// Case-insensitive substring of the meeting title.
    #[serde(default)]
    pub q: Option<String>,

    /// Earliest start time, RFC 3339 or YYYY-MM-DD (inclusive).
    #[serde(default)]
    pub from_ts: Option<String>,

    /// Latest start time, RFC 3339 or YYYY-MM-DD (inclusive, whole day for a bare date).
    #[serde(default)]
    pub to_ts: Option<String>,

    /// Participant names that must all be present (exact match).
    #[serde(default)]
    pub participants: Option<Vec<String>>,

    /// Page size, clamped to 1..=500 (default 50).
    #[serde(default)]
    pub limit: Option<u32>,

    /// Continuation cursor from a previous page.
    #[serde(default)]
    pub cursor: Option<String>,
}

/// Implementation of the meetings_list tool.
pub async fn list_impl(adapter: &SourceAdapter, params: MeetingListParams) -> Result<CallToolResult, McpError> {
    let filters = build_filters(
        params.from_ts.as_deref(),
        params.to_ts.as_deref(),
        params.participants.as_deref(),
        params.q.as_deref(),
    )?;

    let query = ListQuery { filters, limit: params.limit.unwrap_or(DEFAULT_LIMIT), cursor: params.cursor };
    let page = adapter.list(&query).await?;

    json_result(&page)
}
