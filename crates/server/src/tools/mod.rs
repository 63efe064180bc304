//! MCP tool implementations.
//!
//! This module contains all tools exposed by the granola-mcp server. Each tool
//! is a plain async function over the shared [`SourceAdapter`] so it can be
//! tested without the MCP runtime.
//!
//! [`SourceAdapter`]: minutes_core::SourceAdapter

pub mod cache;
pub mod export;
pub mod get;
pub mod list;
pub mod search;
pub mod stats;

pub use cache::{CacheRefreshParams, CacheStatusParams, refresh_impl, status_impl};
pub use export::{ExportMarkdownParams, export_impl};
pub use get::{MeetingGetParams, get_impl};
pub use list::{MeetingListParams, list_impl};
pub use search::{MeetingSearchParams, search_impl};
pub use stats::{MeetingStatsParams, stats_impl};

use minutes_core::adapter::{DayEdge, parse_timestamp_param};
use minutes_core::{Error, MeetingFilters};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

/// Serialize a tool output as pretty JSON text.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(output).map_err(|e| Error::Internal(format!("serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

/// Build adapter filters from raw tool parameters.
pub(crate) fn build_filters(
    from_ts: Option<&str>, to_ts: Option<&str>, participants: Option<&[String]>, title_query: Option<&str>,
) -> Result<MeetingFilters, Error> {
    Ok(MeetingFilters {
        from_ts: from_ts.map(|v| parse_timestamp_param("from_ts", v, DayEdge::Start)).transpose()?,
        to_ts: to_ts.map(|v| parse_timestamp_param("to_ts", v, DayEdge::End)).transpose()?,
        participants: participants.map(<[String]>::to_vec).unwrap_or_default(),
        title_query: title_query.map(str::to_string),
    })
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filters_accepts_dates_and_timestamps() {
        let filters = build_filters(
            Some("2025-09-01"),
            Some("2025-09-30T12:00:00+02:00"),
            Some(&["Alice".to_string()]),
            Some("roadmap"),
        )
        .unwrap();

        assert_eq!(filters.from_ts.unwrap().to_rfc3339(), "2025-09-01T00:00:00+00:00");
        assert_eq!(filters.to_ts.unwrap().to_rfc3339(), "2025-09-30T12:00:00+02:00");
        assert_eq!(filters.participants, vec!["Alice"]);
        assert_eq!(filters.title_query.as_deref(), Some("roadmap"));
    }

    #[test]
    fn test_build_filters_names_bad_parameter() {
        let err = build_filters(None, Some("next tuesday"), None, None).unwrap_err();
        assert!(matches!(&err, Error::InvalidInput(msg) if msg.starts_with("to_ts")));
    }
}
