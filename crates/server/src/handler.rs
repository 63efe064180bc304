//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.

use std::sync::Arc;

use minutes_core::SourceAdapter;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

use crate::tools::{
    CacheRefreshParams, CacheStatusParams, ExportMarkdownParams, MeetingGetParams, MeetingListParams,
    MeetingSearchParams, MeetingStatsParams, export_impl, get_impl, list_impl, refresh_impl, search_impl, stats_impl,
    status_impl,
};

/// The main MCP server handler for granola-mcp.
#[derive(Clone)]
pub struct MinutesServer {
    adapter: Arc<SourceAdapter>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl MinutesServer {
    /// Create a new server handler over a configured adapter.
    pub fn new(adapter: Arc<SourceAdapter>) -> Self {
        Self { adapter, tool_router: Self::tool_router() }
    }

    #[tool(
        description = "List meetings newest first. Optional filters: q (title substring), from_ts/to_ts (RFC 3339 or YYYY-MM-DD), participants (all must attend). Paginate with limit and the returned next_cursor."
    )]
    async fn meetings_list(&self, params: Parameters<MeetingListParams>) -> Result<CallToolResult, McpError> {
        list_impl(&self.adapter, params.0).await
    }

    #[tool(
        description = "Search meetings by text in titles and notes (case-insensitive), with optional date and participant filters. Paginate with limit and next_cursor."
    )]
    async fn meetings_search(&self, params: Parameters<MeetingSearchParams>) -> Result<CallToolResult, McpError> {
        search_impl(&self.adapter, params.0).await
    }

    #[tool(description = "Get one meeting by id. Use include=[\"notes\",\"metadata\"] to add note bodies and metadata.")]
    async fn meetings_get(&self, params: Parameters<MeetingGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.adapter, params.0).await
    }

    #[tool(
        description = "Export a meeting as Markdown. Sections: header, participants, overview, summary, notes, metadata (default: all but metadata)."
    )]
    async fn meetings_export_markdown(
        &self, params: Parameters<ExportMarkdownParams>,
    ) -> Result<CallToolResult, McpError> {
        export_impl(&self.adapter, params.0).await
    }

    #[tool(
        description = "Count meetings in a window (7d, 30d, 90d, all) grouped by day, week, month, platform or participant."
    )]
    async fn meetings_stats(&self, params: Parameters<MeetingStatsParams>) -> Result<CallToolResult, McpError> {
        stats_impl(&self.adapter, params.0).await
    }

    #[tool(description = "Report cache location, size, entry count and last load time without fetching.")]
    async fn cache_status(&self, params: Parameters<CacheStatusParams>) -> Result<CallToolResult, McpError> {
        status_impl(&self.adapter, params.0).await
    }

    #[tool(description = "Refetch all meetings from the source, ignoring cache freshness.")]
    async fn cache_refresh(&self, params: Parameters<CacheRefreshParams>) -> Result<CallToolResult, McpError> {
        refresh_impl(&self.adapter, params.0).await
    }
}

impl ServerHandler for MinutesServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "granola-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Read-only access to meeting records: list, search, get, export as Markdown, stats, and cache control."
                    .into(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing;

    #[test]
    fn test_registers_every_tool() {
        let dir = tempfile::tempdir().unwrap();
        let server = MinutesServer::new(Arc::new(testing::adapter(&dir)));

        let mut names: Vec<_> = server.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "cache_refresh",
                "cache_status",
                "meetings_export_markdown",
                "meetings_get",
                "meetings_list",
                "meetings_search",
                "meetings_stats",
            ]
        );
    }
}
