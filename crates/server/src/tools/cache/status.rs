//! cache_status tool implementation.
//!
//! Reports storage facts for the configured source without fetching.

use minutes_core::SourceAdapter;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Parameters for the cache_status tool (none).
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheStatusParams {}

/// Implementation of the cache_status tool.
pub async fn status_impl(adapter: &SourceAdapter, _params: CacheStatusParams) -> Result<CallToolResult, McpError> {
    let report = adapter.status().await?;
    json_result(&report)
}
