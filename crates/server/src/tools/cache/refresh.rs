//! cache_refresh tool implementation.
//!
//! Forces a full fetch from the source, bypassing cache freshness.

use minutes_core::{FetchWarnings, SourceAdapter};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Parameters for the cache_refresh tool (none).
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheRefreshParams {}

/// Output from the cache_refresh tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheRefreshOutput {
    pub refreshed: bool,
    /// Meetings in the refreshed set.
    pub document_count: usize,
    pub warnings: FetchWarnings,
}

/// Implementation of the cache_refresh tool.
pub async fn refresh_impl(adapter: &SourceAdapter, _params: CacheRefreshParams) -> Result<CallToolResult, McpError> {
    let set = adapter.get_full_set(true).await?;
    tracing::info!(documents = set.documents.len(), "document set refreshed");

    json_result(&CacheRefreshOutput { refreshed: true, document_count: set.documents.len(), warnings: set.warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{adapter, payload};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_refresh_reports_document_count() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = adapter(&dir);

        let out = payload(&refresh_impl(&adapter, CacheRefreshParams::default()).await.unwrap());
        assert_eq!(out["refreshed"], true);
        assert_eq!(out["document_count"], 3);
        assert_eq!(out["warnings"]["skipped_documents"], 0);
    }

    #[tokio::test]
    async fn test_refresh_surfaces_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = minutes_client::LocalFileSource::new(dir.path().join("gone.json"));
        let adapter = SourceAdapter::new(Arc::new(source));

        let err = refresh_impl(&adapter, CacheRefreshParams::default()).await.unwrap_err();
        assert_eq!(err.code.0, -32003);
    }
}
