//! meetings_get tool implementation.
//!
//! Returns one meeting by id. Note bodies and metadata are included only when
//! asked for, which keeps the default response small.

use minutes_core::{Meeting, SourceAdapter};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Optional parts of a meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Include {
    Notes,
    Metadata,
}

/// Input parameters for meetings_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MeetingGetParams {
    /// Meeting id.
    pub id: String,

    /// Extra parts to include: "notes", "metadata".
    #[serde(default)]
    pub include: Vec<Include>,
}

/// Output structure for meetings_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MeetingGetOutput {
    pub meeting: Meeting,
}

/// Implementation of the meetings_get tool.
pub async fn get_impl(adapter: &SourceAdapter, params: MeetingGetParams) -> Result<CallToolResult, McpError> {
    let mut meeting = adapter.get_by_id(params.id.trim()).await?;

    if !params.include.contains(&Include::Notes) {
        meeting.notes = None;
    }
    if !params.include.contains(&Include::Metadata) {
        meeting.metadata = None;
    }

    json_result(&MeetingGetOutput { meeting })
}
