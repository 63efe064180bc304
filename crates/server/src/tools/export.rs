//! meetings_export_markdown tool implementation.
//!
//! Renders a single meeting as a Markdown document. Sections always appear in
//! a fixed order; sections with no content are left out.

use minutes_core::{Error, Meeting, SourceAdapter};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Renderable parts of a meeting, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Header,
    Participants,
    Overview,
    Summary,
    Notes,
    Metadata,
}

impl Section {
    const ORDER: [Section; 6] =
        [Section::Header, Section::Participants, Section::Overview, Section::Summary, Section::Notes, Section::Metadata];

    const DEFAULT: [Section; 5] =
        [Section::Header, Section::Participants, Section::Overview, Section::Summary, Section::Notes];
}

/// Input parameters for meetings_export_markdown tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExportMarkdownParams {
    /// Meeting id.
    pub id: String,

    /// Sections to render. Defaults to everything except "metadata".
    #[serde(default)]
    pub sections: Option<Vec<Section>>,
}

/// Output structure for meetings_export_markdown tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExportMarkdownOutput {
    pub id: String,
    pub markdown: String,
}

/// Implementation of the meetings_export_markdown tool.
pub async fn export_impl(adapter: &SourceAdapter, params: ExportMarkdownParams) -> Result<CallToolResult, McpError> {
    let meeting = adapter.get_by_id(params.id.trim()).await?;
    let sections = params.sections.unwrap_or_else(|| Section::DEFAULT.to_vec());

    let markdown = render(&meeting, &sections)?;
    json_result(&ExportMarkdownOutput { id: meeting.id, markdown })
}

fn render(meeting: &Meeting, sections: &[Section]) -> Result<String, Error> {
    let mut blocks = Vec::new();

    for section in Section::ORDER.into_iter().filter(|s| sections.contains(s)) {
        let block = match section {
            Section::Header => Some(header(meeting)),
            Section::Participants => (!meeting.participants.is_empty()).then(|| {
                let list: Vec<_> = meeting.participants.iter().map(|p| format!("- {p}")).collect();
                format!("## Participants\n\n{}", list.join("\n"))
            }),
            Section::Overview => body("Overview", meeting.overview.as_deref()),
            Section::Summary => body("Summary", meeting.summary.as_deref()),
            Section::Notes => body("Notes", meeting.notes.as_deref()),
            Section::Metadata => match &meeting.metadata {
                Some(map) if !map.is_empty() => {
                    let json = serde_json::to_string_pretty(map)
                        .map_err(|e| Error::Internal(format!("serialize metadata: {e}")))?;
                    Some(format!("## Metadata\n\n```json\n{json}\n```"))
                }
                _ => None,
            },
        };
        blocks.extend(block);
    }

    let mut out = blocks.join("\n\n");
    out.push('\n');
    Ok(out)
}

fn header(meeting: &Meeting) -> String {
    let title = if meeting.title.trim().is_empty() { "Untitled meeting" } else { meeting.title.as_str() };
    let mut out = format!("# {title}\n\n- **Start:** {}", meeting.start_ts.to_rfc3339());

    if let Some(end) = meeting.end_ts {
        out.push_str(&format!("\n- **End:** {}", end.to_rfc3339()));
    }
    if let Some(platform) = &meeting.platform {
        out.push_str(&format!("\n- **Platform:** {platform}"));
    }
    if let Some(folder) = &meeting.folder_name {
        out.push_str(&format!("\n- **Folder:** {folder}"));
    }
    out
}

fn body(heading: &str, text: Option<&str>) -> Option<String> {
    text.map(str::trim).filter(|t| !t.is_empty()).map(|t| format!("## {heading}\n\n{t}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{adapter, payload};
    use minutes_core::Normalized;
    use serde_json::json;

    #[tokio::test]
    async fn test_export_default_sections() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = adapter(&dir);

        let params = ExportMarkdownParams { id: "e1".into(), sections: None };
        let out = payload(&export_impl(&adapter, params).await.unwrap());
        let md = out["markdown"].as_str().unwrap();

        assert_eq!(out["id"], "e1");
        assert!(md.starts_with("# Interview Structure Overview\n"));
        assert!(md.contains("- **Platform:** meet"));
        assert!(md.contains("- **Folder:** Hiring"));
        assert!(md.contains("## Participants\n\n- Alice\n- Bob"));
        assert!(md.contains("## Overview\n\nInterview loop redesign"));
        assert!(md.contains("## Notes\n\nDiscussed the hiring roadmap"));
        assert!(!md.contains("## Summary"));
        assert!(!md.contains("## Metadata"));
    }

    #[tokio::test]
    async fn test_export_selected_sections_keep_fixed_order() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = adapter(&dir);

        let params = ExportMarkdownParams { id: "e1".into(), sections: Some(vec![Section::Metadata, Section::Notes]) };
        let out = payload(&export_impl(&adapter, params).await.unwrap());
        let md = out["markdown"].as_str().unwrap();

        assert!(md.starts_with("## Notes"));
        assert!(md.contains("## Metadata\n\n```json"));
        assert!(md.contains("\"source\": \"calendar\""));
        assert!(!md.contains("# Interview"));
    }

    #[tokio::test]
    async fn test_export_unknown_id() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = adapter(&dir);

        let params = ExportMarkdownParams { id: "missing".into(), sections: None };
        assert_eq!(export_impl(&adapter, params).await.unwrap_err().code.0, -32001);
    }

    #[test]
    fn test_header_lines() {
        let raw = json!({
            "id": "h1",
            "title": "  ",
            "start_ts": "2025-09-01T10:00:00Z",
            "end_ts": "2025-09-01T11:00:00Z",
            "platform": "zoom",
        });
        let Normalized::Meeting(meeting) = Meeting::from_raw(&raw) else { panic!("not a meeting") };

        assert_eq!(
            header(&meeting),
            "# Untitled meeting\n\n- **Start:** 2025-09-01T10:00:00+00:00\n- **End:** 2025-09-01T11:00:00+00:00\n- **Platform:** zoom"
        );
    }
}
