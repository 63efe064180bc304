//! meetings_stats tool implementation.
//!
//! Counts meetings inside a trailing time window, grouped by calendar period,
//! platform or participant.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Datelike, Duration, Utc};
use minutes_core::{Meeting, SourceAdapter};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Trailing window measured back from now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum StatsWindow {
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
    #[default]
    #[serde(rename = "all")]
    All,
}

impl StatsWindow {
    fn span(self) -> Option<Duration> {
        match self {
            StatsWindow::Week => Some(Duration::days(7)),
            StatsWindow::Month => Some(Duration::days(30)),
            StatsWindow::Quarter => Some(Duration::days(90)),
            StatsWindow::All => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    Day,
    Week,
    Month,
    Platform,
    Participant,
}

impl GroupBy {
    fn counts_key(self) -> &'static str {
        match self {
            GroupBy::Day | GroupBy::Week | GroupBy::Month => "by_period",
            GroupBy::Platform => "by_platform",
            GroupBy::Participant => "by_participant",
        }
    }
}

/// Input parameters for meetings_stats tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct MeetingStatsParams {
    /// "7d", "30d", "90d" or "all" (default).
    #[serde(default)]
    pub window: Option<StatsWindow>,

    /// "day" (default), "week", "month", "platform" or "participant".
    #[serde(default)]
    pub group_by: Option<GroupBy>,
}

/// Output structure for meetings_stats tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MeetingStatsOutput {
    pub window: StatsWindow,
    pub group_by: GroupBy,
    /// Meetings inside the window.
    pub total: usize,
    /// A single entry keyed `by_period`, `by_platform` or `by_participant`.
    pub counts: BTreeMap<String, BTreeMap<String, usize>>,
}

/// Implementation of the meetings_stats tool.
pub async fn stats_impl(adapter: &SourceAdapter, params: MeetingStatsParams) -> Result<CallToolResult, McpError> {
    let set = adapter.get_full_set(false).await?;
    let output = compute(
        &set.documents,
        params.window.unwrap_or_default(),
        params.group_by.unwrap_or_default(),
        Utc::now(),
    );
    json_result(&output)
}

fn compute(meetings: &[Meeting], window: StatsWindow, group_by: GroupBy, now: DateTime<Utc>) -> MeetingStatsOutput {
    let since = window.span().map(|span| now - span);
    let in_window: Vec<&Meeting> = meetings
        .iter()
        .filter(|m| since.is_none_or(|since| m.start_ts.with_timezone(&Utc) >= since))
        .collect();

    let mut buckets = BTreeMap::new();
    for meeting in &in_window {
        for key in bucket_keys(meeting, group_by) {
            *buckets.entry(key).or_insert(0) += 1;
        }
    }

    MeetingStatsOutput {
        window,
        group_by,
        total: in_window.len(),
        counts: BTreeMap::from([(group_by.counts_key().to_string(), buckets)]),
    }
}

/// Periods are taken in UTC. A meeting counts once per distinct participant.
fn bucket_keys(meeting: &Meeting, group_by: GroupBy) -> Vec<String> {
    let start = meeting.start_ts.with_timezone(&Utc);
    match group_by {
        GroupBy::Day => vec![start.format("%Y-%m-%d").to_string()],
        GroupBy::Week => {
            let week = start.iso_week();
            vec![format!("{}-W{:02}", week.year(), week.week())]
        }
        GroupBy::Month => vec![start.format("%Y-%m").to_string()],
        GroupBy::Platform => vec![meeting.platform.clone().unwrap_or_else(|| "unknown".into())],
        GroupBy::Participant => {
            meeting.participants.iter().collect::<BTreeSet<_>>().into_iter().cloned().collect()
        }
    }
}
