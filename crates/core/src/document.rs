//! Normalized meeting model.
//!
//! Both backends hand raw document objects (`serde_json::Value`) to
//! [`Meeting::from_raw`], which derives the backend-agnostic record. Documents
//! are never patched after normalization; a refresh re-derives all of them.

use chrono::{DateTime, FixedOffset};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The canonical in-memory representation of one meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Meeting {
    pub id: String,
    pub title: String,
    pub start_ts: DateTime<FixedOffset>,
    pub end_ts: Option<DateTime<FixedOffset>>,
    pub participants: Vec<String>,
    pub platform: Option<String>,
    pub notes: Option<String>,
    pub overview: Option<String>,
    pub summary: Option<String>,
    pub folder_id: Option<String>,
    pub folder_name: Option<String>,
    #[schemars(with = "Option<std::collections::BTreeMap<String, serde_json::Value>>")]
    pub metadata: Option<Map<String, Value>>,
}

/// List/search row: a meeting without its bodies or metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MeetingSummary {
    pub id: String,
    pub title: String,
    pub start_ts: DateTime<FixedOffset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_ts: Option<DateTime<FixedOffset>>,
    pub participants: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_name: Option<String>,
}

impl From<&Meeting> for MeetingSummary {
    fn from(m: &Meeting) -> Self {
        Self {
            id: m.id.clone(),
            title: m.title.clone(),
            start_ts: m.start_ts,
            end_ts: m.end_ts,
            participants: m.participants.clone(),
            platform: m.platform.clone(),
            folder_name: m.folder_name.clone(),
        }
    }
}

/// Outcome of normalizing one raw object.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Meeting(Box<Meeting>),
    /// Valid object that is not a meeting (e.g. `type: "note"`); dropped silently.
    NotAMeeting,
    /// Object that cannot become a meeting; skipped and counted.
    Malformed(String),
}

/// Side-channel context that some layouts keep outside the document object.
#[derive(Debug, Clone, Default)]
pub struct RawContext<'a> {
    /// Per-meeting metadata (desktop cache `meetingsMetadata[id]`).
    pub meeting_metadata: Option<&'a Value>,
    pub folder_id: Option<&'a str>,
    pub folder_name: Option<&'a str>,
}

impl Meeting {
    /// Normalize a raw document object with no side-channel context.
    pub fn from_raw(raw: &Value) -> Normalized {
        Self::from_raw_with(raw, &RawContext::default())
    }

    /// Normalize a raw document object.
    pub fn from_raw_with(raw: &Value, ctx: &RawContext<'_>) -> Normalized {
        let Some(obj) = raw.as_object() else {
            return Normalized::Malformed("document is not a JSON object".into());
        };

        if let Some(kind) = obj.get("type").and_then(Value::as_str)
            && kind != "meeting"
        {
            return Normalized::NotAMeeting;
        }

        let id = match obj.get("id") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return Normalized::Malformed("missing id".into()),
        };

        let start_ts = ["created_at", "start_ts"]
            .iter()
            .filter_map(|k| obj.get(*k))
            .chain(calendar_time(obj, "start"))
            .find_map(parse_ts);
        let Some(start_ts) = start_ts else {
            return Normalized::Malformed(format!("document {id} has no parseable start timestamp"));
        };

        let end_ts = obj.get("end_ts").into_iter().chain(calendar_time(obj, "end")).find_map(parse_ts);

        let platform = string_field(obj, "platform")
            .or_else(|| {
                ctx.meeting_metadata
                    .and_then(|m| m.pointer("/conference/provider"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .map(|p| canonical_platform(&p));

        let notes = ["notes_plain", "notes_markdown", "notes"]
            .iter()
            .find_map(|k| string_field(obj, k));

        Normalized::Meeting(Box::new(Meeting {
            id,
            title: string_field(obj, "title").unwrap_or_default(),
            start_ts,
            end_ts,
            participants: participants(obj.get("people")),
            platform,
            notes,
            overview: string_field(obj, "overview"),
            summary: string_field(obj, "summary"),
            folder_id: string_field(obj, "folder_id").or_else(|| ctx.folder_id.map(str::to_string)),
            folder_name: string_field(obj, "folder_name").or_else(|| ctx.folder_name.map(str::to_string)),
            metadata: obj.get("metadata").and_then(Value::as_object).cloned(),
        }))
    }

    /// Whether `needle` (already lowercased) occurs in the title or any note body.
    pub fn matches_text(&self, needle: &str) -> bool {
        [Some(&self.title), self.notes.as_ref(), self.overview.as_ref(), self.summary.as_ref()]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn calendar_time<'a>(obj: &'a Map<String, Value>, edge: &str) -> Option<&'a Value> {
    obj.get("google_calendar_event")
        .and_then(|e| e.get(edge))
        .and_then(|e| e.get("dateTime"))
}

fn parse_ts(value: &Value) -> Option<DateTime<FixedOffset>> {
    value.as_str().and_then(|s| DateTime::parse_from_rfc3339(s).ok())
}

/// `people` is either `{creator, attendees}` or a flat array of people.
fn participants(people: Option<&Value>) -> Vec<String> {
    fn display_name(person: &Value) -> Option<String> {
        ["name", "email"]
            .iter()
            .find_map(|k| person.get(*k).and_then(Value::as_str).filter(|s| !s.is_empty()))
            .map(str::to_string)
    }

    match people {
        Some(Value::Object(obj)) => obj
            .get("creator")
            .into_iter()
            .chain(obj.get("attendees").and_then(Value::as_array).into_iter().flatten())
            .filter_map(display_name)
            .collect(),
        Some(Value::Array(list)) => list.iter().filter_map(display_name).collect(),
        _ => Vec::new(),
    }
}

fn canonical_platform(raw: &str) -> String {
    match raw.to_ascii_lowercase().as_str() {
        "google_meet" | "meet" | "hangouts_meet" => "meet".into(),
        "zoom" => "zoom".into(),
        "microsoft_teams" | "teams" => "teams".into(),
        other => other.to_string(),
    }
}
