//! Query-time filter predicates shared by list and search.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::Error;
use crate::document::Meeting;

/// Filters applied to the full set before pagination.
#[derive(Debug, Clone, Default)]
pub struct MeetingFilters {
    /// Inclusive lower bound on `start_ts`.
    pub from_ts: Option<DateTime<FixedOffset>>,
    /// Inclusive upper bound on `start_ts`.
    pub to_ts: Option<DateTime<FixedOffset>>,
    /// Every name must appear verbatim (case-sensitive) in the participant list.
    pub participants: Vec<String>,
    /// Case-insensitive substring of the title.
    pub title_query: Option<String>,
}

impl MeetingFilters {
    pub fn matches(&self, meeting: &Meeting) -> bool {
        if let Some(from) = self.from_ts
            && meeting.start_ts < from
        {
            return false;
        }
        if let Some(to) = self.to_ts
            && meeting.start_ts > to
        {
            return false;
        }
        if !self.participants.iter().all(|p| meeting.participants.iter().any(|m| m == p)) {
            return false;
        }
        if let Some(q) = self.title_query.as_deref().map(str::trim).filter(|q| !q.is_empty())
            && !meeting.title.to_lowercase().contains(&q.to_lowercase())
        {
            return false;
        }
        true
    }
}

/// Which end of a day a bare `YYYY-MM-DD` stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayEdge {
    Start,
    End,
}

/// Parse a timestamp parameter: RFC 3339, or a bare date interpreted in UTC.
///
/// # Errors
///
/// Returns `Error::InvalidInput` naming `param` when the value is neither.
pub fn parse_timestamp_param(param: &str, value: &str, edge: DayEdge) -> Result<DateTime<FixedOffset>, Error> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts);
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        Error::InvalidInput(format!("{param}: expected RFC 3339 timestamp or YYYY-MM-DD, got {value:?}"))
    })?;
    let time = match edge {
        DayEdge::Start => NaiveTime::MIN,
        DayEdge::End => NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap_or(NaiveTime::MIN),
    };
    Ok(Utc.from_utc_datetime(&date.and_time(time)).fixed_offset())
}
