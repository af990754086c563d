//! Weekly opening hours and the "open now" evaluator.
//!
//! Each day's entry is `"H:MM-H:MM"`, `"closed"`, or `"varies"`. A close time
//! earlier than the open time means the span runs past midnight.

use chrono::{Datelike, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::catalog::Location;

/// Opening hours keyed by weekday abbreviation, or a single `all` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hours {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all: Option<String>,
    #[serde(rename = "Mon", default, skip_serializing_if = "Option::is_none")]
    pub mon: Option<String>,
    #[serde(rename = "Tue", default, skip_serializing_if = "Option::is_none")]
    pub tue: Option<String>,
    #[serde(rename = "Wed", default, skip_serializing_if = "Option::is_none")]
    pub wed: Option<String>,
    #[serde(rename = "Thu", default, skip_serializing_if = "Option::is_none")]
    pub thu: Option<String>,
    #[serde(rename = "Fri", default, skip_serializing_if = "Option::is_none")]
    pub fri: Option<String>,
    #[serde(rename = "Sat", default, skip_serializing_if = "Option::is_none")]
    pub sat: Option<String>,
    #[serde(rename = "Sun", default, skip_serializing_if = "Option::is_none")]
    pub sun: Option<String>,
}

impl Hours {
    /// Entry that applies on `day`. A non-empty `all` entry wins over the
    /// per-day table.
    pub fn entry_for(&self, day: Weekday) -> Option<&str> {
        non_empty(&self.all).or_else(|| {
            non_empty(match day {
                Weekday::Mon => &self.mon,
                Weekday::Tue => &self.tue,
                Weekday::Wed => &self.wed,
                Weekday::Thu => &self.thu,
                Weekday::Fri => &self.fri,
                Weekday::Sat => &self.sat,
                Weekday::Sun => &self.sun,
            })
        })
    }
}

fn non_empty(entry: &Option<String>) -> Option<&str> {
    entry.as_deref().filter(|v| !v.trim().is_empty())
}

/// A parsed open/close pair for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpeningSpan {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl OpeningSpan {
    pub fn is_overnight(&self) -> bool {
        self.close < self.open
    }

    /// Inclusive on both ends. For an overnight span the early-morning part
    /// belongs to the span that started the previous evening.
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.is_overnight() {
            time >= self.open || time <= self.close
        } else {
            time >= self.open && time <= self.close
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HoursParseError {
    #[error("expected 'H:MM-H:MM', got '{0}'")]
    Format(String),

    #[error("time out of range in '{0}'")]
    OutOfRange(String),
}

/// Parse `"H:MM-H:MM"` into an [`OpeningSpan`].
pub fn parse_span(entry: &str) -> Result<OpeningSpan, HoursParseError> {
    let (open, close) = entry
        .trim()
        .split_once('-')
        .ok_or_else(|| HoursParseError::Format(entry.to_string()))?;

    Ok(OpeningSpan {
        open: parse_time(open, entry)?,
        close: parse_time(close, entry)?,
    })
}

fn parse_time(part: &str, entry: &str) -> Result<NaiveTime, HoursParseError> {
    let format_err = || HoursParseError::Format(entry.to_string());

    let (hour, minute) = part.trim().split_once(':').ok_or_else(format_err)?;
    let hour: u32 = hour.parse().map_err(|_| format_err())?;
    let minute: u32 = minute.parse().map_err(|_| format_err())?;

    NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| HoursParseError::OutOfRange(entry.to_string()))
}

/// Whether `hours` report open at the local wall-clock moment `now`.
///
/// A missing, `closed`, or `varies` entry is closed. Malformed entries are
/// returned as errors so callers can decide how to report them.
pub fn evaluate(hours: &Hours, now: NaiveDateTime) -> Result<bool, HoursParseError> {
    let Some(entry) = hours.entry_for(now.weekday()) else {
        return Ok(false);
    };

    let normalized = entry.trim().to_ascii_lowercase();
    if normalized == "closed" || normalized == "varies" {
        return Ok(false);
    }

    Ok(parse_span(entry)?.contains(now.time()))
}

/// Whether `location` is open at `now`. Never fails: unparseable hours are
/// logged and treated as closed.
pub fn is_open_at(location: &Location, now: NaiveDateTime) -> bool {
    match evaluate(&location.hours, now) {
        Ok(open) => open,
        Err(e) => {
            tracing::warn!(
                location_id = location.id,
                location = %location.name,
                error = %e,
                "Could not parse opening hours, treating as closed",
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    use super::*;
    use crate::catalog::test_support::location;

    /// 2025-06-11 is a Wednesday.
    fn wednesday_at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 11)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn all(entry: &str) -> Hours {
        Hours {
            all: Some(entry.to_string()),
            ..Hours::default()
        }
    }

    #[test]
    fn open_during_day_span() {
        assert_eq!(evaluate(&all("9:00-17:00"), wednesday_at(10, 0)), Ok(true));
    }

    #[test]
    fn closed_after_day_span() {
        assert_eq!(evaluate(&all("9:00-17:00"), wednesday_at(18, 0)), Ok(false));
    }

    #[test]
    fn span_edges_are_inclusive() {
        let hours = all("9:00-17:00");
        assert_eq!(evaluate(&hours, wednesday_at(9, 0)), Ok(true));
        assert_eq!(evaluate(&hours, wednesday_at(17, 0)), Ok(true));
        assert_eq!(evaluate(&hours, wednesday_at(8, 59)), Ok(false));
    }

    #[test]
    fn overnight_span_open_after_midnight() {
        assert_eq!(evaluate(&all("22:00-2:00"), wednesday_at(1, 0)), Ok(true));
    }

    #[test]
    fn overnight_span_open_late_evening_and_closed_midday() {
        let hours = all("22:00-2:00");
        assert_eq!(evaluate(&hours, wednesday_at(23, 30)), Ok(true));
        assert_eq!(evaluate(&hours, wednesday_at(12, 0)), Ok(false));
        assert_eq!(evaluate(&hours, wednesday_at(2, 1)), Ok(false));
    }

    #[test]
    fn closed_and_varies_are_closed_case_insensitively() {
        assert_eq!(evaluate(&all("Closed"), wednesday_at(12, 0)), Ok(false));
        assert_eq!(evaluate(&all("VARIES"), wednesday_at(12, 0)), Ok(false));
    }

    #[test]
    fn missing_entry_is_closed() {
        let hours = Hours {
            mon: Some("9:00-17:00".into()),
            ..Hours::default()
        };
        assert_eq!(evaluate(&hours, wednesday_at(12, 0)), Ok(false));
    }

    #[test]
    fn per_day_entry_used_without_all() {
        let hours = Hours {
            wed: Some("11:00-13:00".into()),
            thu: Some("closed".into()),
            ..Hours::default()
        };
        assert_eq!(evaluate(&hours, wednesday_at(12, 0)), Ok(true));
    }

    #[test]
    fn all_entry_wins_over_per_day() {
        let hours = Hours {
            all: Some("8:00-9:00".into()),
            wed: Some("11:00-13:00".into()),
            ..Hours::default()
        };
        assert_eq!(evaluate(&hours, wednesday_at(12, 0)), Ok(false));
    }

    #[test]
    fn blank_all_entry_falls_back_to_day() {
        let hours = Hours {
            all: Some("  ".into()),
            wed: Some("11:00-13:00".into()),
            ..Hours::default()
        };
        assert_eq!(hours.entry_for(Weekday::Wed), Some("11:00-13:00"));
        assert_eq!(hours.entry_for(Weekday::Thu), None);
    }

    #[test]
    fn malformed_entries_are_errors() {
        assert_matches!(parse_span("9am to 5pm"), Err(HoursParseError::Format(_)));
        assert_matches!(parse_span("9:00-"), Err(HoursParseError::Format(_)));
        assert_matches!(parse_span("25:00-26:00"), Err(HoursParseError::OutOfRange(_)));
        assert_matches!(parse_span("9:75-17:00"), Err(HoursParseError::OutOfRange(_)));
    }

    #[test]
    fn malformed_hours_report_closed_for_location() {
        let mut loc = location(1, "Mystery Barn");
        loc.hours = all("dawn-dusk");
        assert!(!is_open_at(&loc, wednesday_at(12, 0)));
    }

    #[test]
    fn location_open_uses_its_hours() {
        let loc = location(1, "Park");
        assert!(is_open_at(&loc, wednesday_at(7, 0)));
        assert!(!is_open_at(&loc, wednesday_at(5, 0)));
    }
}
