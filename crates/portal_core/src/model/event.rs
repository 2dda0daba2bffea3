//! Calendar events.
//!
//! # Invariants
//! - `end_date` is never earlier than `start_date`.

use crate::model::{RecordId, UserId, ValidationError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    #[default]
    General,
    Exam,
    Holiday,
    Meeting,
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "general" => Ok(Self::General),
            "exam" => Ok(Self::Exam),
            "holiday" => Ok(Self::Holiday),
            "meeting" => Ok(Self::Meeting),
            other => Err(format!(
                "unknown event type `{other}`; expected general|exam|holiday|meeting"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: RecordId,
    pub created_by: UserId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "local_datetime")]
    pub start_date: NaiveDateTime,
    #[serde(with = "local_datetime")]
    pub end_date: NaiveDateTime,
    #[serde(default)]
    pub event_type: EventType,
    #[serde(default)]
    pub participants: Vec<UserId>,
    pub created_at: DateTime<Utc>,
}

impl CalendarEvent {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::BlankField("title"));
        }
        if self.end_date < self.start_date {
            return Err(ValidationError::EventEndsBeforeStart);
        }
        Ok(())
    }

    /// Whether the event's calendar-day span includes `date`.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date.date() <= date && date <= self.end_date.date()
    }
}

/// Parses a local date-time as typed into a `datetime-local` field.
///
/// Accepts `YYYY-MM-DDTHH:MM[:SS[.f]]`, the same with a space separator,
/// or a bare `YYYY-MM-DD` (midnight).
pub fn parse_local_datetime(value: &str) -> Option<NaiveDateTime> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    let trimmed = value.trim();
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|value| value.naive_utc())
        })
}

mod local_datetime {
    use super::parse_local_datetime;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        let text = String::deserialize(deserializer)?;
        parse_local_datetime(&text)
            .ok_or_else(|| D::Error::custom(format!("invalid local date-time `{text}`")))
    }
}

#[cfg(test)]
mod tests {
    use super::parse_local_datetime;
    use chrono::NaiveDate;

    #[test]
    fn parses_datetime_local_input_without_seconds() {
        let parsed = parse_local_datetime("2026-03-02T09:30").unwrap();
        let expected = NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn parses_bare_date_as_midnight() {
        let parsed = parse_local_datetime("2026-03-02").unwrap();
        assert_eq!(parsed.time().to_string(), "00:00:00");
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_local_datetime("next tuesday").is_none());
    }
}
