//! Progress reports and teacher notices.

use crate::model::{RecordId, UserId, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Teacher's behavior assessment on a progress report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Behavior {
    Excellent,
    Good,
    Average,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
}

/// Report body written by a teacher; every score is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReportData {
    #[serde(default, deserialize_with = "lenient_score")]
    pub math: Option<u32>,
    #[serde(default, deserialize_with = "lenient_score")]
    pub science: Option<u32>,
    #[serde(default, deserialize_with = "lenient_score")]
    pub english: Option<u32>,
    /// Attendance percentage as judged by the teacher.
    #[serde(default, deserialize_with = "lenient_score")]
    pub attendance: Option<u32>,
    #[serde(default, deserialize_with = "lenient_behavior")]
    pub behavior: Option<Behavior>,
    #[serde(default)]
    pub remarks: String,
}

impl ProgressReportData {
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, score) in [
            ("math", self.math),
            ("science", self.science),
            ("english", self.english),
            ("attendance", self.attendance),
        ] {
            if let Some(value) = score {
                if value > 100 {
                    return Err(ValidationError::ScoreOutOfRange { field, value });
                }
            }
        }
        Ok(())
    }
}

/// Partial update for a stored report; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressReportPatch {
    pub math: Option<u32>,
    pub science: Option<u32>,
    pub english: Option<u32>,
    pub attendance: Option<u32>,
    pub behavior: Option<Behavior>,
    pub remarks: Option<String>,
}

/// Stored progress report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub id: RecordId,
    pub teacher_id: UserId,
    pub student_id: UserId,
    #[serde(flatten)]
    pub data: ProgressReportData,
    pub created_at: DateTime<Utc>,
}

impl ProgressReport {
    /// Applies `patch` on top of the current body and re-validates.
    pub fn apply(&mut self, patch: ProgressReportPatch) -> Result<(), ValidationError> {
        let mut next = self.data.clone();
        if patch.math.is_some() {
            next.math = patch.math;
        }
        if patch.science.is_some() {
            next.science = patch.science;
        }
        if patch.english.is_some() {
            next.english = patch.english;
        }
        if patch.attendance.is_some() {
            next.attendance = patch.attendance;
        }
        if patch.behavior.is_some() {
            next.behavior = patch.behavior;
        }
        if let Some(remarks) = patch.remarks {
            next.remarks = remarks;
        }
        next.validate()?;
        self.data = next;
        Ok(())
    }
}

/// Announcement a teacher posts to their students.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub id: RecordId,
    pub teacher_id: UserId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

// Form inputs were stored as strings ("85" or ""), so accept either shape.
fn lenient_score<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number
            .as_u64()
            .and_then(|value| u32::try_from(value).ok())
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid score `{number}`"))),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(Value::String(text)) => text
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid score `{text}`"))),
        Some(other) => Err(D::Error::custom(format!("invalid score `{other}`"))),
    }
}

fn lenient_behavior<'de, D>(deserializer: D) -> Result<Option<Behavior>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(text) if text.trim().is_empty() => Ok(None),
        Some(text) => serde_json::from_value(Value::String(text.clone()))
            .map(Some)
            .map_err(|_| D::Error::custom(format!("unknown behavior `{text}`"))),
    }
}

#[cfg(test)]
mod tests {
    use super::{Behavior, ProgressReportData};
    use crate::model::ValidationError;
    use serde_json::json;

    #[test]
    fn form_strings_deserialize_into_scores() {
        let data: ProgressReportData = serde_json::from_value(json!({
            "math": "85",
            "science": "",
            "english": 72,
            "behavior": "Needs Improvement",
            "remarks": "steady"
        }))
        .unwrap();

        assert_eq!(data.math, Some(85));
        assert_eq!(data.science, None);
        assert_eq!(data.english, Some(72));
        assert_eq!(data.attendance, None);
        assert_eq!(data.behavior, Some(Behavior::NeedsImprovement));
    }

    #[test]
    fn empty_behavior_is_none() {
        let data: ProgressReportData =
            serde_json::from_value(json!({"behavior": ""})).unwrap();
        assert_eq!(data.behavior, None);
    }

    #[test]
    fn score_above_hundred_is_rejected() {
        let data = ProgressReportData {
            science: Some(101),
            ..ProgressReportData::default()
        };
        assert_eq!(
            data.validate(),
            Err(ValidationError::ScoreOutOfRange {
                field: "science",
                value: 101
            })
        );
    }
}
