//! Grade history.
//!
//! # Invariants
//! - `max_grade > 0` and `grade >= 0`.
//! - `percentage` is computed once at creation and never recomputed.

use crate::model::{RecordId, UserId, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeType {
    #[default]
    Assignment,
    Quiz,
    Exam,
    Project,
}

impl FromStr for GradeType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "assignment" => Ok(Self::Assignment),
            "quiz" => Ok(Self::Quiz),
            "exam" => Ok(Self::Exam),
            "project" => Ok(Self::Project),
            other => Err(format!(
                "unknown grade type `{other}`; expected assignment|quiz|exam|project"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRecord {
    pub id: RecordId,
    pub student_id: UserId,
    pub subject: String,
    pub grade: f64,
    pub max_grade: f64,
    pub percentage: u32,
    #[serde(default)]
    pub grade_type: GradeType,
    #[serde(default)]
    pub remarks: String,
    pub added_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

/// Validates a raw score and returns its rounded percentage.
pub fn grade_percentage(grade: f64, max_grade: f64) -> Result<u32, ValidationError> {
    if !max_grade.is_finite() || max_grade <= 0.0 {
        return Err(ValidationError::NonPositiveMaxGrade(max_grade));
    }
    if !grade.is_finite() || grade < 0.0 {
        return Err(ValidationError::NegativeGrade(grade));
    }
    Ok((grade / max_grade * 100.0).round() as u32)
}

/// Rounded mean of stored percentages; 0 for an empty set.
pub fn average_percentage<'a>(grades: impl IntoIterator<Item = &'a GradeRecord>) -> u32 {
    let (sum, count) = grades
        .into_iter()
        .fold((0u64, 0u64), |(sum, count), grade| {
            (sum + u64::from(grade.percentage), count + 1)
        });
    if count == 0 {
        return 0;
    }
    (sum as f64 / count as f64).round() as u32
}

#[cfg(test)]
mod tests {
    use super::grade_percentage;
    use crate::model::ValidationError;

    #[test]
    fn percentage_is_rounded() {
        assert_eq!(grade_percentage(17.0, 20.0).unwrap(), 85);
        assert_eq!(grade_percentage(2.0, 3.0).unwrap(), 67);
        assert_eq!(grade_percentage(0.0, 10.0).unwrap(), 0);
    }

    #[test]
    fn bonus_points_can_exceed_hundred() {
        assert_eq!(grade_percentage(11.0, 10.0).unwrap(), 110);
    }

    #[test]
    fn zero_max_grade_is_rejected() {
        assert_eq!(
            grade_percentage(5.0, 0.0),
            Err(ValidationError::NonPositiveMaxGrade(0.0))
        );
        assert_eq!(
            grade_percentage(-1.0, 10.0),
            Err(ValidationError::NegativeGrade(-1.0))
        );
    }
}
