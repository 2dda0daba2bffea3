//! Derived dashboard snapshot.
//!
//! The snapshot is recomputed on demand and stored in the document so the
//! admin overview can show the last computed values.

use crate::model::user::StudentRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    ProgressReport,
    Message,
}

/// One entry of the recent-activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub description: String,
    pub date: DateTime<Utc>,
    /// Username of the acting user when it still exists.
    pub user: Option<String>,
}

/// Student ranked by average grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedStudent {
    #[serde(flatten)]
    pub student: StudentRecord,
    pub average_grade: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Analytics {
    pub total_students: usize,
    pub total_teachers: usize,
    pub total_messages: usize,
    pub total_events: usize,
    pub average_attendance: u32,
    pub top_performing_students: Vec<RankedStudent>,
    pub recent_activity: Vec<Activity>,
    /// `None` until the first recompute.
    pub last_updated: Option<DateTime<Utc>>,
}
