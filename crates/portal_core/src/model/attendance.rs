//! Daily attendance records.
//!
//! # Invariants
//! - At most one record per `(student_id, date)`; marking again replaces it.

use crate::model::{RecordId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

impl FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            "late" => Ok(Self::Late),
            "excused" => Ok(Self::Excused),
            other => Err(format!(
                "unknown attendance status `{other}`; expected present|absent|late|excused"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: RecordId,
    pub student_id: UserId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub remarks: String,
    /// Signed-in user at the time of marking, if any.
    pub marked_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

/// Counts for one student over every recorded day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceStats {
    pub total: u32,
    pub present: u32,
    pub absent: u32,
    pub late: u32,
    pub excused: u32,
    /// `round(present / total * 100)`, or 0 with no records.
    pub percentage: u32,
}

impl AttendanceStats {
    /// Tallies `records`, which must all belong to one student.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a AttendanceRecord>) -> Self {
        let mut stats = Self::default();
        for record in records {
            stats.total += 1;
            match record.status {
                AttendanceStatus::Present => stats.present += 1,
                AttendanceStatus::Absent => stats.absent += 1,
                AttendanceStatus::Late => stats.late += 1,
                AttendanceStatus::Excused => stats.excused += 1,
            }
        }
        stats.percentage = rounded_percentage(stats.present, stats.total);
        stats
    }
}

pub(crate) fn rounded_percentage(part: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (f64::from(part) / f64::from(total) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::rounded_percentage;

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(rounded_percentage(0, 0), 0);
        assert_eq!(rounded_percentage(1, 8), 13);
        assert_eq!(rounded_percentage(2, 3), 67);
        assert_eq!(rounded_percentage(3, 3), 100);
    }
}
