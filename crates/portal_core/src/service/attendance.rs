//! Daily attendance marking and statistics.
//!
//! # Invariants
//! - One record per student per date; marking again replaces the record.
//! - `marked_by` is the signed-in user at the time of marking.

use crate::clock::Clock;
use crate::model::attendance::{AttendanceRecord, AttendanceStats, AttendanceStatus};
use crate::model::UserId;
use crate::repo::kv_repo::KeyValueStore;
use crate::service::data_manager::DataManager;
use crate::service::error::{PortalError, PortalResult};
use chrono::NaiveDate;
use log::info;
use uuid::Uuid;

impl<S: KeyValueStore, C: Clock> DataManager<S, C> {
    pub fn mark_attendance(
        &mut self,
        student_id: UserId,
        date: NaiveDate,
        status: AttendanceStatus,
        remarks: &str,
    ) -> PortalResult<AttendanceRecord> {
        if self.data.student(student_id).is_none() {
            return Err(PortalError::StudentNotFound(student_id));
        }

        let record = AttendanceRecord {
            id: Uuid::new_v4(),
            student_id,
            date,
            status,
            remarks: remarks.to_string(),
            marked_by: self.current_user_id(),
            created_at: self.clock.now(),
        };
        let replaced = self.commit(|data| {
            let before = data.attendance.len();
            data.attendance
                .retain(|existing| !(existing.student_id == student_id && existing.date == date));
            data.attendance.push(record.clone());
            Ok(before != data.attendance.len() - 1)
        })?;
        info!(
            "event=attendance_mark module=service status=ok replaced={}",
            replaced
        );
        Ok(record)
    }

    /// Records for `student_id` within `start..=end`, oldest date first.
    pub fn get_attendance_for_student(
        &self,
        student_id: UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<&AttendanceRecord> {
        let mut records: Vec<&AttendanceRecord> = self
            .data
            .attendance
            .iter()
            .filter(|record| record.student_id == student_id)
            .filter(|record| start <= record.date && record.date <= end)
            .collect();
        records.sort_by_key(|record| record.date);
        records
    }

    /// The record for one student on one date, if marked.
    pub fn attendance_on(&self, student_id: UserId, date: NaiveDate) -> Option<&AttendanceRecord> {
        self.data
            .attendance
            .iter()
            .find(|record| record.student_id == student_id && record.date == date)
    }

    pub fn get_attendance_stats(&self, student_id: UserId) -> AttendanceStats {
        AttendanceStats::from_records(
            self.data
                .attendance
                .iter()
                .filter(|record| record.student_id == student_id),
        )
    }
}
