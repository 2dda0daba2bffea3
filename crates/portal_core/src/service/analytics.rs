//! Derived dashboard aggregates.
//!
//! # Invariants
//! - Aggregates over an empty population are 0, never NaN.
//! - Rankings are stable: equal averages keep registration order.

use crate::clock::Clock;
use crate::model::analytics::{Activity, ActivityKind, Analytics, RankedStudent};
use crate::model::attendance::AttendanceStats;
use crate::model::UserId;
use crate::repo::kv_repo::KeyValueStore;
use crate::service::data_manager::DataManager;
use crate::service::error::{PortalError, PortalResult};
use log::info;
use serde::Serialize;

pub const DEFAULT_TOP_STUDENTS: usize = 5;
pub const DEFAULT_RECENT_ACTIVITY: usize = 10;

/// Per-student summary shown on roster cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentOverview {
    pub attendance: AttendanceStats,
    pub average_grade: u32,
}

impl<S: KeyValueStore, C: Clock> DataManager<S, C> {
    /// Recomputes the analytics snapshot, stores it and saves.
    pub fn update_analytics(&mut self) -> PortalResult<Analytics> {
        let analytics = Analytics {
            total_students: self.data.students.len(),
            total_teachers: self.data.teachers.len(),
            total_messages: self.data.messages.len(),
            total_events: self.data.events.len(),
            average_attendance: self.calculate_average_attendance(),
            top_performing_students: self.get_top_performing_students(DEFAULT_TOP_STUDENTS),
            recent_activity: self.get_recent_activity(DEFAULT_RECENT_ACTIVITY),
            last_updated: Some(self.clock.now()),
        };
        self.commit(|data| {
            data.analytics = analytics.clone();
            Ok(())
        })?;
        info!(
            "event=analytics_update module=service status=ok students={} teachers={}",
            analytics.total_students, analytics.total_teachers
        );
        Ok(analytics)
    }

    /// Rounded mean of every student's attendance percentage.
    pub fn calculate_average_attendance(&self) -> u32 {
        let students = &self.data.students;
        if students.is_empty() {
            return 0;
        }
        let total: u64 = students
            .iter()
            .map(|student| u64::from(self.get_attendance_stats(student.id()).percentage))
            .sum();
        (total as f64 / students.len() as f64).round() as u32
    }

    /// Up to `limit` students by average grade, best first.
    pub fn get_top_performing_students(&self, limit: usize) -> Vec<RankedStudent> {
        let mut ranked: Vec<RankedStudent> = self
            .data
            .students
            .iter()
            .map(|student| RankedStudent {
                student: student.clone(),
                average_grade: self.get_grade_average(student.id(), None),
            })
            .collect();
        ranked.sort_by(|a, b| b.average_grade.cmp(&a.average_grade));
        ranked.truncate(limit);
        ranked
    }

    /// Latest progress reports and messages merged, newest first.
    pub fn get_recent_activity(&self, limit: usize) -> Vec<Activity> {
        let username = |user_id: UserId| self.data.user(user_id).map(|user| user.username.clone());

        let mut reports: Vec<_> = self.data.progress_reports.iter().collect();
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let mut messages: Vec<_> = self.data.messages.iter().collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut activities: Vec<Activity> = reports
            .into_iter()
            .take(limit)
            .map(|report| Activity {
                kind: ActivityKind::ProgressReport,
                description: "Progress report updated".to_string(),
                date: report.created_at,
                user: username(report.teacher_id),
            })
            .chain(messages.into_iter().take(limit).map(|message| Activity {
                kind: ActivityKind::Message,
                description: format!("Message: {}", message.subject),
                date: message.created_at,
                user: username(message.from_user_id),
            }))
            .collect();
        activities.sort_by(|a, b| b.date.cmp(&a.date));
        activities.truncate(limit);
        activities
    }

    /// Attendance stats and overall grade average for one student.
    pub fn student_overview(&self, student_id: UserId) -> PortalResult<StudentOverview> {
        if self.data.student(student_id).is_none() {
            return Err(PortalError::StudentNotFound(student_id));
        }
        Ok(StudentOverview {
            attendance: self.get_attendance_stats(student_id),
            average_grade: self.get_grade_average(student_id, None),
        })
    }
}
