//! The whole persisted portal graph.
//!
//! # Invariants
//! - Every student/teacher record has a matching `users` entry with the
//!   same id and role.
//! - The document is always saved as one JSON value.

use crate::model::analytics::Analytics;
use crate::model::attendance::AttendanceRecord;
use crate::model::event::CalendarEvent;
use crate::model::grade::GradeRecord;
use crate::model::message::Message;
use crate::model::report::{Notice, ProgressReport};
use crate::model::settings::Settings;
use crate::model::user::{Role, StudentRecord, TeacherRecord, User};
use crate::model::UserId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortalData {
    pub users: Vec<User>,
    pub students: Vec<StudentRecord>,
    pub teachers: Vec<TeacherRecord>,
    pub progress_reports: Vec<ProgressReport>,
    pub notices: Vec<Notice>,
    /// Legacy student-teacher pairing list. Kept so older documents
    /// round-trip; assignment lives on `StudentRecord::assigned_teacher`.
    pub assignments: Vec<Value>,
    pub attendance: Vec<AttendanceRecord>,
    pub messages: Vec<Message>,
    pub events: Vec<CalendarEvent>,
    pub grades: Vec<GradeRecord>,
    pub analytics: Analytics,
    pub settings: Settings,
}

impl PortalData {
    /// Empty document with default settings for `academic_year`.
    pub fn empty(academic_year: i32) -> Self {
        Self {
            settings: Settings::for_year(academic_year),
            ..Self::default()
        }
    }

    pub fn user(&self, user_id: UserId) -> Option<&User> {
        self.users.iter().find(|user| user.id == user_id)
    }

    pub fn student(&self, user_id: UserId) -> Option<&StudentRecord> {
        self.students.iter().find(|student| student.id() == user_id)
    }

    pub fn teacher(&self, user_id: UserId) -> Option<&TeacherRecord> {
        self.teachers.iter().find(|teacher| teacher.id() == user_id)
    }

    /// Number of students currently assigned to `teacher_id`.
    pub fn student_count_for(&self, teacher_id: UserId) -> usize {
        self.students
            .iter()
            .filter(|student| student.assigned_teacher == Some(teacher_id))
            .count()
    }

    /// Checks the cross-record invariants of an imported document.
    pub fn check_consistency(&self) -> Result<(), String> {
        for student in &self.students {
            match self.user(student.id()) {
                Some(user) if user.role == Role::Student => {}
                _ => {
                    return Err(format!(
                        "student record {} has no matching student user",
                        student.id()
                    ))
                }
            }
        }
        for teacher in &self.teachers {
            match self.user(teacher.id()) {
                Some(user) if user.role == Role::Teacher => {}
                _ => {
                    return Err(format!(
                        "teacher record {} has no matching teacher user",
                        teacher.id()
                    ))
                }
            }
        }
        Ok(())
    }
}
