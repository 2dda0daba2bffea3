//! Grade entry and averages.

use crate::clock::Clock;
use crate::model::grade::{average_percentage, grade_percentage, GradeRecord, GradeType};
use crate::model::{UserId, ValidationError};
use crate::repo::kv_repo::KeyValueStore;
use crate::service::data_manager::DataManager;
use crate::service::error::{PortalError, PortalResult};
use log::info;
use std::collections::BTreeSet;
use uuid::Uuid;

impl<S: KeyValueStore, C: Clock> DataManager<S, C> {
    /// Records a grade; `added_by` is the signed-in user.
    pub fn add_grade(
        &mut self,
        student_id: UserId,
        subject: &str,
        grade: f64,
        max_grade: f64,
        grade_type: GradeType,
        remarks: &str,
    ) -> PortalResult<GradeRecord> {
        if subject.trim().is_empty() {
            return Err(ValidationError::BlankField("subject").into());
        }
        let percentage = grade_percentage(grade, max_grade)?;
        if self.data.student(student_id).is_none() {
            return Err(PortalError::StudentNotFound(student_id));
        }

        let record = GradeRecord {
            id: Uuid::new_v4(),
            student_id,
            subject: subject.trim().to_string(),
            grade,
            max_grade,
            percentage,
            grade_type,
            remarks: remarks.to_string(),
            added_by: self.current_user_id(),
            created_at: self.clock.now(),
        };
        let record = self.commit(|data| {
            data.grades.push(record.clone());
            Ok(record)
        })?;
        info!(
            "event=grade_add module=service status=ok type={:?} percentage={}",
            grade_type, percentage
        );
        Ok(record)
    }

    /// Grades for `student_id`, newest first, optionally limited to one
    /// subject (case-insensitive).
    pub fn get_grades_for_student(
        &self,
        student_id: UserId,
        subject: Option<&str>,
    ) -> Vec<&GradeRecord> {
        let subject = subject
            .map(|value| value.trim().to_lowercase())
            .filter(|value| !value.is_empty());
        let mut grades: Vec<&GradeRecord> = self
            .data
            .grades
            .iter()
            .filter(|grade| grade.student_id == student_id)
            .filter(|grade| match subject.as_deref() {
                Some(wanted) => grade.subject.to_lowercase() == wanted,
                None => true,
            })
            .collect();
        grades.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        grades
    }

    /// Rounded mean percentage; 0 when there are no grades.
    pub fn get_grade_average(&self, student_id: UserId, subject: Option<&str>) -> u32 {
        average_percentage(self.get_grades_for_student(student_id, subject))
    }

    /// Distinct subjects graded for `student_id`, sorted, lowercase-deduplicated
    /// but keeping the first spelling seen.
    pub fn subjects_for_student(&self, student_id: UserId) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut subjects = Vec::new();
        for grade in self.data.grades.iter().filter(|g| g.student_id == student_id) {
            if seen.insert(grade.subject.to_lowercase()) {
                subjects.push(grade.subject.clone());
            }
        }
        subjects.sort_by_key(|subject| subject.to_lowercase());
        subjects
    }
}
