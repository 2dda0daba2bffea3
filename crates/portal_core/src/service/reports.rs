//! Progress reports, notices and the per-student report card.

use crate::clock::Clock;
use crate::model::report::{Notice, ProgressReport, ProgressReportData, ProgressReportPatch};
use crate::model::user::StudentRecord;
use crate::model::{RecordId, UserId, ValidationError};
use crate::repo::kv_repo::KeyValueStore;
use crate::service::data_manager::DataManager;
use crate::service::error::{PortalError, PortalResult};
use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;
use uuid::Uuid;

/// Everything needed to print one student's progress history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportCard {
    pub student: StudentRecord,
    /// Assigned teacher's display name, if assigned.
    pub teacher_name: Option<String>,
    /// Newest first.
    pub reports: Vec<ProgressReport>,
    pub generated_at: DateTime<Utc>,
}

impl<S: KeyValueStore, C: Clock> DataManager<S, C> {
    pub fn add_progress_report(
        &mut self,
        teacher_id: UserId,
        student_id: UserId,
        data: ProgressReportData,
    ) -> PortalResult<ProgressReport> {
        data.validate()?;
        if self.data.teacher(teacher_id).is_none() {
            return Err(PortalError::TeacherNotFound(teacher_id));
        }
        if self.data.student(student_id).is_none() {
            return Err(PortalError::StudentNotFound(student_id));
        }

        let report = ProgressReport {
            id: Uuid::new_v4(),
            teacher_id,
            student_id,
            data,
            created_at: self.clock.now(),
        };
        let report = self.commit(|data| {
            data.progress_reports.push(report.clone());
            Ok(report)
        })?;
        info!("event=report_add module=service status=ok");
        Ok(report)
    }

    /// Reports for `student_id`, newest first.
    pub fn get_progress_reports_for_student(&self, student_id: UserId) -> Vec<&ProgressReport> {
        let mut reports: Vec<&ProgressReport> = self
            .data
            .progress_reports
            .iter()
            .filter(|report| report.student_id == student_id)
            .collect();
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        reports
    }

    /// Merges `patch` into an existing report.
    pub fn update_progress_report(
        &mut self,
        report_id: RecordId,
        patch: ProgressReportPatch,
    ) -> PortalResult<ProgressReport> {
        self.commit(|data| {
            let report = data
                .progress_reports
                .iter_mut()
                .find(|report| report.id == report_id)
                .ok_or(PortalError::ReportNotFound(report_id))?;
            report.apply(patch)?;
            Ok(report.clone())
        })
    }

    pub fn add_notice(
        &mut self,
        teacher_id: UserId,
        title: &str,
        content: &str,
    ) -> PortalResult<Notice> {
        if title.trim().is_empty() {
            return Err(ValidationError::BlankField("title").into());
        }
        if self.data.teacher(teacher_id).is_none() {
            return Err(PortalError::TeacherNotFound(teacher_id));
        }

        let notice = Notice {
            id: Uuid::new_v4(),
            teacher_id,
            title: title.to_string(),
            content: content.to_string(),
            created_at: self.clock.now(),
        };
        let notice = self.commit(|data| {
            data.notices.push(notice.clone());
            Ok(notice)
        })?;
        info!("event=notice_add module=service status=ok");
        Ok(notice)
    }

    /// Notices posted by `teacher_id`, newest first.
    pub fn get_notices_for_students(&self, teacher_id: UserId) -> Vec<&Notice> {
        let mut notices: Vec<&Notice> = self
            .data
            .notices
            .iter()
            .filter(|notice| notice.teacher_id == teacher_id)
            .collect();
        notices.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        notices
    }

    /// Notices a student sees: those of their assigned teacher.
    pub fn notices_for_student(&self, student_id: UserId) -> PortalResult<Vec<&Notice>> {
        let student = self
            .data
            .student(student_id)
            .ok_or(PortalError::StudentNotFound(student_id))?;
        Ok(student
            .assigned_teacher
            .map(|teacher_id| self.get_notices_for_students(teacher_id))
            .unwrap_or_default())
    }

    pub fn student_report_card(&self, student_id: UserId) -> PortalResult<ReportCard> {
        let student = self
            .data
            .student(student_id)
            .ok_or(PortalError::StudentNotFound(student_id))?;
        let teacher_name = student
            .assigned_teacher
            .and_then(|teacher_id| self.data.teacher(teacher_id))
            .map(|teacher| teacher.user.display_name().to_string());

        Ok(ReportCard {
            student: student.clone(),
            teacher_name,
            reports: self
                .get_progress_reports_for_student(student_id)
                .into_iter()
                .cloned()
                .collect(),
            generated_at: self.clock.now(),
        })
    }
}
