//! Student-to-teacher assignment and teacher load balancing.
//!
//! # Invariants
//! - Automatic assignment only considers teachers with a complete profile
//!   and fewer than `max_students` students.
//! - Among candidates the fewest current students wins; ties go to the
//!   teacher registered first.
//! - No operation pushes a teacher past `max_students`.

use crate::clock::Clock;
use crate::model::portal::PortalData;
use crate::model::user::StudentRecord;
use crate::model::UserId;
use crate::repo::kv_repo::KeyValueStore;
use crate::service::data_manager::DataManager;
use crate::service::error::{PortalError, PortalResult};
use log::{info, warn};
use serde::Serialize;

/// Current load of one teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherLoad {
    pub teacher_id: UserId,
    pub name: String,
    pub is_profile_complete: bool,
    pub student_count: usize,
    pub max_students: u32,
}

impl TeacherLoad {
    pub fn has_capacity(&self) -> bool {
        self.student_count < self.max_students as usize
    }
}

impl<S: KeyValueStore, C: Clock> DataManager<S, C> {
    /// Assigns an unassigned student to the least-loaded available teacher.
    ///
    /// Returns the chosen teacher, or `None` when the student is unknown,
    /// already assigned, or no teacher has room.
    pub fn assign_student_to_teacher(&mut self, student_id: UserId) -> PortalResult<Option<UserId>> {
        match self.data.student(student_id) {
            Some(student) if student.assigned_teacher.is_none() => {}
            _ => return Ok(None),
        }

        let Some(teacher_id) = self.pick_teacher_for_new_student() else {
            warn!("event=student_assign module=service status=skipped reason=no_capacity");
            return Ok(None);
        };
        self.commit(|data| set_assigned_teacher(data, student_id, teacher_id))?;
        info!("event=student_assign module=service status=ok");
        Ok(Some(teacher_id))
    }

    /// Students currently assigned to `teacher_id`, in registration order.
    pub fn get_students_by_teacher(&self, teacher_id: UserId) -> Vec<&StudentRecord> {
        self.data
            .students
            .iter()
            .filter(|student| student.assigned_teacher == Some(teacher_id))
            .collect()
    }

    /// Students without a teacher, in registration order.
    pub fn unassigned_students(&self) -> Vec<&StudentRecord> {
        self.data
            .students
            .iter()
            .filter(|student| student.assigned_teacher.is_none())
            .collect()
    }

    /// Moves a student to `new_teacher_id`.
    ///
    /// Reassigning to the current teacher is a no-op.
    ///
    /// # Errors
    /// - `StudentNotFound` / `TeacherNotFound` for unknown ids.
    /// - `TeacherAtCapacity` when the target teacher is full.
    pub fn reassign_student(&mut self, student_id: UserId, new_teacher_id: UserId) -> PortalResult<()> {
        let current = self
            .data
            .student(student_id)
            .ok_or(PortalError::StudentNotFound(student_id))?
            .assigned_teacher;
        let max_students = self
            .data
            .teacher(new_teacher_id)
            .ok_or(PortalError::TeacherNotFound(new_teacher_id))?
            .max_students;

        if current == Some(new_teacher_id) {
            return Ok(());
        }
        if self.data.student_count_for(new_teacher_id) >= max_students as usize {
            warn!("event=student_reassign module=service status=error error_code=at_capacity");
            return Err(PortalError::TeacherAtCapacity {
                teacher_id: new_teacher_id,
                max_students,
            });
        }

        self.commit(|data| set_assigned_teacher(data, student_id, new_teacher_id))?;
        info!("event=student_reassign module=service status=ok");
        Ok(())
    }

    /// Load of every teacher, in registration order.
    pub fn teacher_loads(&self) -> Vec<TeacherLoad> {
        self.data
            .teachers
            .iter()
            .map(|teacher| TeacherLoad {
                teacher_id: teacher.id(),
                name: teacher.user.display_name().to_string(),
                is_profile_complete: teacher.is_profile_complete,
                student_count: self.data.student_count_for(teacher.id()),
                max_students: teacher.max_students,
            })
            .collect()
    }

    /// Teachers that may receive another student.
    pub fn available_teachers(&self) -> Vec<TeacherLoad> {
        self.teacher_loads()
            .into_iter()
            .filter(|load| load.is_profile_complete && load.has_capacity())
            .collect()
    }

    pub(crate) fn pick_teacher_for_new_student(&self) -> Option<UserId> {
        // min_by_key keeps the first minimum, so ties resolve by registration order.
        self.available_teachers()
            .into_iter()
            .min_by_key(|load| load.student_count)
            .map(|load| load.teacher_id)
    }
}

fn set_assigned_teacher(
    data: &mut PortalData,
    student_id: UserId,
    teacher_id: UserId,
) -> PortalResult<()> {
    let student = data
        .students
        .iter_mut()
        .find(|student| student.id() == student_id)
        .ok_or(PortalError::StudentNotFound(student_id))?;
    student.assigned_teacher = Some(teacher_id);
    Ok(())
}
