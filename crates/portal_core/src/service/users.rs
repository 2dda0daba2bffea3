//! Account registration, lookup and profile maintenance.
//!
//! # Invariants
//! - Usernames are unique (exact match).
//! - Registering a student or teacher also creates the role record with the
//!   same id; profile edits are mirrored onto the `users` entry.
//! - Completing a student profile triggers automatic teacher assignment.

use crate::clock::Clock;
use crate::model::user::{
    format_student_number, format_teacher_number, Profile, Role, StudentRecord, TeacherRecord,
    User,
};
use crate::model::portal::PortalData;
use crate::model::{UserId, ValidationError};
use crate::repo::kv_repo::KeyValueStore;
use crate::service::data_manager::DataManager;
use crate::service::error::{PortalError, PortalResult};
use chrono::Datelike;
use log::info;
use uuid::Uuid;

impl<S: KeyValueStore, C: Clock> DataManager<S, C> {
    /// Registers a new account.
    ///
    /// # Errors
    /// - `Validation` for a malformed username, empty password or bad email.
    /// - `UsernameTaken` when the username is already registered.
    pub fn add_user(
        &mut self,
        username: &str,
        password: &str,
        role: Role,
        profile: Profile,
    ) -> PortalResult<User> {
        let now = self.clock.now();
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password: password.to_string(),
            role,
            profile,
            created_at: now,
        };
        user.validate()?;
        if self.data.users.iter().any(|existing| existing.username == username) {
            return Err(PortalError::UsernameTaken(username.to_string()));
        }

        let user = self.commit(|data| {
            data.users.push(user.clone());
            match role {
                Role::Student => {
                    let student_id = format_student_number(now.year(), data.students.len() + 1);
                    data.students.push(StudentRecord {
                        user: user.clone(),
                        student_id,
                        assigned_teacher: None,
                        is_profile_complete: false,
                    });
                }
                Role::Teacher => {
                    let teacher_id = format_teacher_number(data.teachers.len() + 1);
                    data.teachers.push(TeacherRecord {
                        user: user.clone(),
                        teacher_id,
                        is_profile_complete: false,
                        max_students: data.settings.max_students_per_teacher,
                    });
                }
                Role::Admin => {}
            }
            Ok(user)
        })?;
        info!("event=user_add module=service status=ok role={}", role);
        Ok(user)
    }

    /// Plaintext username/password/role match.
    pub fn authenticate_user(&self, username: &str, password: &str, role: Role) -> Option<&User> {
        self.data.users.iter().find(|user| {
            user.username == username && user.password == password && user.role == role
        })
    }

    pub fn get_user_by_id(&self, user_id: UserId) -> Option<&User> {
        self.data.user(user_id)
    }

    pub fn get_student_by_user_id(&self, user_id: UserId) -> Option<&StudentRecord> {
        self.data.student(user_id)
    }

    pub fn get_teacher_by_user_id(&self, user_id: UserId) -> Option<&TeacherRecord> {
        self.data.teacher(user_id)
    }

    pub fn get_all_students(&self) -> &[StudentRecord] {
        &self.data.students
    }

    pub fn get_all_teachers(&self) -> &[TeacherRecord] {
        &self.data.teachers
    }

    /// Merges `patch` into the student's profile and marks it complete.
    ///
    /// An unassigned student is handed to the least-loaded teacher with
    /// spare capacity, if there is one.
    pub fn update_student_profile(
        &mut self,
        user_id: UserId,
        patch: Profile,
    ) -> PortalResult<StudentRecord> {
        let (merged, picked) = {
            let student = self
                .data
                .student(user_id)
                .ok_or(PortalError::StudentNotFound(user_id))?;
            let merged = merged_profile(&student.user.profile, patch)?;
            let picked = match student.assigned_teacher {
                Some(_) => None,
                None => self.pick_teacher_for_new_student(),
            };
            (merged, picked)
        };

        let updated = self.commit(|data| {
            let student = data
                .students
                .iter_mut()
                .find(|student| student.id() == user_id)
                .ok_or(PortalError::StudentNotFound(user_id))?;
            student.user.profile = merged.clone();
            student.is_profile_complete = true;
            if let Some(teacher_id) = picked {
                student.assigned_teacher = Some(teacher_id);
            }
            let updated = student.clone();
            mirror_profile(data, user_id, merged);
            Ok(updated)
        })?;
        info!(
            "event=profile_update module=service status=ok role=student auto_assigned={}",
            picked.is_some()
        );
        Ok(updated)
    }

    /// Merges `patch` into the teacher's profile and marks it complete.
    pub fn update_teacher_profile(
        &mut self,
        user_id: UserId,
        patch: Profile,
    ) -> PortalResult<TeacherRecord> {
        let updated = self.commit(|data| {
            let teacher = data
                .teachers
                .iter_mut()
                .find(|teacher| teacher.id() == user_id)
                .ok_or(PortalError::TeacherNotFound(user_id))?;
            let merged = merged_profile(&teacher.user.profile, patch)?;
            teacher.user.profile = merged.clone();
            teacher.is_profile_complete = true;
            let updated = teacher.clone();
            mirror_profile(data, user_id, merged);
            Ok(updated)
        })?;
        info!("event=profile_update module=service status=ok role=teacher");
        Ok(updated)
    }

    /// Changes how many students a teacher may hold.
    ///
    /// Lowering capacity below the current count keeps existing students;
    /// it only blocks new assignments.
    pub fn set_teacher_capacity(
        &mut self,
        teacher_id: UserId,
        max_students: u32,
    ) -> PortalResult<TeacherRecord> {
        if max_students == 0 {
            return Err(ValidationError::ZeroCapacity.into());
        }
        self.commit(|data| {
            let teacher = data
                .teachers
                .iter_mut()
                .find(|teacher| teacher.id() == teacher_id)
                .ok_or(PortalError::TeacherNotFound(teacher_id))?;
            teacher.max_students = max_students;
            Ok(teacher.clone())
        })
    }
}

fn mirror_profile(data: &mut PortalData, user_id: UserId, profile: Profile) {
    if let Some(user) = data.users.iter_mut().find(|user| user.id == user_id) {
        user.profile = profile;
    }
}

fn merged_profile(current: &Profile, patch: Profile) -> Result<Profile, ValidationError> {
    let mut merged = current.clone();
    merged.merge(patch);
    merged.validate()?;
    Ok(merged)
}
