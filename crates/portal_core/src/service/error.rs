//! Error type shared by every data-manager operation.

use crate::model::{RecordId, UserId, ValidationError};
use crate::repo::kv_repo::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type PortalResult<T> = Result<T, PortalError>;

#[derive(Debug)]
pub enum PortalError {
    /// A record failed its own invariants.
    Validation(ValidationError),
    /// Key-value persistence failed.
    Store(StoreError),
    /// The portal document could not be encoded.
    Serialization(serde_json::Error),
    /// A stored or imported document is not a valid portal graph.
    InvalidDocument(String),
    /// Another account already uses this username.
    UsernameTaken(String),
    /// Username/password/role triple did not match any account.
    InvalidCredentials,
    UserNotFound(UserId),
    StudentNotFound(UserId),
    TeacherNotFound(UserId),
    /// Teacher already holds `max_students` students.
    TeacherAtCapacity {
        teacher_id: UserId,
        max_students: u32,
    },
    ReportNotFound(RecordId),
    MessageNotFound(RecordId),
}

impl Display for PortalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "failed to encode portal document: {err}"),
            Self::InvalidDocument(details) => write!(f, "invalid portal document: {details}"),
            Self::UsernameTaken(username) => write!(f, "username already exists: `{username}`"),
            Self::InvalidCredentials => write!(f, "invalid credentials"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::StudentNotFound(id) => write!(f, "student not found: {id}"),
            Self::TeacherNotFound(id) => write!(f, "teacher not found: {id}"),
            Self::TeacherAtCapacity {
                teacher_id,
                max_students,
            } => write!(
                f,
                "teacher {teacher_id} already has the maximum of {max_students} students"
            ),
            Self::ReportNotFound(id) => write!(f, "progress report not found: {id}"),
            Self::MessageNotFound(id) => write!(f, "message not found: {id}"),
        }
    }
}

impl Error for PortalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for PortalError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for PortalError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}
