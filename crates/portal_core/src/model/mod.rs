//! Typed records for the portal document.
//!
//! # Responsibility
//! - Define every record held in the persisted portal graph.
//! - Keep JSON field names stable (camelCase) so stored documents stay
//!   readable across versions.
//!
//! # Invariants
//! - Every record is identified by a UUID v4 that is never reused.
//! - Record-level invariants are checked by `validate()` before a record
//!   enters the graph.

use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod analytics;
pub mod attendance;
pub mod event;
pub mod grade;
pub mod message;
pub mod portal;
pub mod report;
pub mod settings;
pub mod user;

/// Identity of a user account; shared by the matching student/teacher record.
pub type UserId = Uuid;

/// Identity of every non-user record (reports, messages, grades, ...).
pub type RecordId = Uuid;

/// Record-level invariant violations.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A required text field is blank after trim.
    BlankField(&'static str),
    /// Username does not match the accepted character set or length.
    InvalidUsername(String),
    /// Email does not look like `local@domain`.
    InvalidEmail(String),
    /// Progress score outside `0..=100`.
    ScoreOutOfRange { field: &'static str, value: u32 },
    /// Grade maximum must be strictly positive.
    NonPositiveMaxGrade(f64),
    /// Grade must be zero or more.
    NegativeGrade(f64),
    /// Event ends before it starts.
    EventEndsBeforeStart,
    /// Teacher capacity must allow at least one student.
    ZeroCapacity,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "`{field}` must not be blank"),
            Self::InvalidUsername(value) => write!(
                f,
                "invalid username `{value}`; expected 3-32 chars of [A-Za-z0-9_.-]"
            ),
            Self::InvalidEmail(value) => write!(f, "invalid email `{value}`"),
            Self::ScoreOutOfRange { field, value } => {
                write!(f, "`{field}` score {value} is outside 0..=100")
            }
            Self::NonPositiveMaxGrade(value) => {
                write!(f, "max grade must be greater than zero, got {value}")
            }
            Self::NegativeGrade(value) => write!(f, "grade must not be negative, got {value}"),
            Self::EventEndsBeforeStart => write!(f, "event end must not be earlier than start"),
            Self::ZeroCapacity => write!(f, "teacher capacity must be at least 1"),
        }
    }
}

impl Error for ValidationError {}
