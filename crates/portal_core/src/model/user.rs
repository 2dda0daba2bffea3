//! User accounts and the role-specific student/teacher records.
//!
//! # Invariants
//! - `StudentRecord` and `TeacherRecord` share `id` with their `User`.
//! - Usernames are unique across the whole portal (enforced by the service).

use crate::model::{UserId, ValidationError};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.\-]{3,32}$").expect("valid username regex"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Dashboard a user signs in to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::Admin => "admin",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "teacher" => Ok(Self::Teacher),
            "admin" => Ok(Self::Admin),
            other => Err(format!(
                "unknown role `{other}`; expected student|teacher|admin"
            )),
        }
    }
}

/// Free-form profile attached to a user.
///
/// Known fields are typed; anything else the front end sends is kept in
/// `extra` so it survives a save/load cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Serialized as `class`.
    #[serde(rename = "class", default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Profile {
    /// Profile with only a display name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Shallow merge: every field set in `patch` overwrites this profile.
    pub fn merge(&mut self, patch: Profile) {
        let Profile {
            name,
            email,
            class_name,
            age,
            contact,
            subject,
            experience,
            extra,
        } = patch;

        overwrite(&mut self.name, name);
        overwrite(&mut self.email, email);
        overwrite(&mut self.class_name, class_name);
        overwrite(&mut self.age, age);
        overwrite(&mut self.contact, contact);
        overwrite(&mut self.subject, subject);
        overwrite(&mut self.experience, experience);
        self.extra.extend(extra);
    }

    /// Checks the fields that carry a format.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(email) = self.email.as_deref() {
            if !email.is_empty() && !EMAIL_RE.is_match(email) {
                return Err(ValidationError::InvalidEmail(email.to_string()));
            }
        }
        Ok(())
    }

    /// Display name, falling back to nothing when unset or blank.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.trim().is_empty())
    }
}

fn overwrite(slot: &mut Option<String>, value: Option<String>) {
    if value.is_some() {
        *slot = value;
    }
}

/// Login account. Passwords are compared in plaintext.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Checks username shape and profile formats.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_username(&self.username)?;
        if self.password.is_empty() {
            return Err(ValidationError::BlankField("password"));
        }
        self.profile.validate()
    }

    /// Profile name when set, else the username.
    pub fn display_name(&self) -> &str {
        self.profile.display_name().unwrap_or(&self.username)
    }
}

/// Validates a username against the accepted character set.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::BlankField("username"));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(ValidationError::InvalidUsername(username.to_string()));
    }
    Ok(())
}

/// Student projection of a `User`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    #[serde(flatten)]
    pub user: User,
    /// Human-facing number, `STU{year}{nnnn}`.
    pub student_id: String,
    pub assigned_teacher: Option<UserId>,
    pub is_profile_complete: bool,
}

impl StudentRecord {
    pub fn id(&self) -> UserId {
        self.user.id
    }
}

/// Teacher projection of a `User`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherRecord {
    #[serde(flatten)]
    pub user: User,
    /// Human-facing number, `TCH{nnn}`.
    pub teacher_id: String,
    pub is_profile_complete: bool,
    pub max_students: u32,
}

impl TeacherRecord {
    pub fn id(&self) -> UserId {
        self.user.id
    }
}

/// Formats the student number for the `count`-th student of `year`.
pub fn format_student_number(year: i32, count: usize) -> String {
    format!("STU{year}{count:04}")
}

/// Formats the teacher number for the `count`-th teacher.
pub fn format_teacher_number(count: usize) -> String {
    format!("TCH{count:03}")
}

#[cfg(test)]
mod tests {
    use super::{
        format_student_number, format_teacher_number, validate_username, Profile, Role,
    };
    use crate::model::ValidationError;
    use serde_json::json;

    #[test]
    fn merge_overwrites_only_present_fields() {
        let mut profile = Profile {
            name: Some("Ana".to_string()),
            email: Some("ana@school.com".to_string()),
            ..Profile::default()
        };
        profile.merge(Profile {
            class_name: Some("10B".to_string()),
            email: Some("ana.l@school.com".to_string()),
            ..Profile::default()
        });

        assert_eq!(profile.name.as_deref(), Some("Ana"));
        assert_eq!(profile.email.as_deref(), Some("ana.l@school.com"));
        assert_eq!(profile.class_name.as_deref(), Some("10B"));
    }

    #[test]
    fn profile_keeps_unknown_fields_and_renames_class() {
        let profile: Profile =
            serde_json::from_value(json!({"name": "Bo", "class": "9A", "locker": 12})).unwrap();
        assert_eq!(profile.class_name.as_deref(), Some("9A"));
        assert_eq!(profile.extra.get("locker"), Some(&json!(12)));

        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["class"], "9A");
        assert_eq!(value["locker"], 12);
        assert!(value.get("email").is_none());
    }

    #[test]
    fn invalid_email_is_rejected() {
        let profile = Profile {
            email: Some("not-an-email".to_string()),
            ..Profile::default()
        };
        assert!(matches!(
            profile.validate(),
            Err(ValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn username_rules() {
        assert!(validate_username("admin").is_ok());
        assert!(validate_username("j.doe-2").is_ok());
        assert_eq!(
            validate_username("   "),
            Err(ValidationError::BlankField("username"))
        );
        assert!(matches!(
            validate_username("has space"),
            Err(ValidationError::InvalidUsername(_))
        ));
    }

    #[test]
    fn record_numbers_are_zero_padded() {
        assert_eq!(format_student_number(2026, 7), "STU20260007");
        assert_eq!(format_teacher_number(12), "TCH012");
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!(" Teacher ".parse::<Role>().unwrap(), Role::Teacher);
        assert!("parent".parse::<Role>().is_err());
    }
}
