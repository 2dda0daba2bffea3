//! School-wide settings stored inside the portal document.

use crate::model::ValidationError;
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SCHOOL_NAME: &str = "Demo School";
pub const DEFAULT_GRADING_SCALE: &str = "A-F";
pub const DEFAULT_MAX_STUDENTS_PER_TEACHER: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub school_name: String,
    pub academic_year: i32,
    pub grading_scale: String,
    /// Capacity given to newly registered teachers.
    pub max_students_per_teacher: u32,
}

impl Settings {
    pub fn for_year(academic_year: i32) -> Self {
        Self {
            school_name: DEFAULT_SCHOOL_NAME.to_string(),
            academic_year,
            grading_scale: DEFAULT_GRADING_SCALE.to_string(),
            max_students_per_teacher: DEFAULT_MAX_STUDENTS_PER_TEACHER,
        }
    }

    /// Shallow merge of `patch`, validated before anything is written.
    pub fn apply(&mut self, patch: SettingsPatch) -> Result<(), ValidationError> {
        if let Some(name) = patch.school_name.as_deref() {
            if name.trim().is_empty() {
                return Err(ValidationError::BlankField("schoolName"));
            }
        }
        if let Some(scale) = patch.grading_scale.as_deref() {
            if scale.trim().is_empty() {
                return Err(ValidationError::BlankField("gradingScale"));
            }
        }
        if patch.max_students_per_teacher == Some(0) {
            return Err(ValidationError::ZeroCapacity);
        }

        if let Some(name) = patch.school_name {
            self.school_name = name;
        }
        if let Some(year) = patch.academic_year {
            self.academic_year = year;
        }
        if let Some(scale) = patch.grading_scale {
            self.grading_scale = scale;
        }
        if let Some(capacity) = patch.max_students_per_teacher {
            self.max_students_per_teacher = capacity;
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::for_year(Utc::now().year())
    }
}

/// Partial settings update; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default)]
    pub school_name: Option<String>,
    #[serde(default)]
    pub academic_year: Option<i32>,
    #[serde(default)]
    pub grading_scale: Option<String>,
    #[serde(default)]
    pub max_students_per_teacher: Option<u32>,
}
