//! Core data layer for the school portal.
//! This crate is the single source of truth for the portal document and
//! every operation the student, teacher and admin dashboards perform on it.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::PortalConfig;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::analytics::{Activity, ActivityKind, Analytics, RankedStudent};
pub use model::attendance::{AttendanceRecord, AttendanceStats, AttendanceStatus};
pub use model::event::{parse_local_datetime, CalendarEvent, EventType};
pub use model::grade::{GradeRecord, GradeType};
pub use model::message::{Message, MessageType};
pub use model::portal::PortalData;
pub use model::report::{
    Behavior, Notice, ProgressReport, ProgressReportData, ProgressReportPatch,
};
pub use model::settings::{Settings, SettingsPatch};
pub use model::user::{Profile, Role, StudentRecord, TeacherRecord, User};
pub use model::{RecordId, UserId, ValidationError};
pub use repo::kv_repo::{KeyValueStore, SqliteKeyValueStore, StoreError, StoreResult};
pub use repo::memory_repo::MemoryKeyValueStore;
pub use service::analytics::StudentOverview;
pub use service::assignment::TeacherLoad;
pub use service::data_manager::{
    DataManager, DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME, DEFAULT_STORAGE_KEY,
};
pub use service::error::{PortalError, PortalResult};
pub use service::reports::ReportCard;
pub use service::session::Session;

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
