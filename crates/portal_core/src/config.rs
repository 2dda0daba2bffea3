//! Runtime configuration for hosts embedding the portal core.
//!
//! # Invariants
//! - Defaults are usable without any environment set.
//! - Environment values are trimmed; blank values fall back to defaults.

use crate::logging::default_log_level;
use crate::service::data_manager::DEFAULT_STORAGE_KEY;
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "PORTAL_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "PORTAL_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "PORTAL_LOG_DIR";
pub const ENV_STORAGE_KEY: &str = "PORTAL_STORAGE_KEY";

const DEFAULT_DB_FILE_NAME: &str = "portal.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    /// SQLite file backing the key-value store.
    pub db_path: PathBuf,
    pub log_level: String,
    /// Absolute log directory; file logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
    /// Key the whole portal document is saved under.
    pub storage_key: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl PortalConfig {
    /// Defaults overlaid with `PORTAL_*` process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overlaid with values from `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(key) = read(ENV_STORAGE_KEY) {
            config.storage_key = key;
        }
        config
    }
}
