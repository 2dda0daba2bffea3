//! Portal data manager: the single owner of the portal document.
//!
//! # Responsibility
//! - Load the document from the key-value store (or start a fresh one).
//! - Seed the default admin account into an empty portal.
//! - Save the whole document after every mutation.
//! - Export, import and reset the document; read and merge settings.
//!
//! Use-case operations live in sibling modules as further `impl` blocks on
//! `DataManager` (users, assignment, reports, attendance, ...).
//!
//! # Invariants
//! - `data` is only replaced by a document that passed consistency checks.
//! - Every successful mutating call has persisted the document before
//!   returning.
//! - A mutation whose save fails leaves `data` unchanged.

use crate::clock::{Clock, SystemClock};
use crate::model::portal::PortalData;
use crate::model::settings::{Settings, SettingsPatch};
use crate::model::user::{Profile, Role};
use crate::repo::kv_repo::KeyValueStore;
use crate::service::error::{PortalError, PortalResult};
use crate::service::session::Session;
use chrono::Datelike;
use log::{error, info, warn};
use std::time::Instant;

/// Key the portal document is saved under.
pub const DEFAULT_STORAGE_KEY: &str = "studentTeacherPortal";

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
const DEFAULT_ADMIN_NAME: &str = "System Administrator";
const DEFAULT_ADMIN_EMAIL: &str = "admin@school.com";

/// In-memory portal graph bound to its backing store.
pub struct DataManager<S: KeyValueStore, C: Clock = SystemClock> {
    pub(crate) store: S,
    pub(crate) clock: C,
    pub(crate) storage_key: String,
    pub(crate) data: PortalData,
    pub(crate) session: Option<Session>,
}

impl<S: KeyValueStore> DataManager<S> {
    /// Opens the portal stored under the default key, using wall-clock time.
    pub fn open(store: S) -> PortalResult<Self> {
        Self::open_with(store, SystemClock, DEFAULT_STORAGE_KEY)
    }
}

impl<S: KeyValueStore, C: Clock> DataManager<S, C> {
    /// Opens the portal under the default key with a caller-provided clock.
    pub fn open_with_clock(store: S, clock: C) -> PortalResult<Self> {
        Self::open_with(store, clock, DEFAULT_STORAGE_KEY)
    }

    /// Opens the portal document stored under `storage_key`.
    ///
    /// # Side effects
    /// - Seeds and saves the default admin when the portal has no users.
    /// - Restores a persisted sign-in session when it still resolves.
    ///
    /// # Errors
    /// - `InvalidDocument` when the stored value is not a portal graph.
    /// - `Store` when the backing store fails.
    pub fn open_with(store: S, clock: C, storage_key: impl Into<String>) -> PortalResult<Self> {
        let started_at = Instant::now();
        let storage_key = storage_key.into();
        let data = load_document(&store, &clock, &storage_key)?;

        let mut manager = Self {
            store,
            clock,
            storage_key,
            data,
            session: None,
        };
        manager.seed_default_admin()?;
        manager.restore_session()?;

        info!(
            "event=portal_open module=service status=ok users={} duration_ms={}",
            manager.data.users.len(),
            started_at.elapsed().as_millis()
        );
        Ok(manager)
    }

    /// Read-only view of the whole document.
    pub fn data(&self) -> &PortalData {
        &self.data
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Releases the backing store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Writes the whole document to the store.
    pub fn save(&mut self) -> PortalResult<()> {
        write_document(&mut self.store, &self.storage_key, &self.data)
    }

    /// Applies `change` to a copy of the document, saves the copy, and only
    /// then makes it current.
    pub(crate) fn commit<T>(
        &mut self,
        change: impl FnOnce(&mut PortalData) -> PortalResult<T>,
    ) -> PortalResult<T> {
        let mut candidate = self.data.clone();
        let outcome = change(&mut candidate)?;
        self.replace_document(candidate)?;
        Ok(outcome)
    }

    fn replace_document(&mut self, candidate: PortalData) -> PortalResult<()> {
        write_document(&mut self.store, &self.storage_key, &candidate)?;
        self.data = candidate;
        Ok(())
    }

    /// Pretty-printed JSON backup of the whole document.
    pub fn export_data(&self) -> PortalResult<String> {
        serde_json::to_string_pretty(&self.data).map_err(PortalError::Serialization)
    }

    /// Replaces the whole document with `json` and saves it.
    ///
    /// The current document is left untouched when `json` does not parse or
    /// fails consistency checks. A session whose user vanished is dropped.
    pub fn import_data(&mut self, json: &str) -> PortalResult<()> {
        let imported: PortalData = serde_json::from_str(json).map_err(|err| {
            warn!("event=portal_import module=service status=error error_code=parse_failed");
            PortalError::InvalidDocument(err.to_string())
        })?;
        imported.check_consistency().map_err(|details| {
            warn!("event=portal_import module=service status=error error_code=inconsistent");
            PortalError::InvalidDocument(details)
        })?;

        self.replace_document(imported)?;
        if let Some(session) = self.session {
            if self.data.user(session.user_id).is_none() {
                self.logout()?;
            }
        }

        info!(
            "event=portal_import module=service status=ok users={} students={} teachers={}",
            self.data.users.len(),
            self.data.students.len(),
            self.data.teachers.len()
        );
        Ok(())
    }

    /// Resets to an empty document and signs out.
    ///
    /// The default admin is not re-seeded here; the next `open` does that.
    pub fn clear_data(&mut self) -> PortalResult<()> {
        self.replace_document(PortalData::empty(self.clock.now().year()))?;
        self.logout()?;
        warn!("event=portal_clear module=service status=ok");
        Ok(())
    }

    pub fn get_settings(&self) -> &Settings {
        &self.data.settings
    }

    /// Merges `patch` into settings and saves.
    pub fn update_settings(&mut self, patch: SettingsPatch) -> PortalResult<Settings> {
        let settings = self.commit(|data| {
            data.settings.apply(patch)?;
            Ok(data.settings.clone())
        })?;
        info!("event=settings_update module=service status=ok");
        Ok(settings)
    }

    fn seed_default_admin(&mut self) -> PortalResult<()> {
        if !self.data.users.is_empty() {
            return Ok(());
        }
        let profile = Profile {
            name: Some(DEFAULT_ADMIN_NAME.to_string()),
            email: Some(DEFAULT_ADMIN_EMAIL.to_string()),
            ..Profile::default()
        };
        self.add_user(
            DEFAULT_ADMIN_USERNAME,
            DEFAULT_ADMIN_PASSWORD,
            Role::Admin,
            profile,
        )?;
        info!("event=portal_seed module=service status=ok role=admin");
        Ok(())
    }
}

fn write_document<S: KeyValueStore>(
    store: &mut S,
    storage_key: &str,
    data: &PortalData,
) -> PortalResult<()> {
    let encoded = serde_json::to_string(data).map_err(PortalError::Serialization)?;
    if let Err(err) = store.set_item(storage_key, &encoded) {
        error!(
            "event=portal_save module=service status=error key={} error={}",
            storage_key, err
        );
        return Err(err.into());
    }
    Ok(())
}

fn load_document<S: KeyValueStore, C: Clock>(
    store: &S,
    clock: &C,
    storage_key: &str,
) -> PortalResult<PortalData> {
    match store.get_item(storage_key)? {
        Some(raw) => {
            let data: PortalData = serde_json::from_str(&raw).map_err(|err| {
                error!(
                    "event=portal_load module=service status=error key={} error_code=parse_failed",
                    storage_key
                );
                PortalError::InvalidDocument(err.to_string())
            })?;
            data.check_consistency()
                .map_err(PortalError::InvalidDocument)?;
            Ok(data)
        }
        None => {
            info!(
                "event=portal_load module=service status=ok key={} source=empty",
                storage_key
            );
            Ok(PortalData::empty(clock.now().year()))
        }
    }
}
