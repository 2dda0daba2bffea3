//! Sign-in session kept alongside the portal document.
//!
//! # Invariants
//! - The session is persisted under `currentUser` / `currentRole` and
//!   survives reopening the portal. Portals under a non-default storage key
//!   prefix both keys with `<storage_key>.` so their sessions stay apart.
//! - Only the user id and role are persisted, never the password.
//! - A persisted session whose user no longer exists is discarded.

use crate::clock::Clock;
use crate::model::user::{Role, User};
use crate::model::UserId;
use crate::repo::kv_repo::KeyValueStore;
use crate::service::data_manager::{DataManager, DEFAULT_STORAGE_KEY};
use crate::service::error::{PortalError, PortalResult};
use log::{info, warn};
use uuid::Uuid;

pub const SESSION_USER_KEY: &str = "currentUser";
pub const SESSION_ROLE_KEY: &str = "currentRole";

/// Signed-in user and the dashboard they entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub role: Role,
}

impl<S: KeyValueStore, C: Clock> DataManager<S, C> {
    /// Authenticates and persists the session.
    pub fn login(&mut self, username: &str, password: &str, role: Role) -> PortalResult<User> {
        let user = match self.authenticate_user(username, password, role) {
            Some(user) => user.clone(),
            None => {
                warn!(
                    "event=login module=service status=error role={} error_code=invalid_credentials",
                    role
                );
                return Err(PortalError::InvalidCredentials);
            }
        };
        self.start_session(Session {
            user_id: user.id,
            role,
        })?;
        info!("event=login module=service status=ok role={}", role);
        Ok(user)
    }

    /// Registers a new account and signs it in.
    pub fn sign_up(&mut self, username: &str, password: &str, role: Role) -> PortalResult<User> {
        let user = self.add_user(username, password, role, Default::default())?;
        self.start_session(Session {
            user_id: user.id,
            role,
        })?;
        Ok(user)
    }

    /// Clears the in-memory and persisted session.
    pub fn logout(&mut self) -> PortalResult<()> {
        self.session = None;
        let (user_key, role_key) = self.session_keys();
        self.store.remove_item(&user_key)?;
        self.store.remove_item(&role_key)?;
        Ok(())
    }

    /// Reloads the persisted session, discarding it when it no longer
    /// resolves to a user with that role.
    pub fn restore_session(&mut self) -> PortalResult<Option<Session>> {
        let (user_key, role_key) = self.session_keys();
        let user_text = self.store.get_item(&user_key)?;
        let role_text = self.store.get_item(&role_key)?;
        let (Some(user_text), Some(role_text)) = (user_text, role_text) else {
            self.session = None;
            return Ok(None);
        };

        let restored = match (Uuid::parse_str(user_text.trim()), role_text.parse::<Role>()) {
            (Ok(user_id), Ok(role)) => self
                .data
                .user(user_id)
                .filter(|user| user.role == role)
                .map(|_| Session { user_id, role }),
            _ => None,
        };

        match restored {
            Some(session) => {
                self.session = Some(session);
                Ok(Some(session))
            }
            None => {
                warn!("event=session_restore module=service status=error error_code=stale_session");
                self.logout()?;
                Ok(None)
            }
        }
    }

    pub fn current_session(&self) -> Option<Session> {
        self.session
    }

    /// Signed-in user, if any.
    pub fn current_user(&self) -> Option<&User> {
        self.session
            .and_then(|session| self.data.user(session.user_id))
    }

    pub(crate) fn current_user_id(&self) -> Option<UserId> {
        self.session.map(|session| session.user_id)
    }

    fn start_session(&mut self, session: Session) -> PortalResult<()> {
        let (user_key, role_key) = self.session_keys();
        self.store
            .set_item(&user_key, &session.user_id.to_string())?;
        self.store.set_item(&role_key, session.role.as_str())?;
        self.session = Some(session);
        Ok(())
    }

    /// Store keys holding this portal's session.
    pub fn session_keys(&self) -> (String, String) {
        if self.storage_key == DEFAULT_STORAGE_KEY {
            return (SESSION_USER_KEY.to_string(), SESSION_ROLE_KEY.to_string());
        }
        (
            format!("{}.{SESSION_USER_KEY}", self.storage_key),
            format!("{}.{SESSION_ROLE_KEY}", self.storage_key),
        )
    }
}
