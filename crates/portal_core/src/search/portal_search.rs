//! Case-insensitive substring search over users and messages.
//!
//! # Invariants
//! - Blank queries match everything in scope.
//! - Message results are limited to the caller's own conversations.

use crate::clock::Clock;
use crate::model::message::Message;
use crate::model::portal::PortalData;
use crate::model::user::{Role, User};
use crate::model::UserId;
use crate::repo::kv_repo::KeyValueStore;
use crate::service::data_manager::DataManager;

/// Users whose username or profile name contains `query`, optionally
/// restricted to one role. Registration order is kept.
pub fn search_users<'a>(data: &'a PortalData, query: &str, role: Option<Role>) -> Vec<&'a User> {
    let needle = query.trim().to_lowercase();
    data.users
        .iter()
        .filter(|user| role.map_or(true, |role| user.role == role))
        .filter(|user| {
            user.username.to_lowercase().contains(&needle)
                || user
                    .profile
                    .name
                    .as_deref()
                    .is_some_and(|name| name.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Messages sent or received by `user_id` whose subject or content contains
/// `query`, newest first.
pub fn search_messages<'a>(data: &'a PortalData, query: &str, user_id: UserId) -> Vec<&'a Message> {
    let needle = query.trim().to_lowercase();
    let mut messages: Vec<&Message> = data
        .messages
        .iter()
        .filter(|message| message.involves(user_id))
        .filter(|message| message.matches_lowercase(&needle))
        .collect();
    messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    messages
}

impl<S: KeyValueStore, C: Clock> DataManager<S, C> {
    pub fn search_users(&self, query: &str, role: Option<Role>) -> Vec<&User> {
        search_users(self.data(), query, role)
    }

    pub fn search_messages(&self, query: &str, user_id: UserId) -> Vec<&Message> {
        search_messages(self.data(), query, user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::search_users;
    use crate::model::portal::PortalData;
    use crate::model::user::{Profile, Role, User};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn user(username: &str, name: Option<&str>, role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password: "pw".to_string(),
            role,
            profile: Profile {
                name: name.map(str::to_string),
                ..Profile::default()
            },
            created_at: Utc.with_ymd_and_hms(2026, 9, 1, 8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn matches_username_or_profile_name_ignoring_case() {
        let mut data = PortalData::empty(2026);
        data.users = vec![
            user("mrsmith", Some("John Smith"), Role::Teacher),
            user("alice", Some("Alice SMITHERS"), Role::Student),
            user("bob", None, Role::Student),
        ];

        let hits: Vec<&str> = search_users(&data, "Smith", None)
            .into_iter()
            .map(|user| user.username.as_str())
            .collect();
        assert_eq!(hits, vec!["mrsmith", "alice"]);

        let students: Vec<&str> = search_users(&data, "smith", Some(Role::Student))
            .into_iter()
            .map(|user| user.username.as_str())
            .collect();
        assert_eq!(students, vec!["alice"]);
    }

    #[test]
    fn blank_query_matches_whole_role() {
        let mut data = PortalData::empty(2026);
        data.users = vec![
            user("alice", None, Role::Student),
            user("root", None, Role::Admin),
        ];
        assert_eq!(search_users(&data, "  ", Some(Role::Student)).len(), 1);
        assert_eq!(search_users(&data, "", None).len(), 2);
    }
}
