//! Direct messages between users.

use crate::model::{RecordId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    #[default]
    General,
    Urgent,
    Announcement,
}

impl FromStr for MessageType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "general" => Ok(Self::General),
            "urgent" => Ok(Self::Urgent),
            "announcement" => Ok(Self::Announcement),
            other => Err(format!(
                "unknown message type `{other}`; expected general|urgent|announcement"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: RecordId,
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    pub subject: String,
    pub content: String,
    #[serde(default)]
    pub message_type: MessageType,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Whether `user_id` sent or received this message.
    pub fn involves(&self, user_id: UserId) -> bool {
        self.from_user_id == user_id || self.to_user_id == user_id
    }

    /// Case-insensitive match on subject or body. `needle` must be lowercase.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.subject.to_lowercase().contains(needle) || self.content.to_lowercase().contains(needle)
    }
}
