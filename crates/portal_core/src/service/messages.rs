//! Messaging between users.

use crate::clock::Clock;
use crate::model::message::{Message, MessageType};
use crate::model::user::{Role, User};
use crate::model::{RecordId, UserId, ValidationError};
use crate::repo::kv_repo::KeyValueStore;
use crate::service::data_manager::DataManager;
use crate::service::error::{PortalError, PortalResult};
use log::info;
use uuid::Uuid;

impl<S: KeyValueStore, C: Clock> DataManager<S, C> {
    pub fn send_message(
        &mut self,
        from_user_id: UserId,
        to_user_id: UserId,
        subject: &str,
        content: &str,
        message_type: MessageType,
    ) -> PortalResult<Message> {
        if subject.trim().is_empty() {
            return Err(ValidationError::BlankField("subject").into());
        }
        for user_id in [from_user_id, to_user_id] {
            if self.data.user(user_id).is_none() {
                return Err(PortalError::UserNotFound(user_id));
            }
        }

        let message = Message {
            id: Uuid::new_v4(),
            from_user_id,
            to_user_id,
            subject: subject.to_string(),
            content: content.to_string(),
            message_type,
            is_read: false,
            created_at: self.clock.now(),
        };
        let message = self.commit(|data| {
            data.messages.push(message.clone());
            Ok(message)
        })?;
        info!("event=message_send module=service status=ok type={:?}", message_type);
        Ok(message)
    }

    /// Messages sent or received by `user_id`, newest first.
    pub fn get_messages_for_user(&self, user_id: UserId) -> Vec<&Message> {
        let mut messages: Vec<&Message> = self
            .data
            .messages
            .iter()
            .filter(|message| message.involves(user_id))
            .collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        messages
    }

    /// Received messages not yet read.
    pub fn get_unread_message_count(&self, user_id: UserId) -> usize {
        self.data
            .messages
            .iter()
            .filter(|message| message.to_user_id == user_id && !message.is_read)
            .count()
    }

    pub fn mark_message_as_read(&mut self, message_id: RecordId) -> PortalResult<Message> {
        let message = self
            .data
            .messages
            .iter()
            .find(|message| message.id == message_id)
            .ok_or(PortalError::MessageNotFound(message_id))?;
        if message.is_read {
            return Ok(message.clone());
        }
        self.commit(|data| {
            let message = data
                .messages
                .iter_mut()
                .find(|message| message.id == message_id)
                .ok_or(PortalError::MessageNotFound(message_id))?;
            message.is_read = true;
            Ok(message.clone())
        })
    }

    /// Users `user_id` may write to.
    ///
    /// Students reach their assigned teacher, teachers reach their students,
    /// admins reach everyone else.
    pub fn message_recipients(&self, user_id: UserId) -> PortalResult<Vec<&User>> {
        let user = self
            .data
            .user(user_id)
            .ok_or(PortalError::UserNotFound(user_id))?;

        let recipients: Vec<&User> = match user.role {
            Role::Student => self
                .data
                .student(user_id)
                .and_then(|student| student.assigned_teacher)
                .and_then(|teacher_id| self.data.user(teacher_id))
                .into_iter()
                .collect(),
            Role::Teacher => self
                .get_students_by_teacher(user_id)
                .into_iter()
                .filter_map(|student| self.data.user(student.id()))
                .collect(),
            Role::Admin => self
                .data
                .users
                .iter()
                .filter(|other| other.id != user_id)
                .collect(),
        };
        Ok(recipients)
    }
}
