//! Calendar events.

use crate::clock::Clock;
use crate::model::event::{CalendarEvent, EventType};
use crate::model::UserId;
use crate::repo::kv_repo::KeyValueStore;
use crate::service::data_manager::DataManager;
use crate::service::error::{PortalError, PortalResult};
use chrono::{NaiveDate, NaiveDateTime};
use log::info;
use uuid::Uuid;

impl<S: KeyValueStore, C: Clock> DataManager<S, C> {
    /// Creates an event spanning `start..=end`.
    ///
    /// # Errors
    /// - `Validation` for a blank title or `end` before `start`.
    /// - `UserNotFound` for an unknown creator.
    pub fn create_event(
        &mut self,
        created_by: UserId,
        title: &str,
        description: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        event_type: EventType,
    ) -> PortalResult<CalendarEvent> {
        let event = CalendarEvent {
            id: Uuid::new_v4(),
            created_by,
            title: title.to_string(),
            description: description.to_string(),
            start_date: start,
            end_date: end,
            event_type,
            participants: Vec::new(),
            created_at: self.clock.now(),
        };
        event.validate()?;
        if self.data.user(created_by).is_none() {
            return Err(PortalError::UserNotFound(created_by));
        }

        let event = self.commit(|data| {
            data.events.push(event.clone());
            Ok(event)
        })?;
        info!("event=event_create module=service status=ok type={:?}", event_type);
        Ok(event)
    }

    /// Events whose calendar days include `date`, earliest start first.
    pub fn get_events_for_date(&self, date: NaiveDate) -> Vec<&CalendarEvent> {
        let mut events: Vec<&CalendarEvent> = self
            .data
            .events
            .iter()
            .filter(|event| event.covers(date))
            .collect();
        events.sort_by_key(|event| event.start_date);
        events
    }
}
