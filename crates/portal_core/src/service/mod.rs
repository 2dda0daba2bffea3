//! Data-manager use-cases.
//!
//! # Responsibility
//! - Own the portal document and its save-after-every-write discipline.
//! - Expose one synchronous method per portal operation.
//! - Keep callers decoupled from storage details.

pub mod analytics;
pub mod assignment;
pub mod attendance;
pub mod data_manager;
pub mod error;
pub mod events;
pub mod grades;
pub mod messages;
pub mod reports;
pub mod session;
pub mod users;
