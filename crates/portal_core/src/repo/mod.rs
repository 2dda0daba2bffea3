//! Persistence layer for the portal document.
//!
//! # Responsibility
//! - Define the key-value contract the data manager saves through.
//! - Isolate SQLite details from service orchestration.
//!
//! # Invariants
//! - Stores hold opaque strings; JSON encoding belongs to the service layer.

pub mod kv_repo;
pub mod memory_repo;
