//! In-memory search over the portal document.

pub mod portal_search;
