//! In-memory conversation history.
//!
//! Sessions live for the process lifetime; there is no eviction and no
//! persistence.

pub mod store;

pub use store::{Session, SessionHistoryStore};
