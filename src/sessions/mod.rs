//! Conversation-history persistence.
//!
//! The store is a collaborator, not part of the retrieval pipeline: the core
//! produces and consumes plain message lists, agnostic to how they are kept.

pub mod store;
pub mod types;

pub use store::{SessionStore, SqliteSessionStore};
pub use types::{ChatMessage, MessageRole, Session};
