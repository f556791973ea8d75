//! Conversation history persistence.
//!
//! Single source of truth for conversation memory and the export, search,
//! and ranking features built on it.

mod store;

pub use store::{HistoryStore, Interaction, RankingEntry};
