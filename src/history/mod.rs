//! File-backed, newest-first log of every request sent.

pub mod record;
pub mod store;

pub use record::{HistoryRecord, RecordMode};
pub use store::{HistoryEntry, HistoryStore, ListQuery, Listing};
