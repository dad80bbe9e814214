//! Convenience prelude for embedding the history store.

pub use crate::error::{Result, RhttpError};
pub use crate::history::{HistoryEntry, HistoryRecord, HistoryStore, ListQuery, Listing, RecordMode};
pub use crate::http::{execute, RequestRecord, ResponseRecord};
