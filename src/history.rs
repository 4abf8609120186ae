//! In-memory run history.
//!
//! Every processed upload appends one entry, newest first. The store is
//! process-lifetime only — history is lost on restart by design. The
//! [`RunStore`] trait is the seam for swapping in a persistent store
//! without touching request handlers.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::audit::SheetStatus;
use crate::notify::EmailStatus;

/// Bound on retained entries; older runs are dropped silently.
const DEFAULT_CAPACITY: usize = 256;

/// One processed upload.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub original_filename: String,
    pub saved_filename: String,
    pub annotated_filename: String,
    pub missing: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub email_status: EmailStatus,
    pub sheet_status: SheetStatus,
}

/// Append/list interface for processed-run records.
pub trait RunStore: Send + Sync {
    fn append(&self, entry: HistoryEntry);
    /// All retained entries, newest first.
    fn recent(&self) -> Vec<HistoryEntry>;
}

/// Bounded, mutex-guarded in-memory store.
pub struct InMemoryHistory {
    entries: Mutex<VecDeque<HistoryEntry>>,
    capacity: usize,
}

impl InMemoryHistory {
    pub fn new(capacity: usize) -> InMemoryHistory {
        InMemoryHistory {
            entries: Mutex::new(VecDeque::new()),
            capacity,
        }
    }
}

impl Default for InMemoryHistory {
    fn default() -> InMemoryHistory {
        InMemoryHistory::new(DEFAULT_CAPACITY)
    }
}

impl RunStore for InMemoryHistory {
    fn append(&self, entry: HistoryEntry) {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.push_front(entry);
        entries.truncate(self.capacity);
    }

    fn recent(&self) -> Vec<HistoryEntry> {
        let entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.iter().cloned().collect()
    }
}
