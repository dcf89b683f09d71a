//! Append-only activity log.
//!
//! The log is a capped ring: appending beyond [`ACTIVITY_CAPACITY`] evicts
//! the oldest entry. Entries are immutable history; there is no update or
//! delete.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// Retained entries; the 101st append drops the oldest.
pub const ACTIVITY_CAPACITY: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    BookingCreated,
    BookingUpdated,
    BookingConfirmed,
    BookingCompleted,
    BookingCancelled,
    BookingDeleted,
    InvoiceCreated,
    InvoiceUpdated,
    InvoiceSent,
    InvoicePaid,
    InvoiceCancelled,
    DataReset,
}

impl ActivityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BookingCreated => "booking_created",
            Self::BookingUpdated => "booking_updated",
            Self::BookingConfirmed => "booking_confirmed",
            Self::BookingCompleted => "booking_completed",
            Self::BookingCancelled => "booking_cancelled",
            Self::BookingDeleted => "booking_deleted",
            Self::InvoiceCreated => "invoice_created",
            Self::InvoiceUpdated => "invoice_updated",
            Self::InvoiceSent => "invoice_sent",
            Self::InvoicePaid => "invoice_paid",
            Self::InvoiceCancelled => "invoice_cancelled",
            Self::DataReset => "data_reset",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub kind: ActivityKind,
    pub description: String,
    pub related_id: Option<Uuid>,
}

/// Newest-first capped log.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from the persisted newest-first list, re-truncating in case
    /// the blob predates the current capacity.
    pub fn from_entries(entries: Vec<ActivityEntry>) -> Self {
        let mut log = Self {
            entries: VecDeque::from(entries),
        };
        log.entries.truncate(ACTIVITY_CAPACITY);
        log
    }

    /// Assign id and timestamp, prepend, evict beyond capacity.
    pub fn append(
        &mut self,
        kind: ActivityKind,
        description: String,
        related_id: Option<Uuid>,
    ) -> &ActivityEntry {
        self.entries.push_front(ActivityEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            kind,
            description,
            related_id,
        });
        self.entries.truncate(ACTIVITY_CAPACITY);
        &self.entries[0]
    }

    /// Most recent entries, newest first.
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter().take(limit)
    }

    pub fn entries(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn append_n(log: &mut ActivityLog, n: usize) {
        for i in 0..n {
            log.append(ActivityKind::BookingCreated, format!("entry {i}"), None);
        }
    }

    #[test]
    fn append_prepends_newest() {
        let mut log = ActivityLog::new();
        append_n(&mut log, 3);

        let first = log.recent(1).next().unwrap();
        assert_eq!(first.description, "entry 2");
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut log = ActivityLog::new();
        append_n(&mut log, 105);

        assert_eq!(log.len(), ACTIVITY_CAPACITY);
        let descriptions: Vec<&str> = log.entries().map(|e| e.description.as_str()).collect();
        // The five oldest are gone, the oldest survivor is entry 5.
        assert_eq!(descriptions[0], "entry 104");
        assert_eq!(descriptions[99], "entry 5");
        assert!(!descriptions.contains(&"entry 4"));
    }

    #[test]
    fn from_entries_retruncates() {
        let mut log = ActivityLog::new();
        append_n(&mut log, 20);
        let mut entries: Vec<ActivityEntry> = log.entries().cloned().collect();
        entries.extend((0..90).map(|i| ActivityEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            kind: ActivityKind::BookingDeleted,
            description: format!("old {i}"),
            related_id: None,
        }));

        let restored = ActivityLog::from_entries(entries);
        assert_eq!(restored.len(), ACTIVITY_CAPACITY);
    }
}
