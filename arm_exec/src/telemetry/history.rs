//! Bounded signal histories

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use std::collections::VecDeque;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A labelled value in a history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub label: String,
    pub value: f64,
}

/// A first in first out buffer of the latest values of a signal.
///
/// Once `capacity` entries are held, pushing a new entry evicts the oldest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct History {
    capacity: usize,
    entries: VecDeque<HistoryEntry>,
}

/// Histories of a single joint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JointHistory {
    /// Units: degrees
    pub position_deg: History,

    /// Units: rpm
    pub velocity_rpm: History,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, label: &str, value: f64) {
        if self.capacity == 0 {
            return;
        }

        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }

        self.entries.push_back(HistoryEntry {
            label: label.to_string(),
            value,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }
}

impl JointHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            position_deg: History::new(capacity),
            velocity_rpm: History::new(capacity),
        }
    }
}
