//! Calculation history
//!
//! Newest entries first, bounded, and never written to disk.

use chrono::Local;
use serde::Serialize;
use std::collections::VecDeque;

/// Clock format used for entry timestamps, e.g. `3:07:09 PM`
pub const TIMESTAMP_FORMAT: &str = "%-I:%M:%S %p";

/// A single entry in the calculation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// The expression that was evaluated
    pub expression: String,
    /// The display text of the result
    pub result: String,
    /// Local wall-clock time of the calculation
    pub timestamp: String,
}

impl HistoryEntry {
    /// Creates a new history entry stamped with the local time
    #[must_use]
    pub fn new(expression: impl Into<String>, result: impl Into<String>) -> Self {
        Self::with_timestamp(
            expression,
            result,
            Local::now().format(TIMESTAMP_FORMAT).to_string(),
        )
    }

    /// Creates a history entry with a specific timestamp (for testing)
    #[must_use]
    pub fn with_timestamp(
        expression: impl Into<String>,
        result: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            expression: expression.into(),
            result: result.into(),
            timestamp: timestamp.into(),
        }
    }

    /// Returns a formatted display string
    #[must_use]
    pub fn display(&self) -> String {
        format!("{} = {}", self.expression, self.result)
    }
}

/// Calculator history log
///
/// Bounded queue, newest entry at index 0. Recording past capacity drops
/// the oldest entry.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    max_entries: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// Default maximum history size
    pub const DEFAULT_MAX_ENTRIES: usize = 20;

    /// Creates a new history with default capacity
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_MAX_ENTRIES)
    }

    /// Creates a history with custom maximum size (at least one entry)
    #[must_use]
    pub fn with_capacity(max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            entries: VecDeque::with_capacity(max_entries),
            max_entries,
        }
    }

    /// Adds an entry as the newest
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.max_entries);
    }

    /// Records a calculation stamped with the local time
    pub fn record(&mut self, expression: &str, result: &str) {
        self.push(HistoryEntry::new(expression, result));
    }

    /// Returns the number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the history is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the maximum number of entries
    #[must_use]
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Returns an iterator over the entries (newest first)
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Returns the most recent entry
    #[must_use]
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    /// Returns the entry at the given index (0 = newest)
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    /// Serializes the history to JSON, newest first
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.entries)
    }

    /// Exports history to a formatted string, one entry per line
    #[must_use]
    pub fn export_formatted(&self) -> String {
        self.entries
            .iter()
            .map(HistoryEntry::display)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
