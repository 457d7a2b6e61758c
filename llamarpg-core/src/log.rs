//! Bounded, oldest-first-evicting text logs.
//!
//! Used for both the per-NPC memory log and the world event log.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::types::clock_stamp;

/// Ordered log that keeps at most `capacity` lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundedLog {
    entries: VecDeque<String>,
    capacity: usize,
}

impl BoundedLog {
    /// Create an empty log. A zero capacity is treated as one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a line prefixed with the local `[HH:MM:SS]` stamp.
    /// Returns the stored line.
    pub fn push_stamped(&mut self, line: &str) -> String {
        let stamped = format!("[{}] {line}", clock_stamp());
        self.push(stamped.clone());
        stamped
    }

    /// Append a line verbatim, evicting the oldest line when full.
    pub fn push(&mut self, line: String) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(line);
    }

    /// The last `n` lines, oldest first.
    #[must_use]
    pub fn recent(&self, n: usize) -> Vec<String> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).cloned().collect()
    }

    /// Iterate all lines, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Number of stored lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of lines kept.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
