//! Ordered, de-duplicated message timeline.
//!
//! Entries are kept sorted non-decreasing by `created_at` at all times;
//! insertion binary-searches the upper bound so equal timestamps keep
//! arrival order. Two entries never share an id, and no entry is a
//! duplicate (same text + sender within the window) of another.

use std::collections::HashSet;
use std::time::Duration;

use chrono::TimeDelta;
use gigloom_types::chat::{ChatMessage, MessageId};

/// Default de-duplication window.
pub const DEFAULT_DUPLICATE_WINDOW: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone)]
pub struct Timeline {
    entries: Vec<ChatMessage>,
    ids: HashSet<MessageId>,
    window: Duration,
}

impl Timeline {
    pub fn new(window: Duration) -> Self {
        Self {
            entries: Vec::new(),
            ids: HashSet::new(),
            window,
        }
    }

    pub fn entries(&self) -> &[ChatMessage] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Append a live message unless it duplicates an existing entry.
    ///
    /// Returns `true` if the message joined the timeline.
    pub fn push_live(&mut self, message: ChatMessage) -> bool {
        self.insert(message)
    }

    /// Merge a freshly fetched history page.
    ///
    /// The result is the sorted, de-duplicated union of the page and the
    /// current entries. Page entries go in first, so when a live echo and a
    /// history record describe the same message the history record (with
    /// its server id and time) is the one kept. Returns how many page
    /// entries were added.
    pub fn merge_history(&mut self, history: Vec<ChatMessage>) -> usize {
        let previous = std::mem::take(&mut self.entries);
        self.ids.clear();

        let mut added = 0;
        for message in history {
            if self.insert(message) {
                added += 1;
            }
        }

        for message in previous {
            self.insert(message);
        }
        added
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.ids.clear();
    }

    fn insert(&mut self, message: ChatMessage) -> bool {
        if self.ids.contains(&message.id) || self.has_duplicate(&message) {
            return false;
        }
        let at = self
            .entries
            .partition_point(|m| m.created_at <= message.created_at);
        self.ids.insert(message.id.clone());
        self.entries.insert(at, message);
        true
    }

    /// Scan only the entries whose timestamps fall inside the window.
    fn has_duplicate(&self, message: &ChatMessage) -> bool {
        let Ok(window) = TimeDelta::from_std(self.window) else {
            return self
                .entries
                .iter()
                .any(|m| m.is_duplicate_of(message, self.window));
        };
        let lower = message.created_at - window;
        let upper = message.created_at + window;
        let start = self.entries.partition_point(|m| m.created_at <= lower);
        let end = self.entries.partition_point(|m| m.created_at < upper);
        self.entries[start..end.max(start)]
            .iter()
            .any(|m| m.is_duplicate_of(message, self.window))
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new(DEFAULT_DUPLICATE_WINDOW)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
