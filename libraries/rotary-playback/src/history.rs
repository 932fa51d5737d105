//! Playback history
//!
//! Bounded history of played entries for "previous" navigation. Entries
//! pushed out of the history are handed back to the caller, which owns
//! releasing them.

use crate::resources::ResourceBundle;
use std::collections::VecDeque;

/// Default number of entries kept for "previous"
pub const DEFAULT_HISTORY_SIZE: usize = 10;

/// Playback history with bounded size
///
/// Most recent entry at the back. Pushing onto a full history evicts the
/// oldest entry.
#[derive(Debug)]
pub struct History {
    entries: VecDeque<ResourceBundle>,
    max_size: usize,
}

impl History {
    /// Create new history with specified maximum size
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    /// Add entry to history
    ///
    /// Returns the evicted entry, if any. With a maximum size of zero the
    /// pushed entry itself is returned.
    #[must_use = "evicted entries must be released"]
    pub fn push(&mut self, entry: ResourceBundle) -> Option<ResourceBundle> {
        if self.max_size == 0 {
            return Some(entry);
        }
        let evicted = if self.entries.len() >= self.max_size {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    /// Most recent entry (without removing)
    pub fn peek(&self) -> Option<&ResourceBundle> {
        self.entries.back()
    }

    /// Pop most recent entry for "previous"
    pub fn pop(&mut self) -> Option<ResourceBundle> {
        self.entries.pop_back()
    }

    /// All entries, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &ResourceBundle> {
        self.entries.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut ResourceBundle> {
        self.entries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Take every entry out of the history
    pub fn drain(&mut self) -> Vec<ResourceBundle> {
        self.entries.drain(..).collect()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Set maximum history size
    ///
    /// If the new size is smaller than the current length, the oldest
    /// entries are returned for release.
    #[must_use = "evicted entries must be released"]
    pub fn set_max_size(&mut self, max_size: usize) -> Vec<ResourceBundle> {
        self.max_size = max_size;

        let excess = self.entries.len().saturating_sub(max_size);
        self.entries.drain(..excess).collect()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SIZE)
    }
}
