//! Undo/redo stacks.
//!
//! Stacks hold [`HistoryEntry`] values that reference tasks by arena handle,
//! so the same task may sit in both stacks at once without aliasing.

use crate::task::{TaskKey, TaskSnapshot};

/// One undoable action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEntry {
    /// A task was added to (or re-added to) its owner.
    Added { key: TaskKey },
    /// A task was edited; `snapshot` is the state to restore on undo.
    Edited { key: TaskKey, snapshot: TaskSnapshot },
}

impl HistoryEntry {
    pub fn key(&self) -> TaskKey {
        match self {
            HistoryEntry::Added { key } | HistoryEntry::Edited { key, .. } => *key,
        }
    }
}

/// LIFO stack of history entries.
#[derive(Debug, Default, Clone)]
pub struct HistoryStack {
    entries: Vec<HistoryEntry>,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn pop(&mut self) -> Option<HistoryEntry> {
        self.entries.pop()
    }

    pub fn peek(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// Discard the whole chain. Returns how many entries were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries from top to bottom.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().rev()
    }
}
