//! Ranking index: max-priority ordering over live tasks.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::task::{Priority, TaskKey};

/// Heap entry. Priority is captured at insertion time; callers re-insert
/// after changing a task's priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankEntry {
    pub key: TaskKey,
    pub priority: Priority,
    seq: u64,
}

impl Ord for RankEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap on priority; among equals the earlier insertion wins.
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for RankEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Default, Clone)]
pub struct RankingIndex {
    heap: BinaryHeap<RankEntry>,
    next_seq: u64,
}

impl RankingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: TaskKey, priority: Priority) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(RankEntry { key, priority, seq });
    }

    /// Remove a single entry for `key`. Returns false if none was present.
    pub fn remove(&mut self, key: TaskKey) -> bool {
        let mut removed = false;
        self.heap.retain(|entry| {
            if !removed && entry.key == key {
                removed = true;
                return false;
            }
            true
        });
        removed
    }

    /// Remove every entry for `key`, returning how many were dropped.
    pub fn remove_all(&mut self, key: TaskKey) -> usize {
        let before = self.heap.len();
        self.heap.retain(|entry| entry.key != key);
        before - self.heap.len()
    }

    pub fn peek(&self) -> Option<&RankEntry> {
        self.heap.peek()
    }

    /// Entries highest priority first. Leaves the index untouched.
    pub fn ordered(&self) -> Vec<RankEntry> {
        let mut scratch = self.heap.clone();
        let mut out = Vec::with_capacity(scratch.len());
        while let Some(entry) = scratch.pop() {
            out.push(entry);
        }
        out
    }

    pub fn count(&self, key: TaskKey) -> usize {
        self.heap.iter().filter(|entry| entry.key == key).count()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
