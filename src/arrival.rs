//! Arrival log: most-recent-first record of task activity.
//!
//! A singly-linked list with insertion at the front. Entries capture the
//! task id and the name the task had when the entry was written, plus the
//! arena key so removals never touch another task that shares the id.

use serde::Serialize;

use crate::task::{TaskId, TaskKey};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArrivalEntry {
    pub id: TaskId,
    pub name: String,
    #[serde(skip)]
    pub task: TaskKey,
}

#[derive(Debug)]
struct Node {
    entry: ArrivalEntry,
    next: Option<Box<Node>>,
}

#[derive(Debug, Default)]
pub struct ArrivalLog {
    head: Option<Box<Node>>,
    len: usize,
}

impl ArrivalLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_front(&mut self, task: TaskKey, id: TaskId, name: impl Into<String>) {
        let node = Box::new(Node {
            entry: ArrivalEntry {
                id,
                name: name.into(),
                task,
            },
            next: self.head.take(),
        });
        self.head = Some(node);
        self.len += 1;
    }

    pub fn front(&self) -> Option<&ArrivalEntry> {
        self.head.as_deref().map(|node| &node.entry)
    }

    /// Remove every entry written for `task`. Returns how many were removed.
    pub fn remove_task(&mut self, task: TaskKey) -> usize {
        self.remove_where(|entry| entry.task == task, usize::MAX)
    }

    /// Remove the most recent entry written for `task`.
    pub fn remove_latest(&mut self, task: TaskKey) -> bool {
        self.remove_where(|entry| entry.task == task, 1) == 1
    }

    fn remove_where(&mut self, mut pred: impl FnMut(&ArrivalEntry) -> bool, limit: usize) -> usize {
        let mut kept = Vec::with_capacity(self.len);
        let mut removed = 0;
        let mut cursor = self.head.take();
        while let Some(mut node) = cursor {
            cursor = node.next.take();
            if removed < limit && pred(&node.entry) {
                removed += 1;
            } else {
                kept.push(node);
            }
        }

        // Relink the survivors in their original order.
        for mut node in kept.into_iter().rev() {
            node.next = self.head.take();
            self.head = Some(node);
        }
        self.len -= removed;
        removed
    }

    /// Entries front to back, i.e. most recent first.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            next: self.head.as_deref(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}

impl Drop for ArrivalLog {
    fn drop(&mut self) {
        // Unlink iteratively so long logs don't recurse on drop.
        let mut cursor = self.head.take();
        while let Some(mut node) = cursor {
            cursor = node.next.take();
        }
    }
}

pub struct Iter<'a> {
    next: Option<&'a Node>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a ArrivalEntry;

    fn next(&mut self) -> Option<Self::Item> {
        self.next.map(|node| {
            self.next = node.next.as_deref();
            &node.entry
        })
    }
}

impl<'a> IntoIterator for &'a ArrivalLog {
    type Item = &'a ArrivalEntry;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
