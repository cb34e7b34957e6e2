//! Schedule queue: FIFO of task activations.

use std::collections::VecDeque;
use std::fmt;

use serde::Serialize;

use crate::task::{TaskId, TaskKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    /// First activation, from adding the task.
    Scheduled,
    /// Re-activation after a redo.
    Rescheduled,
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scheduled => write!(f, "Scheduled"),
            Self::Rescheduled => write!(f, "Rescheduled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleEntry {
    pub id: TaskId,
    pub name: String,
    pub status: ScheduleStatus,
    #[serde(skip)]
    pub task: TaskKey,
}

#[derive(Debug, Default, Clone)]
pub struct ScheduleQueue {
    entries: VecDeque<ScheduleEntry>,
}

impl ScheduleQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(
        &mut self,
        task: TaskKey,
        id: TaskId,
        name: impl Into<String>,
        status: ScheduleStatus,
    ) {
        self.entries.push_back(ScheduleEntry {
            id,
            name: name.into(),
            status,
            task,
        });
    }

    pub fn dequeue(&mut self) -> Option<ScheduleEntry> {
        self.entries.pop_front()
    }

    pub fn peek(&self) -> Option<&ScheduleEntry> {
        self.entries.front()
    }

    pub fn back(&self) -> Option<&ScheduleEntry> {
        self.entries.back()
    }

    /// Drop every queued activation of `task`, keeping the rest in order.
    pub fn remove_task(&mut self, task: TaskKey) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.task != task);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Front to back, without consuming.
    pub fn iter(&self) -> impl Iterator<Item = &ScheduleEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order() {
        let mut queue = ScheduleQueue::new();
        queue.enqueue(TaskKey(0), 1, "Task A", ScheduleStatus::Scheduled);
        queue.enqueue(TaskKey(1), 2, "Task B", ScheduleStatus::Scheduled);

        assert_eq!(queue.peek().map(|e| e.name.as_str()), Some("Task A"));
        assert_eq!(queue.dequeue().map(|e| e.id), Some(1));
        assert_eq!(queue.peek().map(|e| e.name.as_str()), Some("Task B"));
        assert_eq!(queue.back().map(|e| e.id), Some(2));
    }

    #[test]
    fn dequeue_on_empty_is_none() {
        let mut queue = ScheduleQueue::new();
        assert!(queue.dequeue().is_none());
        assert!(queue.peek().is_none());
    }

    #[test]
    fn iter_does_not_consume() {
        let mut queue = ScheduleQueue::new();
        queue.enqueue(TaskKey(0), 1, "a", ScheduleStatus::Scheduled);
        queue.enqueue(TaskKey(1), 2, "b", ScheduleStatus::Rescheduled);
        assert_eq!(queue.iter().count(), 2);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn remove_task_keeps_relative_order() {
        let mut queue = ScheduleQueue::new();
        queue.enqueue(TaskKey(0), 1, "a", ScheduleStatus::Scheduled);
        queue.enqueue(TaskKey(1), 2, "b", ScheduleStatus::Scheduled);
        queue.enqueue(TaskKey(0), 1, "a", ScheduleStatus::Rescheduled);
        queue.enqueue(TaskKey(2), 3, "c", ScheduleStatus::Scheduled);

        assert_eq!(queue.remove_task(TaskKey(0)), 2);
        let ids: Vec<_> = queue.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn remove_task_spares_other_owners_of_the_id() {
        let mut queue = ScheduleQueue::new();
        queue.enqueue(TaskKey(0), 5, "alice-five", ScheduleStatus::Scheduled);
        queue.enqueue(TaskKey(1), 5, "bob-five", ScheduleStatus::Scheduled);

        assert_eq!(queue.remove_task(TaskKey(1)), 1);
        assert_eq!(queue.peek().map(|e| e.name.as_str()), Some("alice-five"));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn status_display() {
        assert_eq!(ScheduleStatus::Scheduled.to_string(), "Scheduled");
        assert_eq!(ScheduleStatus::Rescheduled.to_string(), "Rescheduled");
    }
}
