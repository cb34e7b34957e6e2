//! Task records.
//!
//! A [`Task`] is the mutable entity shared by every index. The task index
//! owns all tasks in an arena and hands out [`TaskKey`] handles; indexes and
//! the undo/redo stacks refer to tasks only through those handles.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Caller-assigned task identifier. Uniqueness is a caller convention.
pub type TaskId = u32;

/// Caller-assigned user identifier.
pub type UserId = u32;

pub const MIN_PRIORITY: u8 = 1;
pub const MAX_PRIORITY: u8 = 10;

/// Task priority in `[1, 10]`, higher is more urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Priority(u8);

impl Priority {
    pub fn new(value: u8) -> Result<Self> {
        if (MIN_PRIORITY..=MAX_PRIORITY).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidPriority(i64::from(value)))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Priority {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| Error::InvalidArgument(format!("priority must be a number: {s}")))?;
        u8::try_from(value)
            .map_err(|_| Error::InvalidPriority(value))
            .and_then(Priority::new)
    }
}

/// Stable handle to a task slot in the task index arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskKey(pub(crate) usize);

impl TaskKey {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

impl Task {
    pub fn new(id: TaskId, name: impl Into<String>, priority: Priority) -> Self {
        Self {
            id,
            name: name.into(),
            priority,
            due_date: None,
        }
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Deep copy of the editable fields.
    pub fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot {
            id: self.id,
            name: self.name.clone(),
            priority: self.priority,
            due_date: self.due_date,
        }
    }

    pub(crate) fn restore(&mut self, snapshot: &TaskSnapshot) {
        self.id = snapshot.id;
        self.name = snapshot.name.clone();
        self.priority = snapshot.priority;
        self.due_date = snapshot.due_date;
    }

    /// True when the due date lies within `[start, end]`.
    pub fn due_within(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.due_date
            .is_some_and(|due| due >= start && due <= end)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "::ID::{}::Name::{}::Priority::{}",
            self.id, self.name, self.priority
        )?;
        if let Some(due) = self.due_date {
            write!(f, "::DueDate::{due}")?;
        }
        Ok(())
    }
}

/// Pre-edit copy of a task, pushed onto the undo stack by edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub id: TaskId,
    pub name: String,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn priority_rejects_out_of_range() {
        assert!(Priority::new(0).is_err());
        assert!(Priority::new(11).is_err());
        assert_eq!(Priority::new(10).unwrap().get(), 10);
        assert!(matches!(
            "300".parse::<Priority>(),
            Err(Error::InvalidPriority(300))
        ));
        assert!(matches!(
            "-1".parse::<Priority>(),
            Err(Error::InvalidPriority(-1))
        ));
    }

    #[test]
    fn display_matches_details_format() {
        let task = Task::new(101, "Design", Priority::new(8).unwrap()).with_due_date(date(2025, 5, 15));
        assert_eq!(
            task.to_string(),
            "::ID::101::Name::Design::Priority::8::DueDate::2025-05-15"
        );

        let undated = Task::new(7, "Triage", Priority::new(3).unwrap());
        assert_eq!(undated.to_string(), "::ID::7::Name::Triage::Priority::3");
    }

    #[test]
    fn due_within_is_inclusive_and_skips_undated() {
        let task = Task::new(1, "a", Priority::new(1).unwrap()).with_due_date(date(2025, 5, 15));
        assert!(task.due_within(date(2025, 5, 15), date(2025, 5, 15)));
        assert!(!task.due_within(date(2025, 5, 16), date(2025, 6, 1)));

        let undated = Task::new(2, "b", Priority::new(1).unwrap());
        assert!(!undated.due_within(date(2000, 1, 1), date(2100, 1, 1)));
    }

    #[test]
    fn snapshot_restores_all_fields() {
        let mut task = Task::new(5, "Before", Priority::new(2).unwrap()).with_due_date(date(2025, 1, 1));
        let snapshot = task.snapshot();
        task.name = "After".into();
        task.priority = Priority::new(9).unwrap();
        task.due_date = None;
        task.restore(&snapshot);
        assert_eq!(task.name, "Before");
        assert_eq!(task.priority.get(), 2);
        assert_eq!(task.due_date, Some(date(2025, 1, 1)));
    }

    #[test]
    fn priority_deserialization_validates() {
        let ok: Task = serde_json::from_str(r#"{"id":1,"name":"x","priority":4}"#).unwrap();
        assert_eq!(ok.priority.get(), 4);
        assert!(serde_json::from_str::<Task>(r#"{"id":1,"name":"x","priority":0}"#).is_err());
    }
}
