//! Task index: the orchestrator that keeps every per-task structure in sync.
//!
//! The index owns the identity registry, the task arena, the undo/redo
//! stacks and the four auxiliary indexes:
//!
//! - ranking index (priority order)
//! - arrival log (most recent activity first)
//! - schedule queue (activation order)
//! - due-date index (date order)
//!
//! Every mutation goes through a method here, and each method updates all
//! the structures keyed on the fields it touches before returning. Missing
//! users or tasks are reported as `Err` values; empty undo/redo stacks are
//! a silent no-op (`None`).

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::arrival::{ArrivalEntry, ArrivalLog};
use crate::due_date::{DueDateIndex, DueEntry, TraversalOrder};
use crate::error::{Error, Result};
use crate::history::{HistoryEntry, HistoryStack};
use crate::ranking::RankingIndex;
use crate::registry::{User, UserRegistry};
use crate::schedule::{ScheduleEntry, ScheduleQueue, ScheduleStatus};
use crate::task::{Priority, Task, TaskId, TaskKey, TaskSnapshot, UserId};

/// Behaviour switches for the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOptions {
    /// Drop an undone task's entries from the ranking index, arrival log,
    /// schedule queue and due-date index. When false, undone tasks stay
    /// listed and a later redo inserts them a second time.
    pub prune_on_undo: bool,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            prune_on_undo: true,
        }
    }
}

/// Field changes for [`TaskIndex::edit_task`]. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEdit {
    pub name: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
}

impl TaskEdit {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.priority.is_none() && self.due_date.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryKind {
    Add,
    Edit,
}

/// What an undo or redo acted on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryOutcome {
    pub kind: HistoryKind,
    pub user_id: UserId,
    /// Task state after the undo/redo was applied.
    pub task: Task,
}

/// Detached copy of a user and their tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub tasks: Vec<Task>,
}

#[derive(Debug)]
struct Slot {
    task: Task,
    owner: UserId,
}

#[derive(Debug, Default)]
pub struct TaskIndex {
    options: IndexOptions,
    registry: UserRegistry,
    slots: Vec<Slot>,
    undo: HistoryStack,
    redo: HistoryStack,
    ranking: RankingIndex,
    arrival: ArrivalLog,
    schedule: ScheduleQueue,
    due_dates: DueDateIndex,
}

impl TaskIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: IndexOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> IndexOptions {
        self.options
    }

    pub fn register_user(&mut self, id: UserId, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        self.registry.register(id, name.clone())?;
        info!(user_id = id, name = %name, "user registered");
        Ok(())
    }

    /// Assign `task` to a user and activate it in every index.
    ///
    /// Clears the redo stack. A task without a due date is left out of the
    /// due-date index.
    pub fn add_task_to_user(&mut self, user_id: UserId, task: Task) -> Result<TaskKey> {
        let user = self.registry.get_mut(user_id)?;
        let key = TaskKey(self.slots.len());
        user.push_task(key);
        self.slots.push(Slot {
            task,
            owner: user_id,
        });

        self.undo.push(HistoryEntry::Added { key });
        let dropped = self.redo.clear();
        self.activate(key, ScheduleStatus::Scheduled);

        let task = &self.slots[key.0].task;
        info!(
            user_id,
            task_id = task.id,
            priority = task.priority.get(),
            redo_dropped = dropped,
            "task added"
        );
        Ok(key)
    }

    /// Revert the most recent add or edit. `None` when there is nothing to undo.
    pub fn undo_last_task(&mut self) -> Option<HistoryOutcome> {
        let Some(entry) = self.undo.pop() else {
            debug!("undo requested on empty stack");
            return None;
        };

        let outcome = match entry {
            HistoryEntry::Added { key } => {
                let owner = self.slots[key.0].owner;
                if let Ok(user) = self.registry.get_mut(owner) {
                    user.remove_tasks_where(|k| k == key);
                }
                if self.options.prune_on_undo {
                    self.deactivate(key);
                }
                self.redo.push(HistoryEntry::Added { key });
                self.outcome(HistoryKind::Add, key)
            }
            HistoryEntry::Edited { key, snapshot } => {
                let current = self.slots[key.0].task.snapshot();
                self.apply_snapshot(key, &snapshot);
                if self.options.prune_on_undo {
                    self.arrival.remove_latest(key);
                }
                self.redo.push(HistoryEntry::Edited {
                    key,
                    snapshot: current,
                });
                self.outcome(HistoryKind::Edit, key)
            }
        };

        info!(
            user_id = outcome.user_id,
            task_id = outcome.task.id,
            kind = ?outcome.kind,
            "undo applied"
        );
        Some(outcome)
    }

    /// Re-apply the most recently undone action. `None` when there is nothing
    /// to redo.
    pub fn redo_last_task(&mut self) -> Option<HistoryOutcome> {
        let Some(entry) = self.redo.pop() else {
            debug!("redo requested on empty stack");
            return None;
        };

        let outcome = match entry {
            HistoryEntry::Added { key } => {
                let owner = self.slots[key.0].owner;
                if let Ok(user) = self.registry.get_mut(owner) {
                    user.push_task(key);
                }
                self.undo.push(HistoryEntry::Added { key });
                self.activate(key, ScheduleStatus::Rescheduled);
                self.outcome(HistoryKind::Add, key)
            }
            HistoryEntry::Edited { key, snapshot } => {
                let current = self.slots[key.0].task.snapshot();
                self.apply_snapshot(key, &snapshot);
                if self.options.prune_on_undo {
                    let task = &self.slots[key.0].task;
                    self.arrival.push_front(key, task.id, task.name.clone());
                }
                self.undo.push(HistoryEntry::Edited {
                    key,
                    snapshot: current,
                });
                self.outcome(HistoryKind::Edit, key)
            }
        };

        info!(
            user_id = outcome.user_id,
            task_id = outcome.task.id,
            kind = ?outcome.kind,
            "redo applied"
        );
        Some(outcome)
    }

    /// Change any of a task's name, priority and due date.
    ///
    /// The pre-edit state is pushed onto the undo stack and the redo stack is
    /// cleared, even when `edit` changes nothing.
    pub fn edit_task(&mut self, user_id: UserId, task_id: TaskId, edit: TaskEdit) -> Result<()> {
        let key = self.lookup(user_id, task_id)?;

        let snapshot = self.slots[key.0].task.snapshot();
        self.undo.push(HistoryEntry::Edited { key, snapshot });
        self.redo.clear();

        if let Some(name) = edit.name {
            self.due_dates.remove_task(key);
            let task = &mut self.slots[key.0].task;
            task.name = name;
            if let Some(date) = task.due_date {
                self.due_dates.insert_task(key, task.name.clone(), date);
            }
        }

        if let Some(priority) = edit.priority {
            self.ranking.remove(key);
            self.slots[key.0].task.priority = priority;
            self.ranking.insert(key, priority);
        }

        if let Some(date) = edit.due_date {
            self.due_dates.remove_task(key);
            let task = &mut self.slots[key.0].task;
            task.due_date = Some(date);
            self.due_dates.insert_task(key, task.name.clone(), date);
        }

        let task = &self.slots[key.0].task;
        self.arrival.push_front(key, task.id, task.name.clone());
        info!(
            user_id,
            task_id,
            priority = task.priority.get(),
            "task edited"
        );
        Ok(())
    }

    // ----- read-only views -------------------------------------------------

    pub fn user(&self, user_id: UserId) -> Result<&User> {
        self.registry.get(user_id)
    }

    /// Tasks currently assigned to a user, in assignment order.
    pub fn user_tasks(&self, user_id: UserId) -> Result<Vec<&Task>> {
        let user = self.registry.get(user_id)?;
        Ok(user.tasks().iter().map(|key| &self.slots[key.0].task).collect())
    }

    pub fn find_task(&self, user_id: UserId, task_id: TaskId) -> Result<&Task> {
        let key = self.lookup(user_id, task_id)?;
        Ok(&self.slots[key.0].task)
    }

    pub fn task(&self, key: TaskKey) -> Option<&Task> {
        self.slots.get(key.0).map(|slot| &slot.task)
    }

    /// Ranking index drained highest priority first, without mutating it.
    pub fn ranked(&self) -> Vec<&Task> {
        self.ranking
            .ordered()
            .into_iter()
            .map(|entry| &self.slots[entry.key.0].task)
            .collect()
    }

    pub fn history(&self) -> impl Iterator<Item = &ArrivalEntry> {
        self.arrival.iter()
    }

    pub fn scheduled(&self) -> impl Iterator<Item = &ScheduleEntry> {
        self.schedule.iter()
    }

    pub fn next_scheduled(&self) -> Option<&ScheduleEntry> {
        self.schedule.peek()
    }

    pub fn due_dates(&self, order: TraversalOrder) -> Vec<&DueEntry> {
        self.due_dates.traverse(order)
    }

    pub fn find_due(&self, name: &str) -> Option<&DueEntry> {
        self.due_dates.find(name)
    }

    pub fn total_tasks(&self) -> usize {
        self.registry.iter().map(|user| user.tasks().len()).sum()
    }

    pub fn tasks_by_priority(&self) -> BTreeMap<Priority, usize> {
        let mut distribution = BTreeMap::new();
        for task in self.live_tasks() {
            *distribution.entry(task.priority).or_insert(0) += 1;
        }
        distribution
    }

    /// Assigned tasks due within `[start, end]`. Undated tasks are skipped.
    pub fn tasks_in_date_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<&Task> {
        self.live_tasks()
            .filter(|task| task.due_within(start, end))
            .collect()
    }

    /// Snapshot of every user and their tasks, detached from the index.
    pub fn users(&self) -> Vec<UserSummary> {
        self.registry
            .iter()
            .map(|user| UserSummary {
                id: user.id,
                name: user.name.clone(),
                tasks: user
                    .tasks()
                    .iter()
                    .map(|key| self.slots[key.0].task.clone())
                    .collect(),
            })
            .collect()
    }

    pub fn user_count(&self) -> usize {
        self.registry.len()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    pub fn ranking(&self) -> &RankingIndex {
        &self.ranking
    }

    pub fn arrival_log(&self) -> &ArrivalLog {
        &self.arrival
    }

    pub fn schedule(&self) -> &ScheduleQueue {
        &self.schedule
    }

    pub fn due_date_index(&self) -> &DueDateIndex {
        &self.due_dates
    }

    // ----- internals -------------------------------------------------------

    fn live_tasks(&self) -> impl Iterator<Item = &Task> {
        self.registry
            .iter()
            .flat_map(|user| user.tasks().iter())
            .map(|key| &self.slots[key.0].task)
    }

    fn lookup(&self, user_id: UserId, task_id: TaskId) -> Result<TaskKey> {
        let user = self.registry.get(user_id)?;
        user.tasks()
            .iter()
            .copied()
            .find(|key| self.slots[key.0].task.id == task_id)
            .ok_or(Error::TaskNotFound { user_id, task_id })
    }

    fn outcome(&self, kind: HistoryKind, key: TaskKey) -> HistoryOutcome {
        let slot = &self.slots[key.0];
        HistoryOutcome {
            kind,
            user_id: slot.owner,
            task: slot.task.clone(),
        }
    }

    /// Insert a task into the four auxiliary indexes.
    fn activate(&mut self, key: TaskKey, status: ScheduleStatus) {
        let task = &self.slots[key.0].task;
        self.arrival.push_front(key, task.id, task.name.clone());
        self.ranking.insert(key, task.priority);
        self.schedule.enqueue(key, task.id, task.name.clone(), status);
        if let Some(date) = task.due_date {
            self.due_dates.insert_task(key, task.name.clone(), date);
        }
    }

    /// Remove every entry for a task from the four auxiliary indexes.
    fn deactivate(&mut self, key: TaskKey) {
        let task_id = self.slots[key.0].task.id;
        let ranked = self.ranking.remove_all(key);
        let logged = self.arrival.remove_task(key);
        let queued = self.schedule.remove_task(key);
        let dated = self.due_dates.remove_task_all(key);
        debug!(task_id, ranked, logged, queued, dated, "task deactivated");
    }

    /// Overwrite a task with `target`, moving it within the ranking and
    /// due-date indexes when the keyed fields change.
    fn apply_snapshot(&mut self, key: TaskKey, target: &TaskSnapshot) {
        let task = &self.slots[key.0].task;
        let reprioritize = task.priority != target.priority;
        let redate = task.name != target.name || task.due_date != target.due_date;

        if reprioritize {
            self.ranking.remove(key);
            self.ranking.insert(key, target.priority);
        }
        if redate {
            self.due_dates.remove_task(key);
            if let Some(date) = target.due_date {
                self.due_dates.insert_task(key, target.name.clone(), date);
            }
        }
        self.slots[key.0].task.restore(target);
    }
}
