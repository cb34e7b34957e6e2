//! Identity registry: user id to user record.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::task::{TaskKey, UserId};

/// A registered user and the tasks currently assigned to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    tasks: Vec<TaskKey>,
}

impl User {
    fn new(id: UserId, name: String) -> Self {
        Self {
            id,
            name,
            tasks: Vec::new(),
        }
    }

    /// Task handles in assignment order.
    pub fn tasks(&self) -> &[TaskKey] {
        &self.tasks
    }

    pub(crate) fn push_task(&mut self, key: TaskKey) {
        self.tasks.push(key);
    }

    /// Remove every handle matching `pred`. Returns true if any was removed.
    pub(crate) fn remove_tasks_where(&mut self, mut pred: impl FnMut(TaskKey) -> bool) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|key| !pred(*key));
        self.tasks.len() != before
    }
}

#[derive(Debug, Default, Clone)]
pub struct UserRegistry {
    users: BTreeMap<UserId, User>,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: UserId, name: impl Into<String>) -> Result<()> {
        if self.users.contains_key(&id) {
            return Err(Error::UserExists(id));
        }
        self.users.insert(id, User::new(id, name.into()));
        Ok(())
    }

    pub fn contains(&self, id: UserId) -> bool {
        self.users.contains_key(&id)
    }

    pub fn get(&self, id: UserId) -> Result<&User> {
        self.users.get(&id).ok_or(Error::UserNotFound(id))
    }

    pub(crate) fn get_mut(&mut self, id: UserId) -> Result<&mut User> {
        self.users.get_mut(&id).ok_or(Error::UserNotFound(id))
    }

    /// Users in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
