//! Due-date index: binary search tree keyed by due date.
//!
//! Earlier dates go left, equal or later dates go right, so tasks sharing a
//! due date come out of the in-order walk in insertion order. Removal looks
//! nodes up by name (or by task handle) with a pre-order scan, since the
//! tree is not keyed on either.

use chrono::NaiveDate;
use serde::Serialize;

use crate::task::TaskKey;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DueEntry {
    pub name: String,
    pub date: NaiveDate,
    #[serde(skip)]
    pub task: Option<TaskKey>,
}

/// Traversal orders. Only in-order carries a date ordering guarantee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TraversalOrder {
    #[default]
    InOrder,
    PreOrder,
    PostOrder,
}

impl std::str::FromStr for TraversalOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in" | "inorder" | "in-order" => Ok(TraversalOrder::InOrder),
            "pre" | "preorder" | "pre-order" => Ok(TraversalOrder::PreOrder),
            "post" | "postorder" | "post-order" => Ok(TraversalOrder::PostOrder),
            _ => Err(format!("unknown traversal order: {s} (expected in|pre|post)")),
        }
    }
}

#[derive(Debug)]
struct Node {
    entry: DueEntry,
    left: Option<Box<Node>>,
    right: Option<Box<Node>>,
}

impl Node {
    fn leaf(entry: DueEntry) -> Box<Self> {
        Box::new(Self {
            entry,
            left: None,
            right: None,
        })
    }
}

#[derive(Debug, Default)]
pub struct DueDateIndex {
    root: Option<Box<Node>>,
    len: usize,
}

impl DueDateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a bare name/date pair.
    pub fn insert(&mut self, name: impl Into<String>, date: NaiveDate) {
        self.insert_entry(DueEntry {
            name: name.into(),
            date,
            task: None,
        });
    }

    pub(crate) fn insert_task(&mut self, key: TaskKey, name: impl Into<String>, date: NaiveDate) {
        self.insert_entry(DueEntry {
            name: name.into(),
            date,
            task: Some(key),
        });
    }

    fn insert_entry(&mut self, entry: DueEntry) {
        let mut slot = &mut self.root;
        while let Some(node) = slot {
            slot = if entry.date < node.entry.date {
                &mut node.left
            } else {
                &mut node.right
            };
        }
        *slot = Some(Node::leaf(entry));
        self.len += 1;
    }

    /// Remove the first node named `name`. Returns false if absent.
    pub fn remove(&mut self, name: &str) -> bool {
        self.remove_first(|entry| entry.name == name).is_some()
    }

    /// Remove the first node belonging to `key`.
    pub(crate) fn remove_task(&mut self, key: TaskKey) -> Option<DueEntry> {
        self.remove_first(|entry| entry.task == Some(key))
    }

    /// Remove every node belonging to `key`, returning how many were dropped.
    pub(crate) fn remove_task_all(&mut self, key: TaskKey) -> usize {
        let mut removed = 0;
        while self.remove_task(key).is_some() {
            removed += 1;
        }
        removed
    }

    fn remove_first(&mut self, mut pred: impl FnMut(&DueEntry) -> bool) -> Option<DueEntry> {
        let removed = remove_first(&mut self.root, &mut pred);
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    pub fn search(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn find(&self, name: &str) -> Option<&DueEntry> {
        self.pre_order().into_iter().find(|entry| entry.name == name)
    }

    pub fn traverse(&self, order: TraversalOrder) -> Vec<&DueEntry> {
        match order {
            TraversalOrder::InOrder => self.in_order(),
            TraversalOrder::PreOrder => self.pre_order(),
            TraversalOrder::PostOrder => self.post_order(),
        }
    }

    /// Ascending by date.
    pub fn in_order(&self) -> Vec<&DueEntry> {
        let mut out = Vec::with_capacity(self.len);
        let mut stack: Vec<&Node> = Vec::new();
        let mut current = self.root.as_deref();
        loop {
            while let Some(node) = current {
                stack.push(node);
                current = node.left.as_deref();
            }
            let Some(node) = stack.pop() else {
                break;
            };
            out.push(&node.entry);
            current = node.right.as_deref();
        }
        out
    }

    pub fn pre_order(&self) -> Vec<&DueEntry> {
        let mut out = Vec::with_capacity(self.len);
        let mut stack: Vec<&Node> = self.root.as_deref().into_iter().collect();
        while let Some(node) = stack.pop() {
            out.push(&node.entry);
            if let Some(right) = node.right.as_deref() {
                stack.push(right);
            }
            if let Some(left) = node.left.as_deref() {
                stack.push(left);
            }
        }
        out
    }

    pub fn post_order(&self) -> Vec<&DueEntry> {
        // Reverse of a root-right-left walk.
        let mut out = Vec::with_capacity(self.len);
        let mut stack: Vec<&Node> = self.root.as_deref().into_iter().collect();
        while let Some(node) = stack.pop() {
            out.push(&node.entry);
            if let Some(left) = node.left.as_deref() {
                stack.push(left);
            }
            if let Some(right) = node.right.as_deref() {
                stack.push(right);
            }
        }
        out.reverse();
        out
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }
}

impl Drop for DueDateIndex {
    fn drop(&mut self) {
        let mut stack: Vec<Box<Node>> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
    }
}

/// Unlink the first node, in pre-order, whose entry satisfies `pred`.
fn remove_first(
    root: &mut Option<Box<Node>>,
    pred: &mut dyn FnMut(&DueEntry) -> bool,
) -> Option<DueEntry> {
    let path = find_path(root.as_deref(), pred)?;
    let mut slot = root;
    for go_left in path {
        let node = slot.as_mut()?;
        slot = if go_left {
            &mut node.left
        } else {
            &mut node.right
        };
    }
    unlink(slot)
}

/// Left/right turns from the root to the first pre-order match.
fn find_path(
    root: Option<&Node>,
    pred: &mut dyn FnMut(&DueEntry) -> bool,
) -> Option<Vec<bool>> {
    let mut path = Vec::new();
    let mut stack: Vec<(&Node, usize, bool)> =
        root.into_iter().map(|node| (node, 0, false)).collect();
    while let Some((node, depth, went_left)) = stack.pop() {
        path.truncate(depth.saturating_sub(1));
        if depth > 0 {
            path.push(went_left);
        }
        if pred(&node.entry) {
            return Some(path);
        }
        if let Some(right) = node.right.as_deref() {
            stack.push((right, depth + 1, false));
        }
        if let Some(left) = node.left.as_deref() {
            stack.push((left, depth + 1, true));
        }
    }
    None
}

fn unlink(slot: &mut Option<Box<Node>>) -> Option<DueEntry> {
    let mut node = slot.take()?;
    match (node.left.take(), node.right.take()) {
        // No children: the slot stays empty.
        (None, None) => {}
        // One child: splice it into the parent.
        (Some(child), None) | (None, Some(child)) => *slot = Some(child),
        // Two children: promote the in-order successor.
        (Some(left), Some(right)) => {
            let mut right = Some(right);
            if let Some(successor) = take_min(&mut right) {
                let removed = std::mem::replace(&mut node.entry, successor);
                node.left = Some(left);
                node.right = right;
                *slot = Some(node);
                return Some(removed);
            }
            *slot = Some(left);
        }
    }
    Some(node.entry)
}

fn take_min(mut slot: &mut Option<Box<Node>>) -> Option<DueEntry> {
    while slot.as_ref()?.left.is_some() {
        slot = &mut slot.as_mut()?.left;
    }
    let mut node = slot.take()?;
    *slot = node.right.take();
    Some(node.entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn names(entries: Vec<&DueEntry>) -> Vec<&str> {
        entries.into_iter().map(|e| e.name.as_str()).collect()
    }

    fn sample() -> DueDateIndex {
        let mut index = DueDateIndex::new();
        index.insert("Task X", date(2025, 6, 10));
        index.insert("Task Y", date(2025, 5, 1));
        index.insert("Task Z", date(2025, 7, 20));
        index
    }

    #[test]
    fn in_order_is_ascending_by_date() {
        let index = sample();
        assert_eq!(names(index.in_order()), vec!["Task Y", "Task X", "Task Z"]);
    }

    #[test]
    fn pre_and_post_order_shapes() {
        let index = sample();
        assert_eq!(names(index.pre_order()), vec!["Task X", "Task Y", "Task Z"]);
        assert_eq!(names(index.post_order()), vec!["Task Y", "Task Z", "Task X"]);
    }

    #[test]
    fn equal_dates_keep_insertion_order() {
        let mut index = DueDateIndex::new();
        let day = date(2025, 1, 1);
        index.insert("first", day);
        index.insert("second", day);
        index.insert("third", day);
        assert_eq!(names(index.in_order()), vec!["first", "second", "third"]);
    }

    #[test]
    fn remove_leaf() {
        let mut index = sample();
        assert!(index.remove("Task Z"));
        assert_eq!(names(index.in_order()), vec!["Task Y", "Task X"]);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn remove_node_with_one_child() {
        let mut index = DueDateIndex::new();
        index.insert("root", date(2025, 5, 1));
        index.insert("mid", date(2025, 6, 1));
        index.insert("late", date(2025, 7, 1));
        assert!(index.remove("mid"));
        assert_eq!(names(index.in_order()), vec!["root", "late"]);
        assert_eq!(names(index.pre_order()), vec!["root", "late"]);
    }

    #[test]
    fn remove_node_with_two_children_promotes_successor() {
        let mut index = DueDateIndex::new();
        index.insert("m", date(2025, 6, 1));
        index.insert("c", date(2025, 3, 1));
        index.insert("t", date(2025, 9, 1));
        index.insert("p", date(2025, 7, 1));
        index.insert("x", date(2025, 11, 1));

        assert!(index.remove("m"));
        assert_eq!(names(index.in_order()), vec!["c", "p", "t", "x"]);
        assert_eq!(names(index.pre_order())[0], "p");
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn remove_missing_is_false() {
        let mut index = sample();
        assert!(!index.remove("nope"));
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn search_finds_by_name_anywhere() {
        let index = sample();
        assert!(index.search("Task Z"));
        assert!(!index.search("Task Q"));
        assert_eq!(index.find("Task Y").map(|e| e.date), Some(date(2025, 5, 1)));
    }

    #[test]
    fn remove_task_matches_handle_not_name() {
        let mut index = DueDateIndex::new();
        index.insert_task(TaskKey(0), "dup", date(2025, 1, 1));
        index.insert_task(TaskKey(1), "dup", date(2025, 2, 1));
        let removed = index.remove_task(TaskKey(1)).unwrap();
        assert_eq!(removed.date, date(2025, 2, 1));
        assert_eq!(index.len(), 1);
        assert_eq!(index.in_order()[0].task, Some(TaskKey(0)));
    }

    #[test]
    fn degenerate_tree_is_handled_iteratively() {
        let mut index = DueDateIndex::new();
        let start = date(2000, 1, 1);
        for offset in 0..50_000 {
            index.insert(format!("t{offset}"), start + chrono::Days::new(offset));
        }
        assert_eq!(index.in_order().len(), 50_000);
        assert_eq!(index.post_order().len(), 50_000);

        assert!(index.remove("t49999"));
        assert!(index.remove("t0"));
        assert_eq!(index.len(), 49_998);
        assert_eq!(index.in_order()[0].name, "t1");
    }

    #[test]
    fn remove_prefers_pre_order_first_match() {
        let mut index = DueDateIndex::new();
        index.insert("dup", date(2025, 5, 1));
        index.insert("dup", date(2025, 4, 1));
        assert!(index.remove("dup"));
        assert_eq!(index.in_order()[0].date, date(2025, 4, 1));
    }

    #[test]
    fn traversal_order_parses() {
        assert_eq!("pre".parse::<TraversalOrder>(), Ok(TraversalOrder::PreOrder));
        assert_eq!("In-Order".parse::<TraversalOrder>(), Ok(TraversalOrder::InOrder));
        assert!("sideways".parse::<TraversalOrder>().is_err());
    }
}
