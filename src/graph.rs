//! Dependency graph over task names.
//!
//! Edges run from prerequisite to dependent ("must finish before"). The
//! graph is keyed by name and never consults the task index; duplicate task
//! names alias to the same node.

use std::collections::{BTreeMap, HashSet, VecDeque};

use tracing::debug;

#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    adjacency: BTreeMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `dependent` requires `prerequisite` to finish first.
    ///
    /// Returns false if the edge already existed.
    pub fn add_dependency(&mut self, dependent: &str, prerequisite: &str) -> bool {
        let targets = self.adjacency.entry(prerequisite.to_string()).or_default();
        if targets.iter().any(|existing| existing == dependent) {
            return false;
        }
        targets.push(dependent.to_string());
        debug!(prerequisite, dependent, "dependency added");
        true
    }

    /// Direct dependents of `name`, in edge insertion order.
    pub fn dependents(&self, name: &str) -> &[String] {
        self.adjacency.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Read-only adjacency view (prerequisite -> dependents).
    pub fn adjacency(&self) -> &BTreeMap<String, Vec<String>> {
        &self.adjacency
    }

    pub fn contains(&self, name: &str) -> bool {
        self.adjacency.contains_key(name)
            || self
                .adjacency
                .values()
                .any(|targets| targets.iter().any(|t| t == name))
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// True if a DFS from `start` re-enters a node still on its path.
    ///
    /// A start node absent from the graph has no cycle.
    pub fn has_cycle_from(&self, start: &str) -> bool {
        self.find_cycle(start).is_some()
    }

    /// Like [`has_cycle_from`](Self::has_cycle_from), returning the cycle as a
    /// node path that begins and ends with the same name.
    pub fn find_cycle(&self, start: &str) -> Option<Vec<String>> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut on_path: HashSet<&str> = HashSet::new();
        // Explicit stack: (node, next edge index). Mirrors recursion without
        // risking overflow on long chains.
        let mut stack: Vec<(&str, usize)> = vec![(start, 0)];
        visited.insert(start);
        on_path.insert(start);

        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            let targets = self.dependents(node);
            if frame.1 < targets.len() {
                let next = targets[frame.1].as_str();
                frame.1 += 1;

                if on_path.contains(next) {
                    let from = stack
                        .iter()
                        .position(|(name, _)| *name == next)
                        .unwrap_or(0);
                    let mut cycle: Vec<String> =
                        stack[from..].iter().map(|(name, _)| name.to_string()).collect();
                    cycle.push(next.to_string());
                    debug!(start, cycle = ?cycle, "dependency cycle found");
                    return Some(cycle);
                }

                if visited.insert(next) {
                    on_path.insert(next);
                    stack.push((next, 0));
                }
            } else {
                on_path.remove(node);
                stack.pop();
            }
        }

        None
    }

    /// Every node reachable from `start` in depth-first pre-order, `start`
    /// included.
    pub fn dependencies_of(&self, start: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&str> = vec![start];
        while let Some(node) = stack.pop() {
            if !visited.insert(node) {
                continue;
            }
            out.push(node.to_string());
            // Reverse so the first edge is explored first.
            for next in self.dependents(node).iter().rev() {
                if !visited.contains(next.as_str()) {
                    stack.push(next);
                }
            }
        }
        out
    }

    /// Every node reachable from `start` in breadth-first order.
    pub fn breadth_first(&self, start: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            if !visited.insert(node) {
                continue;
            }
            out.push(node.to_string());
            for next in self.dependents(node) {
                if !visited.contains(next.as_str()) {
                    queue.push_back(next);
                }
            }
        }
        out
    }

    /// One line per prerequisite: `Design -> [Implement, Review]`.
    pub fn adjacency_lines(&self) -> Vec<String> {
        self.adjacency
            .iter()
            .map(|(from, to)| format!("{from} -> [{}]", to.join(", ")))
            .collect()
    }
}
