//! Text reports over the task index and dependency graph.
//!
//! Reports only read from the core through its public accessors. Saving a
//! report writes it atomically (temp file + rename) under the configured
//! report directory.

use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::info;

use crate::config::ReportsConfig;
use crate::error::{Error, Result};
use crate::graph::DependencyGraph;
use crate::index::TaskIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Summary,
    DateRange,
    Dependencies,
    Workload,
}

impl ReportKind {
    /// File name for this report under `config`.
    pub fn file_name(self, config: &ReportsConfig) -> &str {
        match self {
            ReportKind::Summary => &config.summary_file,
            ReportKind::DateRange => &config.date_range_file,
            ReportKind::Dependencies => &config.dependency_file,
            ReportKind::Workload => &config.workload_file,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub kind: ReportKind,
    pub text: String,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

pub fn task_summary(index: &TaskIndex, now: DateTime<Utc>) -> Report {
    let mut text = String::from("=== Task Summary Report ===\n");
    text.push_str(&format!("Generated: {}\n\n", now.to_rfc3339()));
    text.push_str(&format!("Total Tasks: {}\n", index.total_tasks()));
    text.push_str("Tasks by Priority:\n");
    for (priority, count) in index.tasks_by_priority().iter().rev() {
        text.push_str(&format!("  Priority {priority}: {count} tasks\n"));
    }
    Report {
        kind: ReportKind::Summary,
        text,
    }
}

pub fn date_range(
    index: &TaskIndex,
    start: NaiveDate,
    end: NaiveDate,
    date_format: &str,
) -> Report {
    let mut text = String::from("=== Task Date Range Report ===\n");
    text.push_str(&format!(
        "Period: {} to {}\n\n",
        start.format(date_format),
        end.format(date_format)
    ));
    for task in index.tasks_in_date_range(start, end) {
        // Range filtering already excluded undated tasks.
        if let Some(due) = task.due_date {
            text.push_str(&format!("Task: {} (Due: {})\n", task.name, due.format(date_format)));
        }
    }
    Report {
        kind: ReportKind::DateRange,
        text,
    }
}

pub fn dependencies(graph: &DependencyGraph, now: DateTime<Utc>) -> Report {
    let mut text = String::from("=== Task Dependency Analysis ===\n");
    text.push_str(&format!("Generated: {}\n\n", now.to_rfc3339()));
    for (task, dependents) in graph.adjacency() {
        text.push_str(&format!("Task: {task}\n"));
        text.push_str(&format!("Dependencies: [{}]\n\n", dependents.join(", ")));
    }
    Report {
        kind: ReportKind::Dependencies,
        text,
    }
}

pub fn workload(index: &TaskIndex, now: DateTime<Utc>) -> Report {
    let mut text = String::from("=== User Workload Report ===\n");
    text.push_str(&format!("Generated: {}\n\n", now.to_rfc3339()));
    for user in index.users() {
        text.push_str(&format!("User: {} (ID: {})\n", user.name, user.id));
        text.push_str(&format!("Total Tasks: {}\n\n", user.tasks.len()));
    }
    Report {
        kind: ReportKind::Workload,
        text,
    }
}

/// Write `report` to its configured file under `config.dir`.
pub fn save(report: &Report, config: &ReportsConfig) -> Result<PathBuf> {
    let path = config.dir.join(report.kind.file_name(config));
    write_atomic(&path, report.text.as_bytes()).map_err(|err| match err {
        Error::Io(source) => Error::ReportWrite {
            path: path.clone(),
            source,
        },
        other => other,
    })?;
    info!(path = %path.display(), kind = ?report.kind, "report saved");
    Ok(path)
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    // Temp file in the same directory so the rename stays atomic.
    let temp_path = path.with_extension(format!(
        "{}.tmp.{}",
        path.extension().and_then(|e| e.to_str()).unwrap_or(""),
        std::process::id()
    ));

    let mut temp_file = File::create(&temp_path)?;
    temp_file.write_all(data)?;
    temp_file.sync_all()?;
    drop(temp_file);

    fs::rename(&temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Priority, Task};
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap()
    }

    fn sample_index() -> TaskIndex {
        let mut index = TaskIndex::new();
        index.register_user(1, "Alice").unwrap();
        index.register_user(2, "Bob").unwrap();
        index
            .add_task_to_user(
                1,
                Task::new(101, "Design Module", Priority::new(8).unwrap())
                    .with_due_date(date(2025, 5, 15)),
            )
            .unwrap();
        index
            .add_task_to_user(
                1,
                Task::new(102, "Implement Module", Priority::new(6).unwrap())
                    .with_due_date(date(2025, 5, 20)),
            )
            .unwrap();
        index
    }

    #[test]
    fn summary_lists_totals_and_priorities() {
        let report = task_summary(&sample_index(), fixed_now());
        assert!(report.text.starts_with("=== Task Summary Report ===\n"));
        assert!(report.text.contains("Total Tasks: 2\n"));
        assert!(report.text.contains("  Priority 8: 1 tasks\n"));
        assert!(report.text.contains("  Priority 6: 1 tasks\n"));
        let high = report.text.find("Priority 8").unwrap();
        let low = report.text.find("Priority 6").unwrap();
        assert!(high < low);
    }

    #[test]
    fn date_range_includes_bounds() {
        let report = date_range(&sample_index(), date(2025, 5, 15), date(2025, 5, 15), "%Y-%m-%d");
        assert!(report.text.contains("Period: 2025-05-15 to 2025-05-15"));
        assert!(report.text.contains("Task: Design Module (Due: 2025-05-15)"));
        assert!(!report.text.contains("Implement Module"));
    }

    #[test]
    fn dependency_report_lists_adjacency() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("Test", "Implement");
        let report = dependencies(&graph, fixed_now());
        assert!(report.text.contains("Task: Implement\nDependencies: [Test]\n"));
    }

    #[test]
    fn workload_counts_per_user() {
        let report = workload(&sample_index(), fixed_now());
        assert!(report.text.contains("User: Alice (ID: 1)\nTotal Tasks: 2\n"));
        assert!(report.text.contains("User: Bob (ID: 2)\nTotal Tasks: 0\n"));
    }

    #[test]
    fn save_writes_to_configured_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReportsConfig {
            dir: dir.path().join("out"),
            ..ReportsConfig::default()
        };
        let report = workload(&sample_index(), fixed_now());
        let path = save(&report, &config).unwrap();

        assert_eq!(path, dir.path().join("out").join("workload_report.txt"));
        assert_eq!(fs::read_to_string(&path).unwrap(), report.text);
    }

    #[test]
    fn save_failure_keeps_the_io_cause() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("out");
        fs::write(&blocker, "not a directory").unwrap();
        let config = ReportsConfig {
            dir: blocker,
            ..ReportsConfig::default()
        };

        let err = save(&workload(&sample_index(), fixed_now()), &config).unwrap_err();
        let Error::ReportWrite { path, source } = &err else {
            panic!("expected ReportWrite, got {err:?}");
        };
        assert_eq!(path, &dir.path().join("out").join("workload_report.txt"));
        assert!(err.to_string().contains(&source.to_string()));
        assert!(std::error::Error::source(&err).is_some());
    }
}
