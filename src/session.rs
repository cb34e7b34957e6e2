//! Interactive session: one task index plus one dependency graph, driven by
//! line-oriented commands.
//!
//! A line is split with shell quoting rules and parsed with clap, so
//! `add 1 101 "Design Module" --priority 8 --due 2025-05-15` works the same
//! in the shell, in scripts and in the demo.

use chrono::{DateTime, NaiveDate, Utc};
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::debug;

use crate::config::Config;
use crate::due_date::TraversalOrder;
use crate::error::{Error, Result};
use crate::graph::DependencyGraph;
use crate::index::{HistoryKind, TaskEdit, TaskIndex};
use crate::output::HumanOutput;
use crate::report::{self, Report};
use crate::task::{Priority, Task, TaskId, UserId};

#[derive(Parser, Debug)]
#[command(name = "taskdex", no_binary_name = true, disable_version_flag = true)]
struct SessionLine {
    #[command(subcommand)]
    command: SessionCommand,
}

/// Commands accepted inside a session
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Register a user
    Register {
        id: UserId,
        name: String,
    },

    /// Add a task to a registered user
    Add {
        user: UserId,
        id: TaskId,
        name: String,

        /// Priority from 1 (lowest) to 10 (highest)
        #[arg(short, long)]
        priority: Priority,

        /// Due date, in the configured date format
        #[arg(short, long)]
        due: Option<String>,
    },

    /// Change fields of an existing task
    Edit {
        user: UserId,
        id: TaskId,

        #[arg(long)]
        name: Option<String>,

        #[arg(short, long)]
        priority: Option<Priority>,

        #[arg(short, long)]
        due: Option<String>,
    },

    /// Undo the most recent add or edit
    Undo,

    /// Re-apply the most recently undone change
    Redo,

    /// List a user's tasks
    Tasks {
        user: UserId,
    },

    /// Show the schedule queue
    Schedule,

    /// Show the head of the schedule queue
    Next,

    /// List tasks by priority, highest first
    Priorities,

    /// Show recent task activity, newest first
    History,

    /// List tasks with due dates
    DueDates {
        /// Traversal order: in, pre or post
        #[arg(long, default_value = "in")]
        order: TraversalOrder,
    },

    /// Look up the due date of a task by name
    FindDue {
        name: String,
    },

    /// Record that TASK cannot start before ON is finished
    Depend {
        task: String,

        #[arg(long)]
        on: String,
    },

    /// Show what depends on a task, directly and transitively
    Deps {
        task: String,

        /// List transitive dependents breadth-first
        #[arg(long)]
        bfs: bool,
    },

    /// Check for a dependency cycle reachable from a task
    Cycles {
        start: String,
    },

    /// Print the dependency graph
    Graph,

    /// Generate a report
    Report {
        #[command(subcommand)]
        kind: ReportCommand,

        /// Write the report to its configured file
        #[arg(long, global = true)]
        save: bool,
    },

    /// Show index statistics
    Stats,

    /// Leave the session
    #[command(alias = "quit")]
    Exit,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ReportCommand {
    /// Task totals by priority
    Summary,
    /// Tasks due within a date range (inclusive)
    Range { from: String, to: String },
    /// Dependency adjacency
    Deps,
    /// Task counts per user
    Workload,
}

/// A parsed session line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// Empty line or `#` comment
    Blank,
    /// Rendered help text requested with `help` or `--help`
    Help(String),
    Command(SessionCommand),
}

/// Parse one line of session input.
pub fn parse_line(line: &str) -> Result<Line> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(Line::Blank);
    }

    let words = shlex::split(trimmed)
        .ok_or_else(|| Error::InvalidArgument(format!("unbalanced quotes: {trimmed}")))?;

    match SessionLine::try_parse_from(words) {
        Ok(parsed) => Ok(Line::Command(parsed.command)),
        Err(err)
            if matches!(
                err.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) =>
        {
            Ok(Line::Help(err.render().to_string()))
        }
        Err(err) => Err(Error::InvalidArgument(clap_message(&err))),
    }
}

fn clap_message(err: &clap::Error) -> String {
    let rendered = err.render().to_string();
    rendered
        .lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches("error: ")
        .to_string()
}

/// Result of executing one session command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub command: &'static str,
    pub data: serde_json::Value,
    pub human: HumanOutput,
}

impl CommandOutput {
    fn new(command: &'static str, data: serde_json::Value, human: HumanOutput) -> Self {
        Self {
            command,
            data,
            human,
        }
    }
}

pub struct Session {
    index: TaskIndex,
    graph: DependencyGraph,
    config: Config,
    clock: fn() -> DateTime<Utc>,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            index: TaskIndex::with_options(config.index.options()),
            graph: DependencyGraph::new(),
            config,
            clock: Utc::now,
        }
    }

    /// Replace the clock used to stamp reports.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn index(&self) -> &TaskIndex {
        &self.index
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn execute(&mut self, command: SessionCommand) -> Result<CommandOutput> {
        debug!(?command, "executing session command");
        match command {
            SessionCommand::Register { id, name } => self.register(id, name),
            SessionCommand::Add {
                user,
                id,
                name,
                priority,
                due,
            } => self.add(user, id, name, priority, due.as_deref()),
            SessionCommand::Edit {
                user,
                id,
                name,
                priority,
                due,
            } => self.edit(user, id, name, priority, due.as_deref()),
            SessionCommand::Undo => Ok(self.undo()),
            SessionCommand::Redo => Ok(self.redo()),
            SessionCommand::Tasks { user } => self.tasks(user),
            SessionCommand::Schedule => Ok(self.schedule()),
            SessionCommand::Next => Ok(self.next()),
            SessionCommand::Priorities => Ok(self.priorities()),
            SessionCommand::History => Ok(self.history()),
            SessionCommand::DueDates { order } => Ok(self.due_dates(order)),
            SessionCommand::FindDue { name } => Ok(self.find_due(&name)),
            SessionCommand::Depend { task, on } => Ok(self.depend(&task, &on)),
            SessionCommand::Deps { task, bfs } => Ok(self.deps(&task, bfs)),
            SessionCommand::Cycles { start } => Ok(self.cycles(&start)),
            SessionCommand::Graph => Ok(self.graph_view()),
            SessionCommand::Report { kind, save } => self.report(kind, save),
            SessionCommand::Stats => Ok(self.stats()),
            SessionCommand::Exit => Ok(CommandOutput::new(
                "exit",
                json!({}),
                HumanOutput::new("Bye"),
            )),
        }
    }

    fn parse_date(&self, value: &str) -> Result<NaiveDate> {
        let format = &self.config.display.date_format;
        NaiveDate::parse_from_str(value.trim(), format).map_err(|_| Error::InvalidDate {
            value: value.to_string(),
            format: format.clone(),
        })
    }

    fn format_date(&self, date: NaiveDate) -> String {
        date.format(&self.config.display.date_format).to_string()
    }

    fn register(&mut self, id: UserId, name: String) -> Result<CommandOutput> {
        self.index.register_user(id, name.as_str())?;
        Ok(CommandOutput::new(
            "register",
            json!({ "id": id, "name": name }),
            HumanOutput::new(format!("Registered user {name} (ID: {id})")),
        ))
    }

    fn add(
        &mut self,
        user: UserId,
        id: TaskId,
        name: String,
        priority: Priority,
        due: Option<&str>,
    ) -> Result<CommandOutput> {
        let mut task = Task::new(id, name, priority);
        if let Some(due) = due {
            task = task.with_due_date(self.parse_date(due)?);
        }
        self.index.add_task_to_user(user, task.clone())?;
        Ok(CommandOutput::new(
            "add",
            json!({ "user_id": user, "task": task }),
            HumanOutput::new(format!("Added task: {task}")),
        ))
    }

    fn edit(
        &mut self,
        user: UserId,
        id: TaskId,
        name: Option<String>,
        priority: Option<Priority>,
        due: Option<&str>,
    ) -> Result<CommandOutput> {
        let edit = TaskEdit {
            name,
            priority,
            due_date: due.map(|value| self.parse_date(value)).transpose()?,
        };
        if edit.is_empty() {
            return Err(Error::InvalidArgument(
                "edit needs at least one of --name, --priority or --due".to_string(),
            ));
        }
        self.index.edit_task(user, id, edit)?;
        let task = self.index.find_task(user, id)?;
        Ok(CommandOutput::new(
            "edit",
            json!({ "user_id": user, "task": task }),
            HumanOutput::new(format!("Updated task: {task}")),
        ))
    }

    fn undo(&mut self) -> CommandOutput {
        match self.index.undo_last_task() {
            Some(outcome) => {
                let verb = match outcome.kind {
                    HistoryKind::Add => "Undid add of",
                    HistoryKind::Edit => "Undid edit of",
                };
                let human = HumanOutput::new(format!("{verb} task: {}", outcome.task));
                CommandOutput::new("undo", json!({ "applied": true, "outcome": outcome }), human)
            }
            None => CommandOutput::new(
                "undo",
                json!({ "applied": false }),
                HumanOutput::new("Nothing to undo"),
            ),
        }
    }

    fn redo(&mut self) -> CommandOutput {
        match self.index.redo_last_task() {
            Some(outcome) => {
                let verb = match outcome.kind {
                    HistoryKind::Add => "Redid add of",
                    HistoryKind::Edit => "Redid edit of",
                };
                let human = HumanOutput::new(format!("{verb} task: {}", outcome.task));
                CommandOutput::new("redo", json!({ "applied": true, "outcome": outcome }), human)
            }
            None => CommandOutput::new(
                "redo",
                json!({ "applied": false }),
                HumanOutput::new("Nothing to redo"),
            ),
        }
    }

    fn tasks(&self, user_id: UserId) -> Result<CommandOutput> {
        let user = self.index.user(user_id)?;
        let tasks = self.index.user_tasks(user_id)?;
        let mut human = HumanOutput::new(format!("Tasks for user: {}", user.name));
        if tasks.is_empty() {
            human.push_summary("no tasks", "");
        }
        for task in &tasks {
            human.push_detail(task.to_string());
        }
        Ok(CommandOutput::new(
            "tasks",
            json!({ "user_id": user_id, "name": user.name, "tasks": tasks }),
            human,
        ))
    }

    fn schedule(&self) -> CommandOutput {
        let entries: Vec<_> = self.index.scheduled().collect();
        let mut human = HumanOutput::new("Scheduled tasks");
        for entry in &entries {
            human.push_detail(format!("{} {} ({})", entry.id, entry.name, entry.status));
        }
        if entries.is_empty() {
            human.push_summary("queue is empty", "");
        }
        CommandOutput::new("schedule", json!({ "entries": entries }), human)
    }

    fn next(&self) -> CommandOutput {
        match self.index.next_scheduled() {
            Some(entry) => CommandOutput::new(
                "next",
                json!({ "entry": entry }),
                HumanOutput::new(format!(
                    "Next task: {} {} ({})",
                    entry.id, entry.name, entry.status
                )),
            ),
            None => CommandOutput::new(
                "next",
                json!({ "entry": null }),
                HumanOutput::new("No scheduled tasks"),
            ),
        }
    }

    fn priorities(&self) -> CommandOutput {
        let ranked = self.index.ranked();
        let mut human = HumanOutput::new("Tasks by priority");
        for task in &ranked {
            human.push_detail(task.to_string());
        }
        CommandOutput::new("priorities", json!({ "tasks": ranked }), human)
    }

    fn history(&self) -> CommandOutput {
        let limit = match self.config.display.history_limit {
            0 => usize::MAX,
            n => n,
        };
        let entries: Vec<_> = self.index.history().take(limit).collect();
        let mut human = HumanOutput::new("Task history (newest first)");
        for entry in &entries {
            human.push_detail(format!("{} {}", entry.id, entry.name));
        }
        if self.index.arrival_log().len() > entries.len() {
            human.push_warning(format!(
                "showing {} of {} entries (display.history_limit)",
                entries.len(),
                self.index.arrival_log().len()
            ));
        }
        CommandOutput::new("history", json!({ "entries": entries }), human)
    }

    fn due_dates(&self, order: TraversalOrder) -> CommandOutput {
        let entries = self.index.due_dates(order);
        let mut human = HumanOutput::new("Due dates");
        for entry in &entries {
            human.push_detail(format!("{}: {}", entry.name, self.format_date(entry.date)));
        }
        CommandOutput::new("due-dates", json!({ "entries": entries }), human)
    }

    fn find_due(&self, name: &str) -> CommandOutput {
        match self.index.find_due(name) {
            Some(entry) => CommandOutput::new(
                "find-due",
                json!({ "found": true, "entry": entry }),
                HumanOutput::new(format!(
                    "{} is due {}",
                    entry.name,
                    self.format_date(entry.date)
                )),
            ),
            None => CommandOutput::new(
                "find-due",
                json!({ "found": false, "name": name }),
                HumanOutput::new(format!("No due date recorded for {name}")),
            ),
        }
    }

    fn depend(&mut self, task: &str, on: &str) -> CommandOutput {
        let added = self.graph.add_dependency(task, on);
        let mut human = HumanOutput::new(format!("{task} depends on {on}"));
        if !added {
            human.push_warning("dependency already recorded");
        }
        CommandOutput::new(
            "depend",
            json!({ "dependent": task, "prerequisite": on, "added": added }),
            human,
        )
    }

    fn deps(&self, task: &str, bfs: bool) -> CommandOutput {
        let direct = self.graph.dependents(task);
        let reachable = if bfs {
            self.graph.breadth_first(task)
        } else {
            self.graph.dependencies_of(task)
        };
        // The walk always starts with `task` itself.
        let transitive: Vec<&String> = reachable.iter().skip(1).collect();

        let mut human = HumanOutput::new(format!("Dependents of {task}"));
        human.push_summary("direct", direct.join(", "));
        human.push_summary(
            "transitive",
            transitive
                .iter()
                .map(|name| name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        );
        CommandOutput::new(
            "deps",
            json!({ "task": task, "direct": direct, "transitive": transitive }),
            human,
        )
    }

    fn cycles(&self, start: &str) -> CommandOutput {
        match self.graph.find_cycle(start) {
            Some(cycle) => {
                let mut human = HumanOutput::new(format!("Cycle reachable from {start}"));
                human.push_detail(cycle.join(" -> "));
                CommandOutput::new(
                    "cycles",
                    json!({ "start": start, "has_cycle": true, "cycle": cycle }),
                    human,
                )
            }
            None => CommandOutput::new(
                "cycles",
                json!({ "start": start, "has_cycle": false }),
                HumanOutput::new(format!("No cycle reachable from {start}")),
            ),
        }
    }

    fn graph_view(&self) -> CommandOutput {
        let mut human = HumanOutput::new("Dependency graph");
        for line in self.graph.adjacency_lines() {
            human.push_detail(line);
        }
        CommandOutput::new(
            "graph",
            json!({ "adjacency": self.graph.adjacency() }),
            human,
        )
    }

    fn report(&self, kind: ReportCommand, save: bool) -> Result<CommandOutput> {
        let now = (self.clock)();
        let report: Report = match kind {
            ReportCommand::Summary => report::task_summary(&self.index, now),
            ReportCommand::Range { from, to } => {
                let start = self.parse_date(&from)?;
                let end = self.parse_date(&to)?;
                if start > end {
                    return Err(Error::InvalidArgument(format!(
                        "range start {from} is after end {to}"
                    )));
                }
                report::date_range(&self.index, start, end, &self.config.display.date_format)
            }
            ReportCommand::Deps => report::dependencies(&self.graph, now),
            ReportCommand::Workload => report::workload(&self.index, now),
        };

        let path = if save || self.config.reports.save {
            Some(report::save(&report, &self.config.reports)?)
        } else {
            None
        };

        let mut human = HumanOutput::new(report.text.trim_end());
        if let Some(path) = &path {
            human.push_summary("saved", path.display().to_string());
        }
        Ok(CommandOutput::new(
            "report",
            json!({ "kind": report.kind, "text": report.text, "path": path }),
            human,
        ))
    }

    fn stats(&self) -> CommandOutput {
        let index = &self.index;
        let mut human = HumanOutput::new("Index statistics");
        human.push_summary("users", index.user_count().to_string());
        human.push_summary("tasks", index.total_tasks().to_string());
        human.push_summary("ranked", index.ranking().len().to_string());
        human.push_summary("history", index.arrival_log().len().to_string());
        human.push_summary("scheduled", index.schedule().len().to_string());
        human.push_summary("due dates", index.due_date_index().len().to_string());
        human.push_summary("undo depth", index.undo_depth().to_string());
        human.push_summary("redo depth", index.redo_depth().to_string());
        human.push_summary("dependencies", self.graph.edge_count().to_string());
        CommandOutput::new(
            "stats",
            json!({
                "users": index.user_count(),
                "tasks": index.total_tasks(),
                "ranked": index.ranking().len(),
                "history": index.arrival_log().len(),
                "scheduled": index.schedule().len(),
                "due_dates": index.due_date_index().len(),
                "undo_depth": index.undo_depth(),
                "redo_depth": index.redo_depth(),
                "dependencies": self.graph.edge_count(),
            }),
            human,
        )
    }
}
