//! taskdex - Task Index Library
//!
//! This library provides the core functionality for the taskdex CLI tool:
//! a per-user task registry with undo/redo, kept in sync with several
//! secondary indexes, plus a name-keyed dependency graph with cycle checks.
//!
//! # Core Concepts
//!
//! - **Task Index**: Owns every task and keeps all indexes consistent
//! - **Undo/Redo**: Add and edit operations are reversible
//! - **Secondary Indexes**: Priority ranking, arrival log, schedule queue
//!   and a due-date search tree
//! - **Dependency Graph**: "Must finish before" edges between task names
//!
//! # Module Organization
//!
//! - `task`: Task record, priority and key types
//! - `registry`: User identity registry
//! - `history`: Undo/redo stacks
//! - `ranking`: Priority ranking index
//! - `arrival`: Most-recent-first arrival log
//! - `schedule`: FIFO schedule queue
//! - `due_date`: Binary search tree ordered by due date
//! - `index`: The orchestrating task index
//! - `graph`: Dependency graph and cycle detection
//! - `report`: Text reports and atomic report files
//! - `session`: Line-oriented command grammar over one index and graph
//! - `config`: Configuration loading from `.taskdex.toml`
//! - `output`: Human and JSON output envelopes
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface using clap

pub mod arrival;
pub mod cli;
pub mod config;
pub mod due_date;
pub mod error;
pub mod graph;
pub mod history;
pub mod index;
pub mod output;
pub mod ranking;
pub mod registry;
pub mod report;
pub mod schedule;
pub mod session;
pub mod task;

pub use error::{Error, Result};
pub use graph::DependencyGraph;
pub use index::TaskIndex;
