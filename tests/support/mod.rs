#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use chrono::NaiveDate;
use taskdex::task::{Priority, Task};
use tempfile::TempDir;

/// Scratch working directory for binary tests.
pub struct TestDir {
    dir: TempDir,
}

impl TestDir {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create tempdir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_file(&self, rel_path: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        self.write_file(".taskdex.toml", contents)
    }

    /// `taskdex` with the working directory set here and the environment
    /// scrubbed of config overrides.
    pub fn cmd(&self) -> Command {
        let mut cmd = taskdex_cmd();
        cmd.current_dir(self.path());
        cmd
    }
}

pub fn taskdex_cmd() -> Command {
    let mut cmd = Command::cargo_bin("taskdex").expect("binary");
    cmd.env_remove("TASKDEX_CONFIG").env_remove("RUST_LOG");
    cmd
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn priority(value: u8) -> Priority {
    Priority::new(value).expect("valid priority")
}

pub fn task(id: u32, name: &str, prio: u8) -> Task {
    Task::new(id, name, priority(prio))
}

pub fn dated(id: u32, name: &str, prio: u8, due: NaiveDate) -> Task {
    task(id, name, prio).with_due_date(due)
}
