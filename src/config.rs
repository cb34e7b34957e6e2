//! Configuration loading and management
//!
//! Handles parsing of `.taskdex.toml` configuration files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::index::IndexOptions;

/// Name of the per-directory config file
pub const CONFIG_FILE: &str = ".taskdex.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Report generation
    #[serde(default)]
    pub reports: ReportsConfig,

    /// Date parsing and list rendering
    #[serde(default)]
    pub display: DisplayConfig,

    /// Task index behaviour
    #[serde(default)]
    pub index: IndexConfig,
}

/// Report-related configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportsConfig {
    /// Directory reports are written to
    #[serde(default = "default_report_dir")]
    pub dir: PathBuf,

    /// Save every generated report without asking for `--save`
    #[serde(default)]
    pub save: bool,

    #[serde(default = "default_summary_file")]
    pub summary_file: String,

    #[serde(default = "default_date_range_file")]
    pub date_range_file: String,

    #[serde(default = "default_dependency_file")]
    pub dependency_file: String,

    #[serde(default = "default_workload_file")]
    pub workload_file: String,
}

fn default_report_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_summary_file() -> String {
    "task_summary_report.txt".to_string()
}

fn default_date_range_file() -> String {
    "date_range_report.txt".to_string()
}

fn default_dependency_file() -> String {
    "dependency_report.txt".to_string()
}

fn default_workload_file() -> String {
    "workload_report.txt".to_string()
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            dir: default_report_dir(),
            save: false,
            summary_file: default_summary_file(),
            date_range_file: default_date_range_file(),
            dependency_file: default_dependency_file(),
            workload_file: default_workload_file(),
        }
    }
}

/// Display configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// chrono format used to parse and print due dates
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Maximum arrival-log entries shown by `history` (0 = all)
    #[serde(default)]
    pub history_limit: usize,
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
            history_limit: 0,
        }
    }
}

/// Task index configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Remove undone tasks from the auxiliary indexes
    #[serde(default = "default_true")]
    pub prune_on_undo: bool,
}

fn default_true() -> bool {
    true
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            prune_on_undo: true,
        }
    }
}

impl IndexConfig {
    pub fn options(&self) -> IndexOptions {
        IndexOptions {
            prune_on_undo: self.prune_on_undo,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the config to use: an explicit path must load, otherwise
    /// `.taskdex.toml` in `dir`, then the user config dir, then defaults.
    pub fn resolve(explicit: Option<&Path>, dir: &Path) -> crate::error::Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let local = dir.join(CONFIG_FILE);
        if local.exists() {
            return Ok(Self::load_or_default(&local));
        }
        match user_config_path() {
            Some(path) if path.exists() => Ok(Self::load_or_default(&path)),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from `path`, or return defaults if it is missing
    /// or invalid
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring invalid config");
                Self::default()
            }
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> crate::error::Result<()> {
        self.display.validate()?;
        self.reports.validate()?;
        Ok(())
    }
}

/// `<config dir>/taskdex/config.toml` for the current user, if resolvable
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "taskdex")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

impl DisplayConfig {
    fn validate(&self) -> crate::error::Result<()> {
        use chrono::format::{Item, StrftimeItems};

        if self.date_format.trim().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "display.date_format cannot be empty".to_string(),
            ));
        }
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(crate::error::Error::InvalidConfig(format!(
                "display.date_format: invalid format '{}'",
                self.date_format
            )));
        }
        Ok(())
    }
}

impl ReportsConfig {
    fn validate(&self) -> crate::error::Result<()> {
        let files = [
            ("reports.summary_file", &self.summary_file),
            ("reports.date_range_file", &self.date_range_file),
            ("reports.dependency_file", &self.dependency_file),
            ("reports.workload_file", &self.workload_file),
        ];
        for (field, name) in files {
            if name.trim().is_empty() {
                return Err(crate::error::Error::InvalidConfig(format!(
                    "{field}: file name cannot be empty"
                )));
            }
            if name.contains('/') || name.contains('\\') {
                return Err(crate::error::Error::InvalidConfig(format!(
                    "{field}: '{name}' must be a bare file name (set reports.dir for the directory)"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[index]\nprune_on_undo = false\n").unwrap();
        assert!(!parsed.index.prune_on_undo);
        assert_eq!(parsed.display.date_format, "%Y-%m-%d");
        assert_eq!(parsed.reports.summary_file, "task_summary_report.txt");
    }

    #[test]
    fn rejects_bad_date_format() {
        let config = Config {
            display: DisplayConfig {
                date_format: "%Q".to_string(),
                history_limit: 0,
            },
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_report_file_with_directory() {
        let mut config = Config::default();
        config.reports.workload_file = "nested/report.txt".to_string();
        assert!(config.validate().is_err());
    }
}
