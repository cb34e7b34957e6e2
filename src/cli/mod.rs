//! Command-line interface for taskdex
//!
//! This module defines the CLI structure using clap derive macros. The
//! session grammar itself lives in [`crate::session`]; the subcommands here
//! only decide where session lines come from.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::Result;
use crate::output::OutputOptions;

mod config;
mod shell;

/// taskdex - per-user task tracking with undo/redo and dependency checks
///
/// State lives in memory for the length of one session. Use `shell` for an
/// interactive session, `run` to replay a script, or `demo` for a tour.
#[derive(Parser, Debug)]
#[command(name = "taskdex")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a config file (defaults to ./.taskdex.toml)
    #[arg(long, global = true, env = "TASKDEX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive session reading commands from stdin
    Shell,

    /// Run session commands from a script file
    Run {
        /// Script with one session command per line
        script: PathBuf,

        /// Continue past failing commands
        #[arg(long)]
        keep_going: bool,
    },

    /// Run the built-in walkthrough
    Demo,

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    fn output(&self) -> OutputOptions {
        OutputOptions {
            json: self.json,
            quiet: self.quiet,
        }
    }

    fn load_config(&self) -> Result<Config> {
        let cwd = std::env::current_dir()?;
        Config::resolve(self.config.as_deref(), &cwd)
    }

    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let output = self.output();
        match &self.command {
            Commands::Shell => shell::run_shell(self.load_config()?, output),
            Commands::Run { script, keep_going } => {
                shell::run_script(self.load_config()?, script, *keep_going, output)
            }
            Commands::Demo => shell::run_demo(self.load_config()?, output),
            Commands::Config(ConfigCommands::Show) => {
                config::run_show(self.load_config()?, output)
            }
            Commands::Config(ConfigCommands::Init { force }) => {
                config::run_init(self.config.clone(), *force, output)
            }
        }
    }
}
