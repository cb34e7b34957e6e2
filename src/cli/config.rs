//! taskdex config command implementation

use std::path::PathBuf;

use crate::config::{Config, CONFIG_FILE};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};

#[derive(serde::Serialize)]
struct InitReport {
    path: PathBuf,
    overwritten: bool,
}

pub fn run_show(config: Config, output: OutputOptions) -> Result<()> {
    let text = toml::to_string_pretty(&config)?;
    let human = HumanOutput::new(format!("Effective configuration\n\n{}", text.trim_end()));
    emit_success(output, "config show", &config, Some(&human))
}

pub fn run_init(path: Option<PathBuf>, force: bool, output: OutputOptions) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => std::env::current_dir()?.join(CONFIG_FILE),
    };

    let exists = path.exists();
    if exists && !force {
        return Err(Error::InvalidArgument(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    Config::default().save(&path)?;
    tracing::info!(path = %path.display(), "wrote default config");

    let mut human = HumanOutput::new(format!("Wrote {}", path.display()));
    if exists {
        human.push_warning("existing file overwritten");
    }
    human.push_next_step("taskdex config show");

    let report = InitReport {
        path,
        overwritten: exists,
    };
    emit_success(output, "config init", &report, Some(&human))
}
