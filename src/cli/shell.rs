//! Session drivers: interactive shell, script files and the demo.

use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal, Write};
use std::path::Path;

use tracing::{info, warn};

use crate::config::{Config, DisplayConfig};
use crate::error::{Error, Result};
use crate::output::{emit_error, emit_success, OutputOptions};
use crate::session::{parse_line, Line, Session, SessionCommand};

const PROMPT: &str = "taskdex> ";

const DEMO_SCRIPT: &str = r#"# Register users
register 1 Alice
register 2 Bob

# Tasks with due dates
add 1 101 "Design Module" --priority 8 --due 2025-05-15
add 1 102 "Implement Module" --priority 6 --due 2025-05-20
add 1 103 "Test Module" --priority 9 --due 2025-05-25

# Dependencies, then a cycle check (none expected)
depend "Test Module" --on "Implement Module"
depend "Implement Module" --on "Design Module"
cycles "Test Module"

tasks 1
priorities

# Undo the most recent task (Test Module)
undo
tasks 1
schedule
history
due-dates
graph
report summary
stats
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Shell { prompt: bool },
    Script { keep_going: bool, echo: bool },
}

enum Step {
    Continue,
    Exit,
}

pub fn run_shell(config: Config, output: OutputOptions) -> Result<()> {
    let stdin = io::stdin();
    let prompt = stdin.is_terminal() && !output.json && !output.quiet;
    let mut session = Session::new(config);
    drive(&mut session, stdin.lock(), "stdin", Mode::Shell { prompt }, output)
}

pub fn run_script(
    config: Config,
    script: &Path,
    keep_going: bool,
    output: OutputOptions,
) -> Result<()> {
    let file = File::open(script)?;
    info!(script = %script.display(), keep_going, "running script");
    let mut session = Session::new(config);
    let label = script.display().to_string();
    drive(
        &mut session,
        BufReader::new(file),
        &label,
        Mode::Script {
            keep_going,
            echo: false,
        },
        output,
    )
}

/// Runs the walkthrough. Dates in the script are ISO, so the configured
/// date format is ignored here.
pub fn run_demo(mut config: Config, output: OutputOptions) -> Result<()> {
    config.display = DisplayConfig::default();
    let mut session = Session::new(config);
    drive(
        &mut session,
        DEMO_SCRIPT.as_bytes(),
        "demo",
        Mode::Script {
            keep_going: false,
            echo: !output.json && !output.quiet,
        },
        output,
    )
}

fn drive<R: BufRead>(
    session: &mut Session,
    input: R,
    label: &str,
    mode: Mode,
    output: OutputOptions,
) -> Result<()> {
    let mut failed = 0;
    let mut first_failure = None;

    show_prompt(mode)?;
    for (idx, line) in input.lines().enumerate() {
        let line = line?;
        let number = idx + 1;

        if let Mode::Script { echo: true, .. } = mode {
            if !line.trim().is_empty() && !line.trim_start().starts_with('#') {
                println!("> {}", line.trim());
            }
        }

        match step(session, &line, output) {
            Ok(Step::Continue) => {}
            Ok(Step::Exit) => break,
            Err(err) => {
                let command = line.split_whitespace().next().unwrap_or("taskdex");
                warn!(source = label, line = number, error = %err, "session command failed");
                if matches!(mode, Mode::Script { .. }) && !output.json {
                    eprintln!("{label}:{number}: {}", line.trim());
                }
                emit_error(command, &err, output.json)?;
                failed += 1;
                first_failure.get_or_insert(number);
                if let Mode::Script {
                    keep_going: false, ..
                } = mode
                {
                    break;
                }
            }
        }
        show_prompt(mode)?;
    }

    match (mode, first_failure) {
        (Mode::Script { .. }, Some(line)) => Err(Error::ScriptFailed { failed, line }),
        _ => Ok(()),
    }
}

fn step(session: &mut Session, line: &str, output: OutputOptions) -> Result<Step> {
    match parse_line(line)? {
        Line::Blank => Ok(Step::Continue),
        Line::Help(text) => {
            if !output.json && !output.quiet {
                println!("{}", text.trim_end());
            }
            Ok(Step::Continue)
        }
        Line::Command(SessionCommand::Exit) => Ok(Step::Exit),
        Line::Command(command) => {
            let result = session.execute(command)?;
            emit_success(output, result.command, &result.data, Some(&result.human))?;
            Ok(Step::Continue)
        }
    }
}

fn show_prompt(mode: Mode) -> Result<()> {
    if let Mode::Shell { prompt: true } = mode {
        let mut stdout = io::stdout();
        write!(stdout, "{PROMPT}")?;
        stdout.flush()?;
    }
    Ok(())
}
