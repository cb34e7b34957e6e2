mod support;

use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

use support::{taskdex_cmd, TestDir};

#[test]
fn taskdex_help_works() {
    taskdex_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("per-user task tracking"));
}

#[test]
fn subcommand_help_works() {
    let subcommands = ["shell", "run", "demo", "config"];

    for cmd in subcommands {
        taskdex_cmd().arg(cmd).arg("--help").assert().success();
    }
}

#[test]
fn demo_walks_through_every_view() {
    let dir = TestDir::new();
    dir.cmd()
        .arg("demo")
        .assert()
        .success()
        .stdout(contains("Registered user Alice (ID: 1)"))
        .stdout(contains("No cycle reachable from Test Module"))
        .stdout(contains("Undid add of task: ::ID::103::Name::Test Module"))
        .stdout(contains("Design Module -> [Implement Module]"))
        .stdout(contains("=== Task Summary Report ==="));
}

#[test]
fn demo_json_emits_envelopes() {
    let dir = TestDir::new();
    dir.cmd()
        .args(["--json", "demo"])
        .assert()
        .success()
        .stdout(contains("\"schema_version\": \"taskdex.v1\""))
        .stdout(contains("\"command\": \"undo\""));
}

#[test]
fn shell_reads_commands_from_stdin() {
    let dir = TestDir::new();
    dir.cmd()
        .arg("shell")
        .write_stdin("register 1 Alice\nadd 1 7 \"Write docs\" -p 4\ntasks 1\nquit\nregister 2 Bob\n")
        .assert()
        .success()
        .stdout(contains("Tasks for user: Alice"))
        .stdout(contains("::ID::7::Name::Write docs::Priority::4"))
        .stdout(contains("Bob").not());
}

#[test]
fn shell_keeps_going_after_errors() {
    let dir = TestDir::new();
    dir.cmd()
        .arg("shell")
        .write_stdin("tasks 3\nregister 3 Carol\ntasks 3\n")
        .assert()
        .success()
        .stderr(contains("error: User not found: 3"))
        .stderr(contains("hint: register 3 <name>"))
        .stdout(contains("Tasks for user: Carol"));
}
