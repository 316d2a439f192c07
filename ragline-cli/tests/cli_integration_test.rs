//! Integration tests driving the built `ragline` binary.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_all_five_subcommands() {
    let mut cmd = Command::cargo_bin("ragline").unwrap();
    cmd.arg("--help");
    cmd.assert().success().stdout(
        predicate::str::contains("ask")
            .and(predicate::str::contains("update"))
            .and(predicate::str::contains("stats"))
            .and(predicate::str::contains("eval"))
            .and(predicate::str::contains("logs")),
    );
}

#[test]
fn logs_on_a_fresh_project_prints_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("ragline").unwrap();
    cmd.env("RAG_DATA_ROOT", dir.path())
        .arg("--project")
        .arg("fresh-project")
        .arg("logs");
    cmd.assert().success().stdout(predicate::str::is_empty());
}

#[test]
fn eval_without_suite_flag_fails_with_exit_code_one() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("ragline").unwrap();
    cmd.env("RAG_DATA_ROOT", dir.path()).arg("eval");
    cmd.assert().failure().code(1);
}

#[test]
fn update_reports_the_configured_project() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("ragline").unwrap();
    cmd.env("RAG_DATA_ROOT", dir.path())
        .arg("--project")
        .arg("acme")
        .arg("update");
    cmd.assert().success().stdout(predicate::str::contains("acme"));
}
