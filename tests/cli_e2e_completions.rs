//! End-to-end tests for the `completions` command.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_bash_completions_mention_subcommands() {
    let mut cmd = cargo_bin_cmd!("merge-wizard");

    cmd.args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("merge-wizard"))
        .stdout(predicate::str::contains("compare"));
}

#[test]
fn test_zsh_completions() {
    let mut cmd = cargo_bin_cmd!("merge-wizard");

    cmd.args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef merge-wizard"));
}

#[test]
fn test_unknown_shell_is_usage_error() {
    let mut cmd = cargo_bin_cmd!("merge-wizard");

    cmd.args(["completions", "tcsh"]).assert().code(2);
}
