//! End-to-end tests for CLI exit codes.
//!
//! These tests verify that the CLI returns the exit codes documented in
//! [`merge_wizard::exit_codes`]:
//!
//! - Exit code 0: Clean completion
//! - Exit code 1: Aborted before producing a trustworthy output
//! - Exit code 2: Invalid command-line usage (handled by clap)
//! - Exit code 3: Completed with per-file errors

mod common;
use common::prelude::*;

/// Exit code 0 is returned for --help.
#[test]
fn test_exit_code_help() {
    let mut cmd = cargo_bin_cmd!("merge-wizard");

    cmd.arg("--help").assert().code(0);
}

/// Exit code 0 is returned for --version.
#[test]
fn test_exit_code_version() {
    let mut cmd = cargo_bin_cmd!("merge-wizard");

    cmd.arg("--version")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("merge-wizard"));
}

/// Exit code 0 is returned for a clean merge.
#[test]
fn test_exit_code_clean_merge() {
    let fixture = TestFixture::new().with_source_file("a.txt", "a");

    fixture
        .merge()
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Merge completed"));
}

/// Exit code 3 is returned when a file could not be read but the run finished.
#[test]
#[cfg(target_os = "linux")]
fn test_exit_code_completed_with_errors() {
    let fixture = TestFixture::new()
        .with_source_file("locked.cfg", "x")
        .with_shared_file("keep.txt", "keep");
    // Reading /proc/self/mem from offset 0 fails with EIO, even as root.
    std::os::unix::fs::symlink("/proc/self/mem", fixture.base().join("locked.cfg")).unwrap();

    fixture
        .merge()
        .assert()
        .code(3)
        .stdout(predicate::str::contains("1 errors"));

    assert_eq!(fixture.read_output("keep.txt"), "keep");
    let report = fixture.read_report();
    assert!(report.contains("ERROS: 1"));
    assert!(report.ends_with("STATUS: COMPLETED WITH 1 ERRORS\n"));
}

/// Exit code 2 is returned for unknown subcommands.
#[test]
fn test_exit_code_unknown_subcommand() {
    let mut cmd = cargo_bin_cmd!("merge-wizard");

    cmd.arg("frobnicate").assert().code(2);
}

/// Exit code 2 is returned for an invalid mode value.
#[test]
fn test_exit_code_invalid_mode() {
    let fixture = TestFixture::new();

    fixture.merge().args(["--mode", "rebase"]).assert().code(2);
}

/// Exit code 1 is returned when BASE does not exist; nothing is written.
#[test]
fn test_exit_code_missing_base() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .arg("merge")
        .arg(fixture.path().join("missing"))
        .arg(fixture.source())
        .arg("--output")
        .arg(fixture.output())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("BASE directory not found"));

    assert!(!fixture.output().exists());
}

/// Exit code 1 is returned when the output lies inside BASE.
#[test]
fn test_exit_code_output_inside_base() {
    let fixture = TestFixture::new().with_base_file("a.txt", "a");

    fixture
        .command()
        .arg("merge")
        .arg(fixture.base())
        .arg(fixture.source())
        .arg("--output")
        .arg(fixture.base().join("merged"))
        .assert()
        .code(1);

    assert!(!fixture.base().join("merged").exists());
}

/// Exit code 1 is returned when the output exists and nobody can confirm.
#[test]
fn test_exit_code_existing_output_without_force() {
    let fixture = TestFixture::new().with_source_file("a.txt", "a");
    fixture.child("merged/keep.txt").write_str("mine").unwrap();

    fixture
        .merge()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--force"));

    assert_eq!(fixture.read_output("keep.txt"), "mine");
}

/// Exit code 0 is returned when --force replaces an existing output.
#[test]
fn test_exit_code_existing_output_with_force() {
    let fixture = TestFixture::new().with_source_file("a.txt", "a");
    fixture.child("merged/stale.txt").write_str("old").unwrap();

    fixture.merge().arg("--force").assert().code(0);

    assert!(!fixture.output().join("stale.txt").exists());
    assert_eq!(fixture.read_output("a.txt"), "a");
}

/// Exit code 1 is returned when more than one source is combined with an empty seed.
#[test]
fn test_exit_code_multi_source_empty_seed() {
    let fixture = TestFixture::new().with_second_source_file("b.txt", "b");

    fixture
        .command()
        .arg("merge")
        .arg(fixture.base())
        .arg(fixture.source())
        .arg(fixture.second_source())
        .arg("--output")
        .arg(fixture.output())
        .args(["--seed", "empty"])
        .assert()
        .code(1);
}
