//! Integration tests for CLI argument handling.
//!
//! These tests use `assert_cmd` and exercise only paths that fail fast in
//! validation, before any network request is made.

use assert_cmd::Command;
use predicates::prelude::*;

fn cli() -> Command {
    Command::cargo_bin("ashare-cli").expect("binary exists")
}

#[test]
fn test_help_lists_subcommands() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("screen"))
        .stdout(predicate::str::contains("flow"))
        .stdout(predicate::str::contains("mcp"));
}

#[test]
fn test_screen_help_lists_threshold_flags() {
    cli()
        .args(["screen", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--main-fund-wan"))
        .stdout(predicate::str::contains("--turnover-share"))
        .stdout(predicate::str::contains("--price-change"))
        .stdout(predicate::str::contains("--sort-by"));
}

#[test]
fn test_screen_rejects_unknown_board() {
    cli()
        .args(["screen", "--board", "nasdaq"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("board"));
}

#[test]
fn test_screen_rejects_result_cap_out_of_range() {
    cli()
        .args(["screen", "--max-results", "500"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_results"));
}

#[test]
fn test_screen_rejects_unknown_sort_key() {
    cli()
        .args(["screen", "--sort-by", "volume"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sort_by"));
}

#[test]
fn test_flow_requires_a_code() {
    cli().arg("flow").assert().failure();
}

#[test]
fn test_flow_rejects_invalid_code() {
    cli()
        .args(["flow", "not-a-code"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid stock code"));
}

#[test]
fn test_flow_rejects_days_out_of_range() {
    cli()
        .args(["flow", "600519", "--days", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("days"));
}
