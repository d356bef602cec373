// Regression tests for the inkparse binary against tests/fixtures.
// Requires: assert_cmd, predicates crates in [dev-dependencies]

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

fn inkparse() -> Command {
    Command::cargo_bin("inkparse").unwrap()
}

#[test]
fn cli_prints_outline_for_clean_story() {
    inkparse()
        .args(["parse", "tests/fixtures/story.ink"])
        .assert()
        .success()
        .stdout(
            contains(r#"(seq ["inn"] ["tavern"])"#)
                .and(contains(r#"(var gold 3)"#))
                .and(contains(r#"(include "chapter.ink" ["#))
                .and(contains("glue")),
        );
}

#[test]
fn cli_prints_json_tree() {
    inkparse()
        .args(["parse", "--json", "tests/fixtures/story.ink"])
        .assert()
        .success()
        .stdout(contains(r#""kind": "sequence""#).and(contains(r#""kind": "include""#)));
}

#[test]
fn cli_reports_miette_diagnostics_on_error() {
    inkparse()
        .args(["parse", "tests/fixtures/broken/broken.ink"])
        .assert()
        .failure()
        .stdout(contains(r#""Fine line\n""#))
        .stderr(
            contains("Included file not found: missing.ink")
                .and(contains("inkparse::parse::include_not_found"))
                .and(contains("Expected inner logic or sequence")),
        );
}

#[test]
fn cli_check_summarises_directory() {
    inkparse()
        .args(["check", "tests/fixtures"])
        .assert()
        .failure()
        .stdout(
            contains("story.ink")
                .and(contains("broken.ink"))
                .and(contains("✓ Passed: 2 files"))
                .and(contains("✗ Failed: 1 files")),
        );
}

#[test]
fn cli_check_single_clean_file_succeeds() {
    inkparse()
        .args(["check", "tests/fixtures/chapter.ink"])
        .assert()
        .success()
        .stdout(contains("✓ Passed: 1 files"));
}

#[test]
fn cli_accepts_config_file() {
    inkparse()
        .args([
            "parse",
            "--config",
            "tests/fixtures/config.yaml",
            "tests/fixtures/story.ink",
        ])
        .assert()
        .success();
}

#[test]
fn cli_rejects_unknown_config_keys() {
    inkparse()
        .args([
            "--config",
            "tests/fixtures/bad_config.yaml",
            "parse",
            "tests/fixtures/story.ink",
        ])
        .assert()
        .failure()
        .stderr(contains("Invalid configuration"));
}

#[test]
fn cli_reports_unreadable_file() {
    inkparse()
        .args(["parse", "tests/fixtures/no_such_story.ink"])
        .assert()
        .failure()
        .stderr(contains("Failed to read").and(contains("inkparse::io")));
}
