//! Integration tests for the chit CLI subcommands.

#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const FATIGUE: &str = r#"{
    "character": "Swordsman",
    "policy": { "kind": "fatigue", "target": 3 },
    "chits": [
        { "id": "move1", "tags": ["move"], "effort": 1 },
        { "id": "fight2", "tags": ["fight"], "effort": 2 }
    ],
    "steps": [ { "click": "fight2" }, { "click": "move1" } ]
}"#;

const REST: &str = r#"{
    "policy": { "kind": "rest", "target": 2 },
    "chits": [
        { "id": "move0", "tags": ["move"], "effort": 0, "state": "wounded" }
    ],
    "steps": [ { "click": "move0" } ]
}"#;

/// Write a script into a fresh temp directory.
fn script(json: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");
    fs::write(&path, json).unwrap();
    (dir, path)
}

fn chits() -> Command {
    Command::cargo_bin("chits").unwrap()
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[test]
fn run_complete_fatigue_session() {
    let (_dir, path) = script(FATIGUE);
    chits()
        .arg("run")
        .arg(&path)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("fatigue session for Swordsman")
                .and(predicate::str::contains("Fatigued: fight2, move1"))
                .and(predicate::str::contains("committed")),
        );
}

#[test]
fn run_json_prints_commit() {
    let (_dir, path) = script(FATIGUE);
    let output = chits().arg("run").arg(&path).arg("--json").output().unwrap();
    assert!(output.status.success());
    let commit: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(commit["unused"], 0);
    assert_eq!(commit["chits"][1]["state"], "fatigued");
    assert_eq!(commit["log"]["moved"]["fatigued"][0], "fight2");
}

#[test]
fn run_incomplete_session_fails() {
    let json = FATIGUE.replace(r#", { "click": "move1" }"#, "");
    let (_dir, path) = script(&json);
    chits()
        .arg("run")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("session not complete"));
}

#[test]
fn run_rest_early_exit_needs_force() {
    let (_dir, path) = script(REST);
    chits()
        .arg("run")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("session not complete"));

    chits()
        .args(["run", "--force"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 left unused"));
}

#[test]
fn run_unknown_chit_fails() {
    let json = FATIGUE.replace(r#"{ "click": "move1" }"#, r#"{ "click": "ghost" }"#);
    let (_dir, path) = script(&json);
    chits()
        .arg("run")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown chit: ghost"));
}

#[test]
fn run_missing_file_fails() {
    chits()
        .args(["run", "/nonexistent/session.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read script"));
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_reports_completion() {
    let (_dir, path) = script(FATIGUE);
    chits()
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("capacity:  3")
                .and(predicate::str::contains("2 steps, 2 clicks"))
                .and(predicate::str::contains("session completes")),
        );
}

#[test]
fn check_reports_clamped_target() {
    let json = FATIGUE.replace(r#""target": 3"#, r#""target": 9"#);
    let (_dir, path) = script(&json);
    chits()
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("target clamped to 3"));
}

#[test]
fn check_malformed_script_fails() {
    let (_dir, path) = script("{ \"policy\": ");
    chits()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid script"));
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

#[test]
fn init_writes_checkable_template() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rest.json");
    chits()
        .args(["init", "--policy", "rest"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created rest session script"));

    chits()
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("commit needs --force"));
}

#[test]
fn init_fails_if_file_exists() {
    let (_dir, path) = script(FATIGUE);
    chits()
        .arg("init")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}
