//! End-to-end tests for the `yaksha` binary
//!
//! Each test runs with HOME pointed at an empty directory and the YAKSHA_*
//! variables cleared, so only the files the test writes affect the run.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const EVENTS: &str = r#"{"event":"run-start"}
{"event":"test-end","title":["TS-1","Business","adds two numbers"],"state":"passed"}
{"event":"test-end","title":["TS-2","Exception","rejects null"],"state":"failed","error":"boom"}
{"event":"run-end"}
"#;

// ============================================================================
// Test Helpers
// ============================================================================

fn yaksha(home: &TempDir) -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("yaksha");
    cmd.env("HOME", home.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("YAKSHA_JSON")
        .env_remove("YAKSHA_CUSTOM_DATA")
        .env_remove("YAKSHA_RECORD_KEY")
        .env_remove("YAKSHA_REMOTE_ENABLED")
        .env_remove("YAKSHA_REMOTE_URL")
        .env_remove("YAKSHA_REMOTE_CODE");
    cmd
}

fn write_events(dir: &Path, content: &str) -> String {
    let path = dir.join("events.jsonl");
    fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

// ============================================================================
// Help
// ============================================================================

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    yaksha(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("record"))
        .stdout(predicate::str::contains("clean"))
        .stdout(predicate::str::contains("send"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_completions_bash() {
    let home = TempDir::new().unwrap();
    yaksha(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("yaksha"));
}

// ============================================================================
// yaksha record
// ============================================================================

#[test]
fn test_record_writes_outputs() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let events = write_events(work.path(), EVENTS);

    yaksha(&home)
        .args(["record", &events, "--dir"])
        .arg(work.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded: 2"));

    assert_eq!(
        fs::read_to_string(work.path().join("output_revised.txt")).unwrap(),
        "ts-1BusinessAddsTwoNumbers=true\n"
    );
    assert_eq!(
        fs::read_to_string(work.path().join("output_exception_revised.txt")).unwrap(),
        "ts-2ExceptionRejectsNull=false\n"
    );
    let log = fs::read_to_string(work.path().join("test.txt")).unwrap();
    assert_eq!(log.lines().count(), 2);
    let manifest = fs::read_to_string(work.path().join("yaksha-test-cases.xml")).unwrap();
    assert!(manifest.contains("<name>ts-2ExceptionRejectsNull</name>"));
}

#[test]
fn test_record_from_stdin_json() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();

    let output = yaksha(&home)
        .args(["record", "-", "--json", "--dir"])
        .arg(work.path())
        .write_stdin(EVENTS)
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["recorded"], 2);
    assert_eq!(json["passed"], 1);
    assert_eq!(json["failed"], 1);
}

#[test]
fn test_record_invalid_event_reports_line() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let events = write_events(work.path(), "{\"event\":\"run-start\"}\n{\"event\":\"nope\"}\n");

    yaksha(&home)
        .args(["record", &events, "--dir"])
        .arg(work.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn test_record_remote_without_code_fails() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let events = write_events(work.path(), EVENTS);

    yaksha(&home)
        .args(["record", &events, "--remote", "--dir"])
        .arg(work.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("remote.code"));

    assert!(!work.path().join("test.txt").exists());
}

// ============================================================================
// yaksha clean
// ============================================================================

#[test]
fn test_clean_removes_outputs() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let events = write_events(work.path(), EVENTS);

    yaksha(&home)
        .args(["record", &events, "--dir"])
        .arg(work.path())
        .assert()
        .success();

    yaksha(&home)
        .args(["clean", "--dir"])
        .arg(work.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed"));

    assert!(!work.path().join("test.txt").exists());
    assert!(!work.path().join("yaksha-test-cases.xml").exists());
    assert!(work.path().join("events.jsonl").exists());
}

// ============================================================================
// yaksha send
// ============================================================================

#[test]
fn test_send_without_code_fails() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();

    yaksha(&home)
        .args(["send", "--dir"])
        .arg(work.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("remote.code"));
}

#[test]
fn test_send_unreachable_endpoint_fails() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let events = write_events(work.path(), EVENTS);

    yaksha(&home)
        .args(["record", &events, "--dir"])
        .arg(work.path())
        .assert()
        .success();

    yaksha(&home)
        .env("YAKSHA_REMOTE_URL", "http://127.0.0.1:9/api")
        .env("YAKSHA_REMOTE_CODE", "secret")
        .args(["send", "--dir"])
        .arg(work.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("2 of 2 sends failed"));
}
