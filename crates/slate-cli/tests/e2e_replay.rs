//! E2E CLI tests for the replay surface: snapshot application, ordering,
//! truncation, closed-list removal, and failure modes.
//!
//! Each test runs the `slate` binary as a subprocess against snapshot files
//! written into an isolated temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

/// Build a Command targeting the slate binary, rooted in `dir`.
fn slate_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("slate"));
    cmd.current_dir(dir);
    // Suppress tracing output that goes to stderr
    cmd.env("SLATE_LOG", "error");
    cmd
}

/// Write a snapshot payload to `name` inside `dir`, returning its path.
fn write_snapshot(dir: &Path, name: &str, payload: &Value) -> PathBuf {
    let path = dir.join(name);
    let bytes = serde_json::to_vec_pretty(payload).expect("payload serializes");
    std::fs::write(&path, bytes).expect("snapshot file should write");
    path
}

fn event_poll() -> Value {
    json!({"events": [
        {"id": 1, "description": "Merge #1", "status": "succeeded", "sort_key": 100,
         "job_groups": [[{"id": 10, "status": "succeeded", "info": "build"}]]},
        {"id": 2, "description": "Merge #2", "status": "running", "sort_key": 200,
         "job_groups": []}
    ]})
}

fn status_poll() -> Value {
    json!({"repo_status": [{
        "id": 5, "name": "moose", "url": "https://example.com/moose", "description": "",
        "branches": [{"id": 50, "name": "devel", "url": "", "status": "succeeded"}],
        "prs": [{"id": 7, "number": 1021, "title": "Fix flux kernels", "user": "alice",
                 "url": "", "status": "running", "description": ""}],
        "badges": [{"id": 90, "status": "succeeded"}]
    }], "closed": []})
}

// ---------------------------------------------------------------------------
// Happy paths
// ---------------------------------------------------------------------------

#[test]
fn replay_prints_events_most_recent_first() {
    let tmp = TempDir::new().expect("temp dir");
    let events = write_snapshot(tmp.path(), "events.json", &event_poll());

    let output = slate_cmd(tmp.path())
        .arg("replay")
        .arg(&events)
        .output()
        .expect("replay should not crash");
    assert!(
        output.status.success(),
        "replay failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let newer = stdout.find("Merge #2").expect("event 2 listed");
    let older = stdout.find("Merge #1").expect("event 1 listed");
    assert!(newer < older, "most recent event prints first");
}

#[test]
fn replay_json_reports_the_ordered_board() {
    let tmp = TempDir::new().expect("temp dir");
    let events = write_snapshot(tmp.path(), "events.json", &event_poll());
    let status = write_snapshot(tmp.path(), "status.json", &status_poll());

    let output = slate_cmd(tmp.path())
        .arg("replay")
        .arg(&events)
        .arg(&status)
        .arg("--json")
        .output()
        .expect("replay should not crash");
    assert!(output.status.success());

    let board: Value =
        serde_json::from_slice(&output.stdout).expect("replay --json should produce valid JSON");
    assert_eq!(board["events"][0]["id"].as_u64(), Some(2));
    assert_eq!(board["events"][1]["id"].as_u64(), Some(1));
    assert_eq!(board["repositories"][0]["name"].as_str(), Some("moose"));
    assert_eq!(
        board["repositories"][0]["prs"][0]["number"].as_u64(),
        Some(1021)
    );
}

#[test]
fn limit_flag_truncates_the_window() {
    let tmp = TempDir::new().expect("temp dir");
    let events = write_snapshot(tmp.path(), "events.json", &event_poll());

    let output = slate_cmd(tmp.path())
        .args(["replay", "--limit", "1", "--json"])
        .arg(&events)
        .output()
        .expect("replay should not crash");
    assert!(output.status.success());

    let board: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    let listed = board["events"].as_array().expect("events array");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"].as_u64(), Some(2));
}

#[test]
fn closed_snapshot_removes_the_pull() {
    let tmp = TempDir::new().expect("temp dir");
    let status = write_snapshot(tmp.path(), "status.json", &status_poll());
    let closed = write_snapshot(
        tmp.path(),
        "closed.json",
        &json!({"repo_status": [], "closed": [{"id": 7}]}),
    );

    let output = slate_cmd(tmp.path())
        .arg("replay")
        .arg(&status)
        .arg(&closed)
        .arg("--json")
        .output()
        .expect("replay should not crash");
    assert!(output.status.success());

    let board: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    let prs = board["repositories"][0]["prs"].as_array().expect("prs array");
    assert!(prs.is_empty(), "closed pull should be gone from the board");
}

#[test]
fn stats_flag_reports_each_apply() {
    let tmp = TempDir::new().expect("temp dir");
    let events = write_snapshot(tmp.path(), "events.json", &event_poll());

    slate_cmd(tmp.path())
        .args(["replay", "--stats"])
        .arg(&events)
        .assert()
        .success()
        .stderr(predicate::str::contains("merged 2"));
}

#[test]
fn empty_snapshot_replays_clean() {
    let tmp = TempDir::new().expect("temp dir");
    let empty = write_snapshot(tmp.path(), "empty.json", &json!({"events": []}));

    slate_cmd(tmp.path())
        .arg("replay")
        .arg(&empty)
        .assert()
        .success()
        .stdout(predicate::str::contains("(none)"));
}

#[test]
fn completions_generate_for_bash() {
    let tmp = TempDir::new().expect("temp dir");
    slate_cmd(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("slate"));
}

// ---------------------------------------------------------------------------
// Failure modes
// ---------------------------------------------------------------------------

#[test]
fn missing_snapshot_file_fails() {
    let tmp = TempDir::new().expect("temp dir");
    slate_cmd(tmp.path())
        .args(["replay", "no-such-file.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read snapshot"));
}

#[test]
fn non_json_snapshot_fails() {
    let tmp = TempDir::new().expect("temp dir");
    let path = tmp.path().join("broken.json");
    std::fs::write(&path, "not json at all").expect("file should write");

    slate_cmd(tmp.path())
        .arg("replay")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not valid JSON"));
}

#[test]
fn unrecognized_envelope_fails() {
    let tmp = TempDir::new().expect("temp dir");
    let stray = write_snapshot(tmp.path(), "stray.json", &json!({"foo": []}));

    slate_cmd(tmp.path())
        .arg("replay")
        .arg(&stray)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "neither an event nor a status envelope",
        ));
}

#[test]
fn structurally_invalid_snapshot_fails_loud() {
    let tmp = TempDir::new().expect("temp dir");
    let bad = write_snapshot(tmp.path(), "bad.json", &json!({"events": 17}));

    slate_cmd(tmp.path())
        .arg("replay")
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to apply snapshot"));
}
