// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `clankers sessions` specs against the built binary.

use assert_cmd::Command;

use clankers_core::{MessagePayload, SessionPayload};
use clankers_storage::Storage;

fn clankers(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("clankers").expect("binary");
    cmd.env("CLANKERS_DATA_PATH", dir);
    cmd
}

fn seed(dir: &std::path::Path) {
    let db_path = dir.join("clankers").join("clankers.db");
    let storage = Storage::open(&db_path).expect("open");
    storage
        .upsert_session(&SessionPayload {
            id: "s1".to_string(),
            title: Some("Refactor pass".to_string()),
            source: Some("claude-code".to_string()),
            status: Some("active".to_string()),
            created_at: Some(100),
            ..Default::default()
        })
        .expect("seed session");
    storage
        .upsert_message(&MessagePayload {
            id: "m1".to_string(),
            session_id: "s1".to_string(),
            role: Some("user".to_string()),
            text_content: Some("please refactor".to_string()),
            created_at: Some(101),
            ..Default::default()
        })
        .expect("seed message");
}

#[test]
fn list_shows_sessions_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());

    clankers(dir.path())
        .args(["sessions"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Refactor pass"))
        .stdout(predicates::str::contains("claude-code"));
}

#[test]
fn show_prints_session_and_messages() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());

    clankers(dir.path())
        .args(["sessions", "show", "s1"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Session: s1"))
        .stdout(predicates::str::contains("Messages (1):"))
        .stdout(predicates::str::contains("please refactor"));
}

#[test]
fn show_unknown_session_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());

    clankers(dir.path())
        .args(["sessions", "show", "ghost"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("session not found"));
}

#[test]
fn empty_database_prints_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("clankers").join("clankers.db");
    Storage::open(&db_path).expect("open");

    clankers(dir.path())
        .args(["sessions"])
        .assert()
        .success()
        .stdout(predicates::str::contains("No sessions recorded."));
}
