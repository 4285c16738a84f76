// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `clankers query` specs against the built binary.

use assert_cmd::Command;

use clankers_core::SessionPayload;
use clankers_storage::Storage;

fn clankers(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("clankers").expect("binary");
    cmd.env("CLANKERS_DATA_PATH", dir);
    cmd
}

/// Seed the database the way the daemon would lay it out.
fn seed(dir: &std::path::Path) {
    let db_path = dir.join("clankers").join("clankers.db");
    let storage = Storage::open(&db_path).expect("open");
    for (id, title, at) in [("s1", "First", 100), ("s2", "Second", 200)] {
        storage
            .upsert_session(&SessionPayload {
                id: id.to_string(),
                title: Some(title.to_string()),
                created_at: Some(at),
                ..Default::default()
            })
            .expect("seed");
    }
}

#[test]
fn select_prints_rows_as_table() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());

    clankers(dir.path())
        .args(["query", "SELECT id, title FROM sessions ORDER BY created_at"])
        .assert()
        .success()
        .stdout(predicates::str::contains("First"))
        .stdout(predicates::str::contains("Second"))
        .stdout(predicates::str::contains("(2 rows)"));
}

#[test]
fn select_prints_rows_as_json() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());

    let output = clankers(dir.path())
        .args(["query", "SELECT id FROM sessions ORDER BY created_at DESC", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let rows: serde_json::Value = serde_json::from_slice(&output).expect("json output");
    assert_eq!(rows[0]["id"], "s2");
    assert_eq!(rows[1]["id"], "s1");
}

#[test]
fn write_statement_is_rejected_with_exit_one() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());

    clankers(dir.path())
        .args(["query", "DELETE FROM sessions"])
        .assert()
        .code(1)
        .stderr(predicates::str::contains("DELETE statements are blocked"));

    // Gate fired before the database: nothing was deleted
    clankers(dir.path())
        .args(["query", "SELECT COUNT(*) AS n FROM sessions"])
        .assert()
        .success()
        .stdout(predicates::str::contains("2"));
}

#[test]
fn non_select_statement_gets_generic_message() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());

    clankers(dir.path())
        .args(["query", "EXPLAIN SELECT 1"])
        .assert()
        .code(1)
        .stderr(predicates::str::contains("only SELECT/WITH queries are allowed"));
}

#[test]
fn unknown_column_gets_a_hint() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());

    clankers(dir.path())
        .args(["query", "SELECT tokens FROM sessions"])
        .assert()
        .code(1)
        .stderr(predicates::str::contains("no such column"))
        .stderr(predicates::str::contains("did you mean: prompt_tokens, completion_tokens?"));
}

#[test]
fn missing_database_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();

    clankers(dir.path())
        .args(["query", "SELECT 1"])
        .assert()
        .code(1)
        .stderr(predicates::str::contains("no database found"));
}
