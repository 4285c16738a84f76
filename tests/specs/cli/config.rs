// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `clankers config` specs against the built binary.

use assert_cmd::Command;

fn clankers(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("clankers").expect("binary");
    cmd.env("CLANKERS_DATA_PATH", dir);
    cmd.env_remove("CLANKERS_ENDPOINT");
    cmd.env_remove("CLANKERS_SYNC_ENABLED");
    cmd
}

#[test]
fn list_shows_defaults() {
    let dir = tempfile::tempdir().unwrap();
    clankers(dir.path())
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicates::str::contains("endpoint = "))
        .stdout(predicates::str::contains("sync_enabled = false"))
        .stdout(predicates::str::contains("sync_interval = 30"))
        .stdout(predicates::str::contains("auth = none"));
}

#[test]
fn set_then_get_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    clankers(dir.path())
        .args(["config", "set", "endpoint", "https://example.com"])
        .assert()
        .success();
    clankers(dir.path())
        .args(["config", "get", "endpoint"])
        .assert()
        .success()
        .stdout(predicates::str::contains("https://example.com"));
}

#[test]
fn set_invalid_boolean_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    clankers(dir.path())
        .args(["config", "set", "sync_enabled", "maybe"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("invalid value"));
}

#[test]
fn get_unknown_key_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    clankers(dir.path())
        .args(["config", "get", "nope"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("unknown config key"));
}

#[test]
fn profiles_list_marks_active() {
    let dir = tempfile::tempdir().unwrap();
    clankers(dir.path())
        .args(["config", "profiles", "list"])
        .assert()
        .success()
        .stdout(predicates::str::contains("* default"));
}

#[test]
fn profiles_use_unknown_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    clankers(dir.path())
        .args(["config", "profiles", "use", "ghost"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("profile not found"));
}

#[test]
fn profiles_create_use_delete_cycle() {
    let dir = tempfile::tempdir().unwrap();
    clankers(dir.path())
        .args(["config", "profiles", "create", "work"])
        .assert()
        .success();
    clankers(dir.path())
        .args(["config", "profiles", "use", "work"])
        .assert()
        .success();
    clankers(dir.path())
        .args(["config", "profiles", "list"])
        .assert()
        .success()
        .stdout(predicates::str::contains("* work"));
    // Deleting the active profile falls back to default
    clankers(dir.path())
        .args(["config", "profiles", "delete", "work"])
        .assert()
        .success();
    clankers(dir.path())
        .args(["config", "profiles", "list"])
        .assert()
        .success()
        .stdout(predicates::str::contains("* default"));
}

#[test]
fn default_profile_cannot_be_deleted() {
    let dir = tempfile::tempdir().unwrap();
    clankers(dir.path())
        .args(["config", "profiles", "delete", "default"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("cannot delete"));
}
