// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle specs: startup, health, retention, fire-and-forget,
//! shutdown.

use crate::specs::support::{enveloped, TestDaemon};
use serde_json::json;
use std::time::{Duration, SystemTime};

#[tokio::test]
async fn daemon_serves_health_and_db_path() {
    let dir = tempfile::tempdir().unwrap();
    let daemon = TestDaemon::start(dir.path()).await;

    let response = daemon.call("health", json!({})).await;
    let result = response.result.unwrap();
    assert_eq!(result["ok"], true);
    assert!(result["version"].is_string());

    let response = daemon.call("getDbPath", json!({})).await;
    let result = response.result.unwrap();
    assert_eq!(result["dbPath"], daemon.config.db_path.to_string_lossy().as_ref());

    daemon.stop().await;
}

#[tokio::test]
async fn startup_sweeps_expired_log_files() {
    let dir = tempfile::tempdir().unwrap();
    let logs = dir.path().join("logs");
    std::fs::create_dir_all(&logs).unwrap();

    // One expired file, one recent file, pre-seeded before startup
    let old = logs.join("clankers-2024-12-01.jsonl");
    let recent = logs.join("clankers-2024-12-31.jsonl");
    for (path, age_days) in [(&old, 31u64), (&recent, 1u64)] {
        std::fs::write(path, "{}\n").unwrap();
        let file = std::fs::OpenOptions::new().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(age_days * 24 * 60 * 60))
            .unwrap();
    }

    let daemon = TestDaemon::start(dir.path()).await;

    // The sweeper's first pass runs immediately after startup
    for _ in 0..100 {
        if !old.exists() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(!old.exists(), "expired file should be swept");
    assert!(recent.exists(), "recent file must survive");

    daemon.stop().await;
}

#[tokio::test]
async fn fire_and_forget_log_write_lands_in_todays_file() {
    let dir = tempfile::tempdir().unwrap();
    let daemon = TestDaemon::start(dir.path()).await;

    daemon
        .fire_and_forget(
            "log.write",
            enveloped("entry", json!({ "level": "info", "message": "fire and forget" })),
        )
        .await;

    // The daemon processes the frame even though the peer is gone
    let today = clankers_core::paths::log_file_name(chrono_today());
    let path = daemon.config.log_dir.join(today);
    let mut content = String::new();
    for _ in 0..100 {
        content = std::fs::read_to_string(&path).unwrap_or_default();
        if content.contains("fire and forget") {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(content.contains("fire and forget"));
    assert!(content.contains("\"component\":\"spec-client\""));

    daemon.stop().await;
}

#[tokio::test]
async fn shutdown_removes_socket_and_pid_files() {
    let dir = tempfile::tempdir().unwrap();
    let daemon = TestDaemon::start(dir.path()).await;
    let socket = daemon.config.socket_path.clone();
    let lock = daemon.config.lock_path.clone();
    assert!(socket.exists());
    assert!(lock.exists());

    daemon.stop().await;

    assert!(!socket.exists());
    assert!(!lock.exists());
}

fn chrono_today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}
