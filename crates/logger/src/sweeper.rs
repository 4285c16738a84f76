// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retention sweeper: best-effort deletion of old daily log files.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Files strictly older than this are removed.
pub const RETENTION: Duration = Duration::from_secs(30 * 24 * 60 * 60);

const SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Spawn the sweeper task: one sweep immediately, then every 24 hours,
/// until the token is cancelled.
pub fn spawn_sweeper(dir: PathBuf, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("retention sweeper stopped");
                    break;
                }
                _ = interval.tick() => {
                    sweep(&dir, RETENTION);
                }
            }
        }
    })
}

/// Remove `clankers-*.jsonl` regular files in `dir` whose modification
/// time is strictly older than `retention`. Subdirectories, other names
/// and every error are ignored; this is a housekeeper, not a guarantee.
pub fn sweep(dir: &Path, retention: Duration) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    let now = SystemTime::now();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.starts_with("clankers-") || !name.ends_with(".jsonl") {
            continue;
        }
        let age = entry
            .metadata()
            .and_then(|m| m.modified())
            .ok()
            .and_then(|mtime| now.duration_since(mtime).ok());
        if let Some(age) = age {
            if age > retention {
                debug!(file = name, "removing expired log file");
                let _ = std::fs::remove_file(&path);
            }
        }
    }
}

#[cfg(test)]
#[path = "sweeper_tests.rs"]
mod tests;
