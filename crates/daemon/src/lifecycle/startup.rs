// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup and initialization logic.

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use fs2::FileExt;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use clankers_core::{LogEntry, LogLevel, SystemClock};
use clankers_logger::{spawn_sweeper, Logger};
use clankers_storage::{ensure_db, Storage};

use super::{DaemonConfig, DaemonState, LifecycleError, StartupResult};
use crate::listener::Listener;

/// Start the daemon: lock, logger, sweeper, storage, listener bind.
pub async fn startup(config: &DaemonConfig) -> Result<StartupResult, LifecycleError> {
    match startup_inner(config).await {
        Ok(result) => Ok(result),
        Err(e) => {
            // Don't clean up if we failed to acquire the lock —
            // those files belong to the already-running daemon.
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

async fn startup_inner(config: &DaemonConfig) -> Result<StartupResult, LifecycleError> {
    // 1. Create the data directory (needed for lock, socket, db)
    std::fs::create_dir_all(&config.data_dir)?;

    // 2. Acquire the lock file FIRST - prevents races.
    // Open without truncating so a failed lock doesn't wipe the running
    // daemon's PID.
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file.try_lock_exclusive().map_err(LifecycleError::LockFailed)?;

    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file; // Drop mutability

    // 3. Structured logger. Initialisation failure falls back to stderr;
    // the daemon must not refuse to boot because of logs.
    let logger = match Logger::open(&config.log_dir, config.min_log_level, SystemClock) {
        Ok(logger) => logger,
        Err(e) => {
            warn!("structured logger init failed, falling back to stderr: {}", e);
            Logger::stderr(config.min_log_level, SystemClock)
        }
    };

    // 4. Retention sweeper: runs immediately, then every 24 hours
    let sweeper_cancel = CancellationToken::new();
    spawn_sweeper(config.log_dir.clone(), sweeper_cancel.clone());

    // 5. Storage: ensure schema, then open the single connection
    let created = ensure_db(&config.db_path)?;
    if created {
        info!(path = %config.db_path.display(), "created database");
    }
    let storage = Arc::new(Mutex::new(Storage::open(&config.db_path)?));

    // 6. Bind the listener LAST - only after all validation passes
    let listener = Listener::bind(config, Arc::clone(&storage), logger.clone()).await?;

    let _ = logger.write(LogEntry::new(LogLevel::Info, "daemon", "daemon started"));
    info!("daemon started");

    Ok(StartupResult {
        daemon: DaemonState {
            config: config.clone(),
            lock_file,
            storage,
            logger,
            sweeper_cancel,
            start_time: Instant::now(),
        },
        listener,
    })
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &DaemonConfig) {
    #[cfg(unix)]
    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }

    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

#[cfg(test)]
#[path = "startup_tests.rs"]
mod tests;
