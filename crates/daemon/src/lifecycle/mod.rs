// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, run loop, shutdown.

mod startup;
pub use startup::startup;

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use clankers_core::{LogLevel, PathError, SystemClock};
use clankers_logger::{Logger, LoggerError};
use clankers_storage::{Storage, StorageError};

use crate::listener::Listener;

/// Resolved daemon configuration.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Application data directory (e.g. ~/.local/share/clankers)
    pub data_dir: PathBuf,
    /// Path to the SQLite database file
    pub db_path: PathBuf,
    /// Path to the Unix socket (TCP address text on Windows)
    pub socket_path: PathBuf,
    /// Directory for daily JSON-Lines log files
    pub log_dir: PathBuf,
    /// Path to the lock/PID file
    pub lock_path: PathBuf,
    /// Path to the daemon's own operational log
    pub daemon_log_path: PathBuf,
    /// Minimum structured-log level
    pub min_log_level: LogLevel,
}

impl DaemonConfig {
    /// Resolve all locations from the environment. One daemon serves the
    /// whole data root; flags are applied upstream by exporting the
    /// matching `CLANKERS_*` variables before calling this.
    pub fn load() -> Result<Self, LifecycleError> {
        let data_dir = clankers_core::paths::data_dir()?;
        Ok(Self {
            db_path: clankers_core::paths::db_path()?,
            socket_path: clankers_core::paths::socket_path()?,
            log_dir: clankers_core::paths::log_dir()?,
            lock_path: data_dir.join("daemon.pid"),
            daemon_log_path: data_dir.join("daemon.log"),
            min_log_level: crate::env::log_level(),
            data_dir,
        })
    }
}

/// Daemon state during operation.
pub struct DaemonState {
    pub config: DaemonConfig,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    /// The single storage connection, shared with the listener
    pub storage: Arc<Mutex<Storage>>,
    /// Structured log sink shared with the listener
    pub logger: Logger<SystemClock>,
    /// Stops the retention sweeper
    sweeper_cancel: CancellationToken,
    /// When the daemon started
    pub start_time: Instant,
}

/// Result of daemon startup: state plus the bound listener to spawn.
pub struct StartupResult {
    pub daemon: DaemonState,
    pub listener: Listener,
}

impl DaemonState {
    /// Shutdown the daemon gracefully: stop the sweeper, drop the socket
    /// file and the PID file. The storage connection and log file close
    /// when the state is dropped.
    pub fn shutdown(&mut self) {
        info!("shutting down daemon");

        self.sweeper_cancel.cancel();

        #[cfg(unix)]
        if self.config.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.socket_path) {
                warn!("failed to remove socket file: {}", e);
            }
        }

        if self.config.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.lock_path) {
                warn!("failed to remove PID file: {}", e);
            }
        }

        info!("daemon shutdown complete");
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("path resolution failed: {0}")]
    Path(#[from] PathError),

    #[error("failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("failed to bind {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("logger error: {0}")]
    Logger(#[from] LoggerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run the daemon in the foreground until a shutdown signal arrives.
///
/// This is the orchestrator: tracing setup, startup, listener spawn,
/// signal handling, ordered teardown. Exit is `Ok(())` only on a clean
/// signal- or request-driven shutdown.
pub async fn run(config: DaemonConfig) -> Result<(), LifecycleError> {
    setup_tracing(&config);

    let StartupResult { mut daemon, listener } = startup(&config).await?;

    let listener_cancel = CancellationToken::new();
    let listener_task = tokio::spawn(listener.run(listener_cancel.clone()));

    info!(socket = %config.socket_path.display(), "daemon ready");

    wait_for_shutdown().await?;

    listener_cancel.cancel();
    let _ = listener_task.await;
    daemon.shutdown();
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown() -> Result<(), LifecycleError> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
    }
    Ok(())
}

#[cfg(windows)]
async fn wait_for_shutdown() -> Result<(), LifecycleError> {
    tokio::signal::ctrl_c().await?;
    info!("received ctrl-c, shutting down");
    Ok(())
}

/// Install the operational tracing subscriber writing to `daemon.log`.
///
/// Distinct from the structured JSON-Lines product log: this is the
/// daemon's own diagnostics. Failures fall back to stderr; a second call
/// (tests) is a no-op.
fn setup_tracing(config: &DaemonConfig) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = config
        .daemon_log_path
        .parent()
        .filter(|parent| std::fs::create_dir_all(parent).is_ok())
        .zip(config.daemon_log_path.file_name())
        .map(|(parent, name)| tracing_appender::rolling::never(parent, name));

    match file_layer {
        Some(appender) => {
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(appender).with_ansi(false))
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .try_init();
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
