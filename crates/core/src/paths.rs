// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem location resolution.
//!
//! Every function consults its `CLANKERS_*` environment override first and
//! falls back to the platform default. Resolution is pure: nothing here
//! creates directories; that is the caller's job on first use.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Directory segment appended to the platform data root.
const APP_DIR: &str = "clankers";

/// Named-pipe endpoint advertised on Windows.
const WINDOWS_PIPE: &str = r"\\.\pipe\dxta-clankers";

/// Path resolution errors
#[derive(Debug, Error)]
pub enum PathError {
    #[error("could not determine a data directory for this platform")]
    NoDataRoot,
}

/// Platform data root: `CLANKERS_DATA_PATH` > `%APPDATA%` (Windows) >
/// `~/Library/Application Support` (macOS) > `$XDG_DATA_HOME` or
/// `~/.local/share` (elsewhere).
pub fn data_root() -> Result<PathBuf, PathError> {
    if let Some(dir) = env_path("CLANKERS_DATA_PATH") {
        return Ok(dir);
    }
    dirs::data_dir().ok_or(PathError::NoDataRoot)
}

/// Application data directory: data root + `clankers`.
pub fn data_dir() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join(APP_DIR))
}

/// SQLite database file: `CLANKERS_DB_PATH` > data dir + `clankers.db`.
pub fn db_path() -> Result<PathBuf, PathError> {
    if let Some(path) = env_path("CLANKERS_DB_PATH") {
        return Ok(path);
    }
    Ok(data_dir()?.join("clankers.db"))
}

/// JSON config file: data dir + `clankers.json`.
pub fn config_path() -> Result<PathBuf, PathError> {
    Ok(data_dir()?.join("clankers.json"))
}

/// RPC endpoint: `CLANKERS_SOCKET_PATH` > named pipe (Windows) >
/// data dir + `dxta-clankers.sock`.
///
/// On Windows the returned value is an advertised location only; the
/// listener falls back to localhost TCP (see the daemon crate).
pub fn socket_path() -> Result<PathBuf, PathError> {
    if let Some(path) = env_path("CLANKERS_SOCKET_PATH") {
        return Ok(path);
    }
    if cfg!(windows) {
        return Ok(PathBuf::from(WINDOWS_PIPE));
    }
    Ok(data_dir()?.join("dxta-clankers.sock"))
}

/// Log directory: `CLANKERS_LOG_PATH` > data dir + `logs`.
pub fn log_dir() -> Result<PathBuf, PathError> {
    if let Some(dir) = env_path("CLANKERS_LOG_PATH") {
        return Ok(dir);
    }
    Ok(data_dir()?.join("logs"))
}

/// File name for one day of structured logs: `clankers-YYYY-MM-DD.jsonl`.
pub fn log_file_name(date: NaiveDate) -> String {
    format!("clankers-{}.jsonl", date.format("%Y-%m-%d"))
}

/// Today's log file (local date), under the resolved log directory.
pub fn current_log_file() -> Result<PathBuf, PathError> {
    Ok(log_dir()?.join(log_file_name(chrono::Local::now().date_naive())))
}

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var_os(var).filter(|v| !v.is_empty()).map(PathBuf::from)
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
