// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The JSON-Lines writer with daily rotation.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDate, TimeZone};
use parking_lot::Mutex;
use thiserror::Error;

use clankers_core::log::{iso8601_millis, LogEntry, LogLevel};
use clankers_core::paths::log_file_name;
use clankers_core::Clock;

/// Logger errors
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("failed to open log file in {dir}: {source}")]
    Init { dir: PathBuf, source: std::io::Error },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize log entry: {0}")]
    Serialize(#[from] serde_json::Error),
}

enum Target {
    File { file: File, date: NaiveDate },
    Stderr,
}

/// Shared JSON-Lines sink. Cloning shares the underlying file handle and
/// mutex; the mutex covers both the write and any rotation it triggers.
#[derive(Clone)]
pub struct Logger<C: Clock> {
    inner: Arc<Mutex<Target>>,
    dir: PathBuf,
    min_level: LogLevel,
    clock: C,
}

impl<C: Clock> Logger<C> {
    /// Open today's log file under `dir`, creating the directory first.
    pub fn open(dir: &Path, min_level: LogLevel, clock: C) -> Result<Self, LoggerError> {
        std::fs::create_dir_all(dir)
            .map_err(|e| LoggerError::Init { dir: dir.to_path_buf(), source: e })?;
        let date = local_date(&clock);
        let file = open_append(&dir.join(log_file_name(date)))
            .map_err(|e| LoggerError::Init { dir: dir.to_path_buf(), source: e })?;
        Ok(Self {
            inner: Arc::new(Mutex::new(Target::File { file, date })),
            dir: dir.to_path_buf(),
            min_level,
            clock,
        })
    }

    /// Sink that writes to stderr instead of a file. Used when file
    /// initialisation fails: the daemon must not refuse to boot over logs.
    pub fn stderr(min_level: LogLevel, clock: C) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Target::Stderr)),
            dir: PathBuf::new(),
            min_level,
            clock,
        }
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    /// Append one entry. Entries below the configured level are silently
    /// dropped; a missing timestamp is filled in from the clock.
    pub fn write(&self, entry: LogEntry) -> Result<(), LoggerError> {
        if entry.level < self.min_level {
            return Ok(());
        }

        let mut entry = entry;
        if entry.timestamp.is_none() {
            entry.timestamp = Some(iso8601_millis(self.clock.epoch_ms()));
        }
        let line = serde_json::to_string(&entry)?;

        let mut target = self.inner.lock();
        if let Target::File { file, date } = &mut *target {
            let today = local_date(&self.clock);
            if today != *date {
                *file = open_append(&self.dir.join(log_file_name(today)))?;
                *date = today;
            }
            writeln!(file, "{}", line)?;
        } else {
            eprintln!("{}", line);
        }
        Ok(())
    }
}

fn open_append(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// The clock's local calendar date. Falls back to the system date when the
/// epoch value is out of chrono's range.
fn local_date<C: Clock>(clock: &C) -> NaiveDate {
    chrono::Local
        .timestamp_millis_opt(clock.epoch_ms() as i64)
        .single()
        .map(|dt| dt.date_naive())
        .unwrap_or_else(|| chrono::Local::now().date_naive())
}

#[cfg(test)]
#[path = "writer_tests.rs"]
mod tests;
