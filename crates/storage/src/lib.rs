// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite storage engine.
//!
//! Owns the single database connection. All writes and reads serialize
//! through one [`Storage`] value; the daemon wraps it in a mutex, which is
//! the whole concurrency discipline. Merge semantics live in the upsert
//! SQL itself so read-modify-write races cannot reintroduce nulls.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod engine;
mod gate;
mod rows;
mod schema;

pub use engine::Storage;
pub use gate::check_read_only;
pub use rows::{MessageRow, QueryResult, QueryRow, SessionRow, SessionWithMessages};
pub use schema::ensure_db;

use std::path::PathBuf;

use thiserror::Error;

/// Storage engine errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to open database at {path}: {source}")]
    Open { path: PathBuf, source: rusqlite::Error },

    #[error("failed to apply schema: {0}")]
    Schema(rusqlite::Error),

    #[error("database busy: {0}")]
    Busy(rusqlite::Error),

    #[error("database error: {0}")]
    Sqlite(rusqlite::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    QueryNotAllowed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(failure, _)
                if failure.code == rusqlite::ErrorCode::DatabaseBusy =>
            {
                StorageError::Busy(e)
            }
            _ => StorageError::Sqlite(e),
        }
    }
}
