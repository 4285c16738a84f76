// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Database bootstrap: pragmas and idempotent schema.

use std::path::Path;

use rusqlite::Connection;
use tracing::debug;

use crate::StorageError;

/// Pragmas applied to every connection, in order. `busy_timeout` is the
/// only call-level timeout anywhere in the engine.
const PRAGMAS: &str = "\
    PRAGMA journal_mode = WAL;\n\
    PRAGMA foreign_keys = ON;\n\
    PRAGMA busy_timeout = 5000;";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS sessions (
    id                TEXT PRIMARY KEY,
    title             TEXT,
    project_path      TEXT,
    project_name      TEXT,
    model             TEXT,
    provider          TEXT,
    source            TEXT,
    status            TEXT,
    prompt_tokens     INTEGER,
    completion_tokens INTEGER,
    cost              REAL,
    message_count     INTEGER,
    tool_call_count   INTEGER,
    permission_mode   TEXT,
    created_at        INTEGER,
    updated_at        INTEGER,
    ended_at          INTEGER
);

CREATE TABLE IF NOT EXISTS messages (
    id                TEXT PRIMARY KEY,
    session_id        TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
    role              TEXT,
    text_content      TEXT,
    model             TEXT,
    source            TEXT,
    prompt_tokens     INTEGER,
    completion_tokens INTEGER,
    duration_ms       INTEGER,
    created_at        INTEGER,
    completed_at      INTEGER
);

CREATE TABLE IF NOT EXISTS tools (
    id            TEXT PRIMARY KEY,
    session_id    TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
    message_id    TEXT,
    tool_name     TEXT,
    tool_input    TEXT,
    tool_output   TEXT,
    file_path     TEXT,
    success       INTEGER,
    error_message TEXT,
    duration_ms   INTEGER,
    created_at    INTEGER
);

CREATE TABLE IF NOT EXISTS session_errors (
    id            TEXT PRIMARY KEY,
    session_id    TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
    error_type    TEXT,
    error_message TEXT,
    created_at    INTEGER
);

CREATE TABLE IF NOT EXISTS compaction_events (
    id              TEXT PRIMARY KEY,
    session_id      TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
    tokens_before   INTEGER,
    tokens_after    INTEGER,
    messages_before INTEGER,
    messages_after  INTEGER,
    created_at      INTEGER
);

CREATE INDEX IF NOT EXISTS idx_tools_session_id ON tools(session_id);
CREATE INDEX IF NOT EXISTS idx_tools_tool_name ON tools(tool_name);
CREATE INDEX IF NOT EXISTS idx_tools_file_path ON tools(file_path);
CREATE INDEX IF NOT EXISTS idx_session_errors_session_id ON session_errors(session_id);
CREATE INDEX IF NOT EXISTS idx_compaction_events_session_id ON compaction_events(session_id);
";

/// Create the database directory and file if needed, apply pragmas and the
/// idempotent schema. Returns whether the database file was newly created.
pub fn ensure_db(path: &Path) -> Result<bool, StorageError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let created = !path.exists();

    let conn = open_connection(path)?;
    apply_schema(&conn)?;
    debug!(path = %path.display(), created, "database ensured");
    Ok(created)
}

/// Open a connection with the engine pragmas applied.
pub(crate) fn open_connection(path: &Path) -> Result<Connection, StorageError> {
    let conn = Connection::open(path)
        .map_err(|e| StorageError::Open { path: path.to_path_buf(), source: e })?;
    conn.execute_batch(PRAGMAS)
        .map_err(|e| StorageError::Open { path: path.to_path_buf(), source: e })?;
    Ok(conn)
}

pub(crate) fn apply_schema(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(SCHEMA).map_err(StorageError::Schema)
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
