// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The storage engine proper: one connection, five upserts, the read
//! operations and the query gate in front of `execute_query`.
//!
//! Merge rules are expressed in the upsert SQL so they hold regardless of
//! which process wrote last:
//! - identity-preserving text columns keep their value unless the incoming
//!   one is non-null and non-empty;
//! - numeric aggregates take the incoming value as-is;
//! - `created_at` is first-write-wins, `ended_at`/`completed_at` are sticky.

use std::path::{Path, PathBuf};

use rusqlite::{named_params, Connection};
use tracing::debug;

use clankers_core::payload::{
    CompactionEventPayload, MessagePayload, SessionErrorPayload, SessionPayload, ToolPayload,
};

use crate::rows::{MessageRow, QueryResult, QueryRow, SessionRow, SessionWithMessages};
use crate::{gate, schema, StorageError};

const UPSERT_SESSION: &str = "
INSERT INTO sessions (
    id, title, project_path, project_name, model, provider, source, status,
    prompt_tokens, completion_tokens, cost, message_count, tool_call_count,
    permission_mode, created_at, updated_at, ended_at
) VALUES (
    :id, COALESCE(:title, 'Untitled Session'), :project_path, :project_name,
    :model, :provider, :source, :status, :prompt_tokens, :completion_tokens,
    :cost, :message_count, :tool_call_count, :permission_mode, :created_at,
    :updated_at, :ended_at
)
ON CONFLICT(id) DO UPDATE SET
    title = CASE WHEN :title IS NOT NULL AND :title != '' THEN :title ELSE sessions.title END,
    project_path = COALESCE(:project_path, sessions.project_path),
    project_name = COALESCE(:project_name, sessions.project_name),
    model = CASE WHEN :model IS NOT NULL AND :model != '' THEN :model ELSE sessions.model END,
    provider = CASE WHEN :provider IS NOT NULL AND :provider != '' THEN :provider ELSE sessions.provider END,
    source = CASE WHEN :source IS NOT NULL AND :source != '' THEN :source ELSE sessions.source END,
    status = CASE WHEN :status IS NOT NULL AND :status != '' THEN :status ELSE sessions.status END,
    prompt_tokens = :prompt_tokens,
    completion_tokens = :completion_tokens,
    cost = :cost,
    message_count = :message_count,
    tool_call_count = :tool_call_count,
    permission_mode = CASE WHEN :permission_mode IS NOT NULL AND :permission_mode != '' THEN :permission_mode ELSE sessions.permission_mode END,
    created_at = COALESCE(sessions.created_at, :created_at),
    updated_at = COALESCE(:updated_at, sessions.updated_at),
    ended_at = COALESCE(:ended_at, sessions.ended_at)
";

const UPSERT_MESSAGE: &str = "
INSERT INTO messages (
    id, session_id, role, text_content, model, source, prompt_tokens,
    completion_tokens, duration_ms, created_at, completed_at
) VALUES (
    :id, :session_id, :role, :text_content, :model, :source, :prompt_tokens,
    :completion_tokens, :duration_ms, :created_at, :completed_at
)
ON CONFLICT(id) DO UPDATE SET
    session_id = :session_id,
    role = COALESCE(:role, messages.role),
    text_content = CASE WHEN :text_content IS NOT NULL AND :text_content != '' THEN :text_content ELSE messages.text_content END,
    model = CASE WHEN :model IS NOT NULL AND :model != '' THEN :model ELSE messages.model END,
    source = CASE WHEN :source IS NOT NULL AND :source != '' THEN :source ELSE messages.source END,
    prompt_tokens = :prompt_tokens,
    completion_tokens = :completion_tokens,
    duration_ms = :duration_ms,
    created_at = COALESCE(messages.created_at, :created_at),
    completed_at = COALESCE(:completed_at, messages.completed_at)
";

const UPSERT_TOOL: &str = "
INSERT INTO tools (
    id, session_id, message_id, tool_name, tool_input, tool_output,
    file_path, success, error_message, duration_ms, created_at
) VALUES (
    :id, :session_id, :message_id, :tool_name, :tool_input, :tool_output,
    :file_path, :success, :error_message, :duration_ms, :created_at
)
ON CONFLICT(id) DO UPDATE SET
    session_id = :session_id,
    message_id = COALESCE(:message_id, tools.message_id),
    tool_name = COALESCE(:tool_name, tools.tool_name),
    tool_input = COALESCE(:tool_input, tools.tool_input),
    tool_output = COALESCE(:tool_output, tools.tool_output),
    file_path = COALESCE(:file_path, tools.file_path),
    success = COALESCE(:success, tools.success),
    error_message = COALESCE(:error_message, tools.error_message),
    duration_ms = :duration_ms,
    created_at = COALESCE(tools.created_at, :created_at)
";

const UPSERT_SESSION_ERROR: &str = "
INSERT INTO session_errors (id, session_id, error_type, error_message, created_at)
VALUES (:id, :session_id, :error_type, :error_message, :created_at)
ON CONFLICT(id) DO UPDATE SET
    session_id = :session_id,
    error_type = COALESCE(:error_type, session_errors.error_type),
    error_message = COALESCE(:error_message, session_errors.error_message),
    created_at = COALESCE(session_errors.created_at, :created_at)
";

const UPSERT_COMPACTION_EVENT: &str = "
INSERT INTO compaction_events (
    id, session_id, tokens_before, tokens_after, messages_before,
    messages_after, created_at
) VALUES (
    :id, :session_id, :tokens_before, :tokens_after, :messages_before,
    :messages_after, :created_at
)
ON CONFLICT(id) DO UPDATE SET
    session_id = :session_id,
    tokens_before = COALESCE(:tokens_before, compaction_events.tokens_before),
    tokens_after = COALESCE(:tokens_after, compaction_events.tokens_after),
    messages_before = COALESCE(:messages_before, compaction_events.messages_before),
    messages_after = COALESCE(:messages_after, compaction_events.messages_after),
    created_at = COALESCE(compaction_events.created_at, :created_at)
";

/// The storage engine. Exactly one connection, owned here; callers
/// serialize access (the daemon holds this behind a single mutex).
pub struct Storage {
    conn: Connection,
    path: PathBuf,
}

impl Storage {
    /// Open the database, ensuring pragmas and schema first.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = schema::open_connection(path)?;
        schema::apply_schema(&conn)?;
        debug!(path = %path.display(), "storage opened");
        Ok(Self { conn, path: path.to_path_buf() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // --- upserts ---

    pub fn upsert_session(&self, payload: &SessionPayload) -> Result<(), StorageError> {
        let mut stmt = self.conn.prepare_cached(UPSERT_SESSION)?;
        stmt.execute(named_params! {
            ":id": payload.id,
            ":title": payload.title,
            ":project_path": payload.project_path,
            ":project_name": payload.project_name,
            ":model": payload.model,
            ":provider": payload.provider,
            ":source": payload.source,
            ":status": payload.status,
            ":prompt_tokens": payload.prompt_tokens,
            ":completion_tokens": payload.completion_tokens,
            ":cost": payload.cost,
            ":message_count": payload.message_count,
            ":tool_call_count": payload.tool_call_count,
            ":permission_mode": payload.permission_mode,
            ":created_at": payload.created_at,
            ":updated_at": payload.updated_at,
            ":ended_at": payload.ended_at,
        })?;
        Ok(())
    }

    pub fn upsert_message(&self, payload: &MessagePayload) -> Result<(), StorageError> {
        let mut stmt = self.conn.prepare_cached(UPSERT_MESSAGE)?;
        stmt.execute(named_params! {
            ":id": payload.id,
            ":session_id": payload.session_id,
            ":role": payload.role,
            ":text_content": payload.text_content,
            ":model": payload.model,
            ":source": payload.source,
            ":prompt_tokens": payload.prompt_tokens,
            ":completion_tokens": payload.completion_tokens,
            ":duration_ms": payload.duration_ms,
            ":created_at": payload.created_at,
            ":completed_at": payload.completed_at,
        })?;
        Ok(())
    }

    pub fn upsert_tool(&self, payload: &ToolPayload) -> Result<(), StorageError> {
        let mut stmt = self.conn.prepare_cached(UPSERT_TOOL)?;
        stmt.execute(named_params! {
            ":id": payload.id,
            ":session_id": payload.session_id,
            ":message_id": payload.message_id,
            ":tool_name": payload.tool_name,
            ":tool_input": payload.tool_input,
            ":tool_output": payload.tool_output,
            ":file_path": payload.file_path,
            ":success": payload.success,
            ":error_message": payload.error_message,
            ":duration_ms": payload.duration_ms,
            ":created_at": payload.created_at,
        })?;
        Ok(())
    }

    pub fn upsert_session_error(&self, payload: &SessionErrorPayload) -> Result<(), StorageError> {
        let mut stmt = self.conn.prepare_cached(UPSERT_SESSION_ERROR)?;
        stmt.execute(named_params! {
            ":id": payload.id,
            ":session_id": payload.session_id,
            ":error_type": payload.error_type,
            ":error_message": payload.error_message,
            ":created_at": payload.created_at,
        })?;
        Ok(())
    }

    pub fn upsert_compaction_event(
        &self,
        payload: &CompactionEventPayload,
    ) -> Result<(), StorageError> {
        let mut stmt = self.conn.prepare_cached(UPSERT_COMPACTION_EVENT)?;
        stmt.execute(named_params! {
            ":id": payload.id,
            ":session_id": payload.session_id,
            ":tokens_before": payload.tokens_before,
            ":tokens_after": payload.tokens_after,
            ":messages_before": payload.messages_before,
            ":messages_after": payload.messages_after,
            ":created_at": payload.created_at,
        })?;
        Ok(())
    }

    // --- reads ---

    /// Sessions ordered newest-first, optionally capped.
    pub fn list_sessions(&self, limit: Option<u32>) -> Result<Vec<SessionRow>, StorageError> {
        let sql = match limit {
            Some(_) => "SELECT * FROM sessions ORDER BY created_at DESC LIMIT ?1",
            None => "SELECT * FROM sessions ORDER BY created_at DESC",
        };
        let mut stmt = self.conn.prepare_cached(sql)?;
        let rows = match limit {
            Some(n) => stmt.query_map([n], SessionRow::from_row)?.collect::<Result<Vec<_>, _>>()?,
            None => stmt.query_map([], SessionRow::from_row)?.collect::<Result<Vec<_>, _>>()?,
        };
        Ok(rows)
    }

    /// One session and its messages in `created_at` order.
    pub fn get_session(&self, id: &str) -> Result<SessionWithMessages, StorageError> {
        let mut stmt = self.conn.prepare_cached("SELECT * FROM sessions WHERE id = ?1")?;
        let session = stmt
            .query_row([id], SessionRow::from_row)
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    StorageError::NotFound(format!("session {}", id))
                }
                other => other.into(),
            })?;
        let messages = self.list_messages(id)?;
        Ok(SessionWithMessages { session, messages })
    }

    pub fn list_messages(&self, session_id: &str) -> Result<Vec<MessageRow>, StorageError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT * FROM messages WHERE session_id = ?1 ORDER BY created_at ASC",
        )?;
        let rows = stmt.query_map([session_id], MessageRow::from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Run a read-only query and return row maps plus the column order.
    /// The gate rejects anything but SELECT/WITH before the statement
    /// reaches SQLite.
    pub fn execute_query(&self, sql: &str) -> Result<QueryResult, StorageError> {
        gate::check_read_only(sql)?;

        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(str::to_string).collect();

        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut map = QueryRow::new();
            for (idx, name) in columns.iter().enumerate() {
                map.insert(name.clone(), value_to_json(row.get_ref(idx)?));
            }
            out.push(map);
        }
        Ok(QueryResult { columns, rows: out })
    }

    /// Column names of a table via the table-info pragma.
    pub fn table_columns(&self, table: &str) -> Result<Vec<String>, StorageError> {
        let mut stmt =
            self.conn.prepare_cached("SELECT name FROM pragma_table_info(?1)")?;
        let rows = stmt.query_map([table], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Column names that match `input` by case-insensitive symmetric
    /// substring. Feeds the CLI's "did you mean" hints.
    pub fn suggest_columns(&self, table: &str, input: &str) -> Result<Vec<String>, StorageError> {
        let needle = input.to_lowercase();
        let columns = self.table_columns(table)?;
        Ok(columns
            .into_iter()
            .filter(|col| {
                let hay = col.to_lowercase();
                hay.contains(&needle) || needle.contains(&hay)
            })
            .collect())
    }
}

/// Coerce one SQLite value to JSON. Blobs degrade to lossy text rather
/// than erroring; the store only ever writes text and numbers.
fn value_to_json(value: rusqlite::types::ValueRef<'_>) -> serde_json::Value {
    use rusqlite::types::ValueRef;
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(i) => serde_json::Value::from(i),
        ValueRef::Real(f) => serde_json::Value::from(f),
        ValueRef::Text(t) => serde_json::Value::from(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => serde_json::Value::from(String::from_utf8_lossy(b).into_owned()),
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
