// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-side row types.

use rusqlite::Row;
use serde::Serialize;

/// Arbitrary query result row: column name to JSON value.
pub type QueryRow = serde_json::Map<String, serde_json::Value>;

/// Result of `execute_query`: columns in statement order plus row maps.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<QueryRow>,
}

/// A sessions row as stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRow {
    pub id: String,
    pub title: Option<String>,
    pub project_path: Option<String>,
    pub project_name: Option<String>,
    pub model: Option<String>,
    pub provider: Option<String>,
    pub source: Option<String>,
    pub status: Option<String>,
    pub prompt_tokens: Option<i64>,
    pub completion_tokens: Option<i64>,
    pub cost: Option<f64>,
    pub message_count: Option<i64>,
    pub tool_call_count: Option<i64>,
    pub permission_mode: Option<String>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub ended_at: Option<i64>,
}

impl SessionRow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            project_path: row.get("project_path")?,
            project_name: row.get("project_name")?,
            model: row.get("model")?,
            provider: row.get("provider")?,
            source: row.get("source")?,
            status: row.get("status")?,
            prompt_tokens: row.get("prompt_tokens")?,
            completion_tokens: row.get("completion_tokens")?,
            cost: row.get("cost")?,
            message_count: row.get("message_count")?,
            tool_call_count: row.get("tool_call_count")?,
            permission_mode: row.get("permission_mode")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
            ended_at: row.get("ended_at")?,
        })
    }
}

/// A messages row as stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRow {
    pub id: String,
    pub session_id: String,
    pub role: Option<String>,
    pub text_content: Option<String>,
    pub model: Option<String>,
    pub source: Option<String>,
    pub prompt_tokens: Option<i64>,
    pub completion_tokens: Option<i64>,
    pub duration_ms: Option<i64>,
    pub created_at: Option<i64>,
    pub completed_at: Option<i64>,
}

impl MessageRow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            session_id: row.get("session_id")?,
            role: row.get("role")?,
            text_content: row.get("text_content")?,
            model: row.get("model")?,
            source: row.get("source")?,
            prompt_tokens: row.get("prompt_tokens")?,
            completion_tokens: row.get("completion_tokens")?,
            duration_ms: row.get("duration_ms")?,
            created_at: row.get("created_at")?,
            completed_at: row.get("completed_at")?,
        })
    }
}

/// A session plus its messages in `created_at` order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionWithMessages {
    #[serde(flatten)]
    pub session: SessionRow,
    pub messages: Vec<MessageRow>,
}
