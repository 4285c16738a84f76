// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON-RPC dispatcher: envelope validation, method routing, error
//! mapping.
//!
//! Every method except `health`, `ensureDb` and `getDbPath` carries the
//! common envelope (`schemaVersion` + `client`). Storage and gate errors
//! map to `-32603` with a kind tag in `data`; malformed payloads map to
//! `-32602`.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use clankers_core::payload::{
    CompactionEventPayload, MessagePayload, SessionErrorPayload, SessionPayload, ToolPayload,
};
use clankers_core::LogEntry;
use clankers_storage::StorageError;
use clankers_wire::{decode, Envelope, RpcError, RpcRequest, RpcResponse};

use crate::env::DAEMON_VERSION;
use crate::listener::ListenCtx;

/// Decode one frame body and produce exactly one response.
///
/// Requests without an id (notifications) still get a response with a
/// null id: fire-and-forget clients never read it, but clients that do
/// await a `log.write` reply must succeed.
pub(crate) fn dispatch(body: &[u8], ctx: &ListenCtx) -> RpcResponse {
    let request: RpcRequest = match decode(body) {
        Ok(request) => request,
        Err(e) => {
            return RpcResponse::failure(Value::Null, RpcError::parse_error(e.to_string()));
        }
    };

    let id = request.id.clone().unwrap_or(Value::Null);
    if request.jsonrpc != "2.0" {
        return RpcResponse::failure(
            id,
            RpcError::invalid_request(format!("unsupported jsonrpc version: {}", request.jsonrpc)),
        );
    }

    debug!(method = %request.method, "dispatching request");
    match route(&request, ctx) {
        Ok(result) => RpcResponse::success(id, result),
        Err(error) => RpcResponse::failure(id, error),
    }
}

fn route(request: &RpcRequest, ctx: &ListenCtx) -> Result<Value, RpcError> {
    let params = request.params.as_ref();
    match request.method.as_str() {
        "health" => Ok(json!({ "ok": true, "version": DAEMON_VERSION })),

        "ensureDb" => {
            let created =
                clankers_storage::ensure_db(&ctx.db_path).map_err(storage_error)?;
            Ok(json!({ "dbPath": ctx.db_path.to_string_lossy(), "created": created }))
        }

        "getDbPath" => Ok(json!({ "dbPath": ctx.db_path.to_string_lossy() })),

        "upsertSession" => {
            Envelope::from_params(params).map_err(RpcError::invalid_params)?;
            let payload: SessionPayload = payload_field(params, "session")?;
            ctx.storage.lock().upsert_session(&payload).map_err(storage_error)?;
            Ok(json!({ "ok": true }))
        }

        "upsertMessage" => {
            Envelope::from_params(params).map_err(RpcError::invalid_params)?;
            let payload: MessagePayload = payload_field(params, "message")?;
            ctx.storage.lock().upsert_message(&payload).map_err(storage_error)?;
            Ok(json!({ "ok": true }))
        }

        "upsertTool" => {
            Envelope::from_params(params).map_err(RpcError::invalid_params)?;
            let payload: ToolPayload = payload_field(params, "tool")?;
            ctx.storage.lock().upsert_tool(&payload).map_err(storage_error)?;
            Ok(json!({ "ok": true }))
        }

        "upsertSessionError" => {
            Envelope::from_params(params).map_err(RpcError::invalid_params)?;
            let payload: SessionErrorPayload = payload_field(params, "error")?;
            ctx.storage.lock().upsert_session_error(&payload).map_err(storage_error)?;
            Ok(json!({ "ok": true }))
        }

        "upsertCompactionEvent" => {
            Envelope::from_params(params).map_err(RpcError::invalid_params)?;
            let payload: CompactionEventPayload = payload_field(params, "event")?;
            ctx.storage.lock().upsert_compaction_event(&payload).map_err(storage_error)?;
            Ok(json!({ "ok": true }))
        }

        "log.write" => {
            let envelope = Envelope::from_params(params).map_err(RpcError::invalid_params)?;
            let mut entry: LogEntry = payload_field(params, "entry")?;
            if entry.component.is_empty() {
                entry.component = envelope.client.name;
            }
            // Fire-and-forget: sink errors must not reach the client
            if let Err(e) = ctx.logger.write(entry) {
                debug!("log.write sink error: {}", e);
            }
            Ok(json!({ "ok": true }))
        }

        other => Err(RpcError::method_not_found(other)),
    }
}

/// Extract and deserialize a named payload object from params.
fn payload_field<T: DeserializeOwned>(params: Option<&Value>, key: &str) -> Result<T, RpcError> {
    let value = params
        .and_then(|p| p.get(key))
        .ok_or_else(|| RpcError::invalid_params(format!("missing {} payload", key)))?;
    serde_json::from_value(value.clone())
        .map_err(|e| RpcError::invalid_params(format!("invalid {} payload: {}", key, e)))
}

/// Map a storage error to `-32603` with its kind tag.
fn storage_error(e: StorageError) -> RpcError {
    let kind = match &e {
        StorageError::Open { .. } => "StorageOpen",
        StorageError::Schema(_) => "StorageSchema",
        StorageError::Busy(_) => "StorageBusy",
        StorageError::NotFound(_) => "NotFound",
        StorageError::QueryNotAllowed(_) => "QueryNotAllowed",
        StorageError::Sqlite(_) | StorageError::Io(_) => "StorageError",
    };
    RpcError::internal(kind, e.to_string())
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
