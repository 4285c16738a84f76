// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON-RPC 2.0 message types and the clankers params envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC error codes used by the dispatcher. Parse failures share
/// `-32600` with malformed requests.
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

/// Envelope schema version accepted by the daemon.
pub const SCHEMA_VERSION: &str = "v1";

/// One JSON-RPC 2.0 request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    /// Absent for notifications; echoed back verbatim otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl RpcRequest {
    pub fn new(id: impl Into<Value>, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(id.into()),
            method: method.into(),
            params: Some(params),
        }
    }
}

/// One JSON-RPC 2.0 response. Exactly one of `result`/`error` is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self { jsonrpc: "2.0".to_string(), id, result: Some(result), error: None }
    }

    pub fn failure(id: Value, error: RpcError) -> Self {
        Self { jsonrpc: "2.0".to_string(), id, result: None, error: Some(error) }
    }
}

/// JSON-RPC error object. `data.kind` carries a structured kind tag so
/// clients can match without parsing the message text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), data: None }
    }

    pub fn with_kind(code: i64, message: impl Into<String>, kind: &str) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(serde_json::json!({ "kind": kind })),
        }
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::with_kind(INVALID_REQUEST, message, "ParseError")
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::with_kind(INVALID_REQUEST, message, "InvalidRequest")
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::with_kind(METHOD_NOT_FOUND, format!("method not found: {}", method), "MethodNotFound")
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::with_kind(INVALID_PARAMS, message, "InvalidParams")
    }

    pub fn internal(kind: &str, message: impl Into<String>) -> Self {
        Self::with_kind(INTERNAL_ERROR, message, kind)
    }

    /// The `data.kind` tag, when present.
    pub fn kind(&self) -> Option<&str> {
        self.data.as_ref()?.get("kind")?.as_str()
    }
}

/// Client identity carried in every write-method params object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
}

/// Common params envelope: schema version plus client identity.
///
/// Methods `health`, `ensureDb` and `getDbPath` are exempt; every other
/// method must carry this and an unknown `schemaVersion` is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub schema_version: String,
    #[serde(default)]
    pub client: ClientInfo,
}

impl Envelope {
    /// Parse the envelope out of a params object. Missing or mismatched
    /// fields produce a human-readable reason for an InvalidParams reply.
    pub fn from_params(params: Option<&Value>) -> Result<Self, String> {
        let Some(params) = params else {
            return Err("missing params".to_string());
        };
        let envelope: Envelope = serde_json::from_value(params.clone())
            .map_err(|e| format!("invalid envelope: {}", e))?;
        if envelope.schema_version != SCHEMA_VERSION {
            return Err(format!("unknown schemaVersion: {}", envelope.schema_version));
        }
        Ok(envelope)
    }
}

#[cfg(test)]
#[path = "rpc_tests.rs"]
mod tests;
