// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal RPC client for talking to a running daemon.

use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

use clankers_wire::{decode, encode, read_frame, write_frame, ProtocolError, RpcError, RpcRequest, RpcResponse};

/// Client-side errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon not running at {0}")]
    NotRunning(PathBuf),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("daemon error: {0}")]
    Rpc(String),

    #[error("path resolution failed: {0}")]
    Path(#[from] clankers_core::PathError),
}

/// One-shot JSON-RPC client: connect, call, close.
pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    /// Client for the endpoint resolved from the environment.
    pub fn from_env() -> Result<Self, ClientError> {
        Ok(Self { socket_path: clankers_core::paths::socket_path()? })
    }

    /// Send one request and wait for its response.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        let stream = self.connect().await?;
        let (mut reader, mut writer) = tokio::io::split(stream);

        let body = encode(&RpcRequest::new(1, method, params))?;
        write_frame(&mut writer, &body).await?;

        let response_body = read_frame(&mut reader).await?;
        let response: RpcResponse = decode(&response_body)?;
        match response.error {
            Some(RpcError { message, .. }) => Err(ClientError::Rpc(message)),
            None => Ok(response.result.unwrap_or(Value::Null)),
        }
    }

    /// `health` round-trip; returns the daemon version.
    pub async fn health(&self) -> Result<String, ClientError> {
        let result = self.call("health", Value::Object(Default::default())).await?;
        Ok(result
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string())
    }

    #[cfg(unix)]
    async fn connect(&self) -> Result<tokio::net::UnixStream, ClientError> {
        tokio::net::UnixStream::connect(&self.socket_path)
            .await
            .map_err(|_| ClientError::NotRunning(self.socket_path.clone()))
    }

    #[cfg(windows)]
    async fn connect(&self) -> Result<tokio::net::TcpStream, ClientError> {
        let addr = self
            .socket_path
            .to_str()
            .and_then(|s| s.parse::<std::net::SocketAddr>().ok())
            .ok_or_else(|| ClientError::NotRunning(self.socket_path.clone()))?;
        tokio::net::TcpStream::connect(addr)
            .await
            .map_err(|_| ClientError::NotRunning(self.socket_path.clone()))
    }
}
