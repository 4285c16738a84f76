// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for the end-to-end specs.

use std::path::Path;

use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use clankers_core::LogLevel;
use clankers_daemon::{startup, DaemonConfig, DaemonState, StartupResult};
use clankers_wire::{decode, encode, read_frame, write_frame, RpcRequest, RpcResponse};

pub fn test_config(dir: &Path) -> DaemonConfig {
    DaemonConfig {
        data_dir: dir.to_path_buf(),
        db_path: dir.join("clankers.db"),
        socket_path: dir.join("d.sock"),
        log_dir: dir.join("logs"),
        lock_path: dir.join("daemon.pid"),
        daemon_log_path: dir.join("daemon.log"),
        min_log_level: LogLevel::Debug,
    }
}

/// A daemon running inside the test process, reachable over its socket.
pub struct TestDaemon {
    pub config: DaemonConfig,
    pub state: DaemonState,
    cancel: CancellationToken,
    listener_task: tokio::task::JoinHandle<()>,
}

impl TestDaemon {
    pub async fn start(dir: &Path) -> Self {
        let config = test_config(dir);
        let StartupResult { daemon, listener } =
            startup(&config).await.expect("daemon startup");
        let cancel = CancellationToken::new();
        let listener_task = tokio::spawn(listener.run(cancel.clone()));
        Self { config, state: daemon, cancel, listener_task }
    }

    /// One request-response round-trip over a fresh connection.
    pub async fn call(&self, method: &str, params: Value) -> RpcResponse {
        let stream = tokio::net::UnixStream::connect(&self.config.socket_path)
            .await
            .expect("connect");
        let (mut reader, mut writer) = tokio::io::split(stream);
        let body = encode(&RpcRequest::new(1, method, params)).expect("encode");
        write_frame(&mut writer, &body).await.expect("write");
        let response = read_frame(&mut reader).await.expect("read");
        decode(&response).expect("decode")
    }

    /// Write one frame and close both directions without reading.
    pub async fn fire_and_forget(&self, method: &str, params: Value) {
        let stream = tokio::net::UnixStream::connect(&self.config.socket_path)
            .await
            .expect("connect");
        let (reader, mut writer) = tokio::io::split(stream);
        let body = encode(&RpcRequest::new(1, method, params)).expect("encode");
        write_frame(&mut writer, &body).await.expect("write");
        drop(reader);
        drop(writer);
    }

    pub async fn stop(mut self) {
        self.cancel.cancel();
        let _ = self.listener_task.await;
        self.state.shutdown();
    }
}

pub fn enveloped(payload_key: &str, payload: Value) -> Value {
    json!({
        "schemaVersion": "v1",
        "client": { "name": "spec-client", "version": "0.0.0" },
        payload_key: payload,
    })
}
