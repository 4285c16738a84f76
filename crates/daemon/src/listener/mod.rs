// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for handling socket I/O.
//!
//! The listener runs in a spawned task, accepting connections and handing
//! each stream to its own task. Clients usually send a single framed
//! request and close immediately (many use strict fire-and-forget for
//! `log.write`), so peer resets are expected and must never produce
//! warn/error noise that editor UIs would surface.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use clankers_core::SystemClock;
use clankers_logger::Logger;
use clankers_storage::Storage;
use clankers_wire::{encode, read_frame, write_frame, ProtocolError};

use crate::dispatch;
use crate::lifecycle::{DaemonConfig, LifecycleError};

/// Shared daemon context for all request handlers.
pub(crate) struct ListenCtx {
    /// The single storage connection; locking it is the write serializer
    pub storage: Arc<Mutex<Storage>>,
    pub logger: Logger<SystemClock>,
    pub db_path: PathBuf,
}

/// Listener task for accepting socket connections.
pub struct Listener {
    endpoint: Endpoint,
    ctx: Arc<ListenCtx>,
}

#[cfg(unix)]
type Endpoint = tokio::net::UnixListener;

#[cfg(windows)]
type Endpoint = tokio::net::TcpListener;

impl Listener {
    /// Bind the local endpoint. On Unix a stale socket file is removed
    /// first; on Windows the configured path is interpreted as a
    /// `host:port` TCP address (localhost fallback).
    pub(crate) async fn bind(
        config: &DaemonConfig,
        storage: Arc<Mutex<Storage>>,
        logger: Logger<SystemClock>,
    ) -> Result<Self, LifecycleError> {
        let endpoint = bind_endpoint(config).await?;
        let ctx = Arc::new(ListenCtx { storage, logger, db_path: config.db_path.clone() });
        Ok(Self { endpoint, ctx })
    }

    /// Run the accept loop until cancelled, spawning one task per
    /// connection. There is no cap on concurrent clients; the single
    /// storage connection is the de facto serializer.
    pub async fn run(self, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("listener stopped");
                    break;
                }
                result = self.endpoint.accept() => match result {
                    Ok((stream, _)) => {
                        let ctx = Arc::clone(&self.ctx);
                        // A panicking handler dies with its task; the
                        // accept loop keeps serving other clients.
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, &ctx).await {
                                log_connection_error(&e);
                            }
                        });
                    }
                    Err(e) => {
                        if is_benign_io(&e) {
                            debug!("accept error: {}", e);
                        } else {
                            error!("accept error: {}", e);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(unix)]
async fn bind_endpoint(config: &DaemonConfig) -> Result<Endpoint, LifecycleError> {
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    tokio::net::UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))
}

#[cfg(windows)]
async fn bind_endpoint(config: &DaemonConfig) -> Result<Endpoint, LifecycleError> {
    let addr = config
        .socket_path
        .to_str()
        .and_then(|s| s.parse::<std::net::SocketAddr>().ok())
        .unwrap_or_else(|| std::net::SocketAddr::from(([127, 0, 0, 1], 0)));
    tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))
}

/// Serve one client: frames in, dispatch, frames out, until peer close.
///
/// Generic over the stream so tests can drive it with an in-memory duplex.
pub(crate) async fn handle_connection<S>(stream: S, ctx: &ListenCtx) -> Result<(), ProtocolError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut reader, mut writer) = tokio::io::split(stream);
    loop {
        let body = match read_frame(&mut reader).await {
            Ok(body) => body,
            // Normal end of connection, including fire-and-forget resets
            Err(ProtocolError::ConnectionClosed) => return Ok(()),
            Err(e) => return Err(e),
        };

        let response = dispatch::dispatch(&body, ctx);
        let encoded = encode(&response)?;
        if let Err(e) = write_frame(&mut writer, &encoded).await {
            // Fire-and-forget clients close before reading the reply;
            // losing that write is the expected outcome, not a failure.
            return if is_benign(&e) { Ok(()) } else { Err(e) };
        }
    }
}

/// Log a connection error, keeping benign peer-noise at debug so editor
/// UIs that watch daemon stderr stay quiet.
fn log_connection_error(e: &ProtocolError) {
    if is_benign(e) {
        debug!("client disconnected: {}", e);
    } else {
        error!("connection error: {}", e);
    }
}

fn is_benign(e: &ProtocolError) -> bool {
    match e {
        ProtocolError::ConnectionClosed => true,
        ProtocolError::Io(io) => is_benign_io(io),
        _ => false,
    }
}

/// Peer resets are routine: clients close the write side right after a
/// fire-and-forget notification.
fn is_benign_io(e: &std::io::Error) -> bool {
    use std::io::ErrorKind;
    if matches!(
        e.kind(),
        ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
            | ErrorKind::NotConnected
            | ErrorKind::UnexpectedEof
    ) {
        return true;
    }
    let message = e.to_string().to_lowercase();
    message.contains("connection reset by peer")
        || message.contains("broken pipe")
        || message.contains("use of closed network connection")
}

#[cfg(test)]
#[path = "../listener_tests.rs"]
mod tests;
