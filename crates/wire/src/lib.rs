// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! RPC protocol for daemon communication.
//!
//! Wire format: `Content-Length: N\r\n\r\n` header followed by exactly N
//! bytes of UTF-8 JSON carrying a JSON-RPC 2.0 message.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod frame;
mod rpc;

pub use frame::{decode, encode, read_frame, write_frame, ProtocolError, MAX_FRAME_SIZE};
pub use rpc::{
    ClientInfo, Envelope, RpcError, RpcRequest, RpcResponse, INTERNAL_ERROR, INVALID_PARAMS,
    INVALID_REQUEST, METHOD_NOT_FOUND, SCHEMA_VERSION,
};
