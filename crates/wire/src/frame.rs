// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Content-Length framing over an async byte stream.
//!
//! Each message is `Content-Length: N\r\n\r\n` followed by exactly N body
//! bytes. Header names are case-insensitive; headers other than
//! `Content-Length` are ignored.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Protocol errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },

    #[error("missing Content-Length header")]
    MissingContentLength,

    #[error("malformed frame header: {0}")]
    MalformedHeader(String),

    #[error("connection closed")]
    ConnectionClosed,
}

/// Maximum frame body size (16 MiB)
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Maximum header section size (8 KiB)
const MAX_HEADER_SIZE: usize = 8 * 1024;

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Encode a message to JSON bytes (without the frame header).
///
/// Use with [`write_frame`] which adds the `Content-Length` header.
pub fn encode<T: Serialize>(msg: &T) -> Result<Vec<u8>, ProtocolError> {
    let json = serde_json::to_vec(msg)?;
    if json.len() > MAX_FRAME_SIZE {
        return Err(ProtocolError::MessageTooLarge { size: json.len(), max: MAX_FRAME_SIZE });
    }
    Ok(json)
}

/// Decode a frame body.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Read one framed message body from an async reader.
///
/// EOF before a complete frame maps to `ConnectionClosed`; on the daemon
/// side that is the normal end of a connection, not a failure.
pub async fn read_frame<R: AsyncReadExt + Unpin>(reader: &mut R) -> Result<Vec<u8>, ProtocolError> {
    let header = read_header_section(reader).await?;
    let len = content_length(&header)?;

    if len > MAX_FRAME_SIZE {
        return Err(ProtocolError::MessageTooLarge { size: len, max: MAX_FRAME_SIZE });
    }

    let mut body = vec![0u8; len];
    match reader.read_exact(&mut body).await {
        Ok(_) => Ok(body),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            Err(ProtocolError::ConnectionClosed)
        }
        Err(e) => Err(ProtocolError::Io(e)),
    }
}

/// Write one framed message to an async writer.
pub async fn write_frame<W: AsyncWriteExt + Unpin>(
    writer: &mut W,
    body: &[u8],
) -> Result<(), ProtocolError> {
    if body.len() > MAX_FRAME_SIZE {
        return Err(ProtocolError::MessageTooLarge { size: body.len(), max: MAX_FRAME_SIZE });
    }
    let header = format!("Content-Length: {}\r\n\r\n", body.len());
    writer.write_all(header.as_bytes()).await?;
    writer.write_all(body).await?;
    writer.flush().await?;
    Ok(())
}

/// Accumulate bytes until the blank-line terminator.
async fn read_header_section<R: AsyncReadExt + Unpin>(
    reader: &mut R,
) -> Result<Vec<u8>, ProtocolError> {
    let mut header = Vec::with_capacity(64);
    let mut byte = [0u8; 1];
    loop {
        match reader.read_exact(&mut byte).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Err(ProtocolError::ConnectionClosed);
            }
            Err(e) => return Err(ProtocolError::Io(e)),
        }
        header.push(byte[0]);
        if header.ends_with(HEADER_TERMINATOR) {
            header.truncate(header.len() - HEADER_TERMINATOR.len());
            return Ok(header);
        }
        if header.len() > MAX_HEADER_SIZE {
            return Err(ProtocolError::MalformedHeader("header section too large".to_string()));
        }
    }
}

/// Extract the Content-Length value from the raw header section.
fn content_length(header: &[u8]) -> Result<usize, ProtocolError> {
    let text = std::str::from_utf8(header)
        .map_err(|_| ProtocolError::MalformedHeader("header is not UTF-8".to_string()))?;
    for line in text.split("\r\n") {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        if name.trim().eq_ignore_ascii_case("content-length") {
            return value
                .trim()
                .parse()
                .map_err(|_| ProtocolError::MalformedHeader(format!("bad length: {}", value.trim())));
        }
    }
    Err(ProtocolError::MissingContentLength)
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
