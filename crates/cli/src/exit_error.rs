// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Custom error type that carries a process exit code.
//!
//! Commands return `ExitError` instead of calling `std::process::exit()`
//! directly, allowing `main()` to handle process termination. The `From`
//! impls cover the error kinds the clankers commands surface, so handlers
//! can bubble them with `map_err(ExitError::from)`.

use std::fmt;

use clankers_core::{ConfigError, PathError};
use clankers_daemon::LifecycleError;
use clankers_storage::StorageError;

use crate::client::ClientError;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The general CLI failure path: exit status 1.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(1, message)
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

impl From<PathError> for ExitError {
    fn from(e: PathError) -> Self {
        Self::failure(e.to_string())
    }
}

impl From<ConfigError> for ExitError {
    fn from(e: ConfigError) -> Self {
        Self::failure(e.to_string())
    }
}

impl From<StorageError> for ExitError {
    fn from(e: StorageError) -> Self {
        Self::failure(e.to_string())
    }
}

impl From<LifecycleError> for ExitError {
    fn from(e: LifecycleError) -> Self {
        Self::failure(e.to_string())
    }
}

impl From<ClientError> for ExitError {
    fn from(e: ClientError) -> Self {
        Self::failure(e.to_string())
    }
}
