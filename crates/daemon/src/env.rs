// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.
//!
//! Path variables (`CLANKERS_DATA_PATH` and friends) are read by the core
//! path resolver; only daemon-specific knobs live here.

use clankers_core::LogLevel;

/// Daemon version advertised by the `health` method.
pub const DAEMON_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Minimum structured-log level: `CLANKERS_LOG_LEVEL`, defaulting to info.
/// Unrecognised values degrade to info rather than failing startup.
pub fn log_level() -> LogLevel {
    std::env::var("CLANKERS_LOG_LEVEL")
        .map(|s| LogLevel::parse(&s))
        .unwrap_or_default()
}
