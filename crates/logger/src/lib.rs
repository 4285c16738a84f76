// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured JSON-Lines log sink.
//!
//! One file per local-date day, rotated on write under a single mutex so
//! lines never interleave. The daemon owns the only level filter; a
//! retention sweeper deletes files older than 30 days.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod sweeper;
mod writer;

pub use sweeper::{spawn_sweeper, sweep, RETENTION};
pub use writer::{Logger, LoggerError};
