// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only query gate.
//!
//! A lexical guardrail, not a parser: the caller is local and trusted, the
//! gate only has to stop accidental writes from the operator CLI. It runs
//! before any statement reaches the database.

use crate::StorageError;

/// Keywords blocked anywhere in a statement, whitespace-delimited.
const FORBIDDEN: &[&str] = &[
    "INSERT", "UPDATE", "DELETE", "DROP", "CREATE", "ALTER", "TRUNCATE", "REPLACE", "MERGE",
    "UPSERT", "ATTACH", "DETACH", "REINDEX", "VACUUM", "PRAGMA", "BEGIN", "COMMIT", "ROLLBACK",
    "SAVEPOINT", "RELEASE",
];

/// Reject anything that is not a plain `SELECT`/`WITH` statement.
pub fn check_read_only(sql: &str) -> Result<(), StorageError> {
    let upper = sql.trim().to_uppercase();

    let leading = upper.split_whitespace().next().unwrap_or("");
    if leading != "SELECT" && leading != "WITH" {
        if FORBIDDEN.contains(&leading) {
            return Err(StorageError::QueryNotAllowed(format!(
                "{} statements are blocked",
                leading
            )));
        }
        return Err(StorageError::QueryNotAllowed(
            "only SELECT/WITH queries are allowed".to_string(),
        ));
    }

    for token in upper.split_whitespace() {
        if FORBIDDEN.contains(&token) {
            return Err(StorageError::QueryNotAllowed(format!("{} statements are blocked", token)));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
