// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `clankers query` - read-only SQL against the telemetry database.
//!
//! The daemon owns all writes; this command opens the database directly
//! for reads, with the read-only gate in front of every statement.

use anyhow::Result;
use clap::Args;

use clankers_storage::{Storage, StorageError};

use crate::exit_error::ExitError;
use crate::output::{cell_text, render_table, OutputFormat};

#[derive(Args)]
pub struct QueryArgs {
    /// SQL statement (SELECT/WITH only)
    pub sql: String,

    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

pub fn query(args: QueryArgs) -> Result<()> {
    let db_path = clankers_core::paths::db_path().map_err(ExitError::from)?;
    if !db_path.exists() {
        return Err(ExitError::failure(format!(
            "no database found at {} (is the daemon set up?)",
            db_path.display()
        ))
        .into());
    }

    let storage = Storage::open(&db_path).map_err(ExitError::from)?;
    let result = match storage.execute_query(&args.sql) {
        Ok(result) => result,
        Err(StorageError::QueryNotAllowed(msg)) => {
            return Err(ExitError::failure(msg).into());
        }
        Err(e) => {
            return Err(ExitError::failure(error_with_hint(&storage, &args.sql, &e)).into());
        }
    };

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result.rows)?);
        }
        OutputFormat::Table => {
            if result.rows.is_empty() {
                println!("(no rows)");
                return Ok(());
            }
            let cells: Vec<Vec<String>> = result
                .rows
                .iter()
                .map(|row| {
                    result
                        .columns
                        .iter()
                        .map(|col| {
                            cell_text(row.get(col).unwrap_or(&serde_json::Value::Null))
                        })
                        .collect()
                })
                .collect();
            print!("{}", render_table(&result.columns, &cells));
            println!("({} row{})", result.rows.len(), if result.rows.len() == 1 { "" } else { "s" });
        }
    }
    Ok(())
}

/// Append a "did you mean" column hint to SQLite's error when possible.
fn error_with_hint(storage: &Storage, sql: &str, error: &StorageError) -> String {
    let message = error.to_string();
    let Some(column) = unknown_column(&message) else {
        return message;
    };
    let Some(table) = table_name(sql) else {
        return message;
    };
    match storage.suggest_columns(&table, &column) {
        Ok(suggestions) if !suggestions.is_empty() => {
            format!("{}\n  did you mean: {}?", message, suggestions.join(", "))
        }
        _ => message,
    }
}

/// Extract `<name>` out of SQLite's "no such column: <name>" message.
fn unknown_column(message: &str) -> Option<String> {
    let tail = message.split("no such column: ").nth(1)?;
    let name = tail.split_whitespace().next()?;
    Some(name.trim_matches(|c: char| !c.is_alphanumeric() && c != '_').to_string())
}

/// The table named after the first FROM, when there is one.
fn table_name(sql: &str) -> Option<String> {
    let mut tokens = sql.split_whitespace();
    while let Some(token) = tokens.next() {
        if token.eq_ignore_ascii_case("from") {
            return tokens
                .next()
                .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric() && c != '_').to_string());
        }
    }
    None
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
