// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output helpers shared by the CLI commands.

use clap::ValueEnum;
use serde::Serialize;

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Print `obj` as JSON, or run the text fallback.
pub fn format_or_json<T: Serialize>(
    format: OutputFormat,
    obj: &T,
    text: impl FnOnce(),
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(obj)?);
            Ok(())
        }
        OutputFormat::Table => {
            text();
            Ok(())
        }
    }
}

/// Render rows as an aligned text table. `cells` are row-major and must
/// match `headers` in width.
pub fn render_table(headers: &[String], cells: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in cells {
        for (idx, cell) in row.iter().enumerate() {
            if idx < widths.len() && cell.len() > widths[idx] {
                widths[idx] = cell.len();
            }
        }
    }

    let mut out = String::new();
    render_row(&mut out, headers, &widths);
    for row in cells {
        render_row(&mut out, row, &widths);
    }
    out
}

fn render_row(out: &mut String, cells: &[String], widths: &[usize]) {
    for (idx, cell) in cells.iter().enumerate() {
        if idx > 0 {
            out.push_str("  ");
        }
        out.push_str(cell);
        // No trailing padding on the last column
        if idx + 1 < cells.len() {
            for _ in cell.len()..widths[idx] {
                out.push(' ');
            }
        }
    }
    out.push('\n');
}

/// One query cell as display text.
pub fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "-".to_string(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
