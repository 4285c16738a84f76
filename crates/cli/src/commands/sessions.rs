// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `clankers sessions` - list recorded sessions, or show one.

use anyhow::Result;
use clap::{Args, Subcommand};

use clankers_storage::{Storage, StorageError};

use crate::exit_error::ExitError;
use crate::output::{format_or_json, render_table, OutputFormat};

#[derive(Args)]
pub struct SessionsArgs {
    /// Cap the number of sessions shown (newest first)
    #[arg(long, short = 'n')]
    pub limit: Option<u32>,

    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<SessionsCommand>,
}

#[derive(Subcommand)]
pub enum SessionsCommand {
    /// Show one session and its messages
    Show {
        id: String,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}

pub fn sessions(args: SessionsArgs) -> Result<()> {
    let storage = open_storage()?;
    match args.command {
        Some(SessionsCommand::Show { id, format }) => show(&storage, &id, format),
        None => list(&storage, args.limit, args.format),
    }
}

fn open_storage() -> Result<Storage> {
    let db_path = clankers_core::paths::db_path().map_err(ExitError::from)?;
    if !db_path.exists() {
        return Err(
            ExitError::failure(format!("no database found at {}", db_path.display())).into()
        );
    }
    Ok(Storage::open(&db_path).map_err(ExitError::from)?)
}

fn list(storage: &Storage, limit: Option<u32>, format: OutputFormat) -> Result<()> {
    let rows = storage.list_sessions(limit).map_err(ExitError::from)?;

    format_or_json(format, &rows, || {
        if rows.is_empty() {
            println!("No sessions recorded.");
            return;
        }
        let headers: Vec<String> = ["ID", "TITLE", "SOURCE", "MODEL", "STATUS", "MESSAGES"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let cells: Vec<Vec<String>> = rows
            .iter()
            .map(|row| {
                vec![
                    row.id.clone(),
                    text_or_dash(&row.title),
                    text_or_dash(&row.source),
                    text_or_dash(&row.model),
                    text_or_dash(&row.status),
                    row.message_count.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string()),
                ]
            })
            .collect();
        print!("{}", render_table(&headers, &cells));
    })
}

fn show(storage: &Storage, id: &str, format: OutputFormat) -> Result<()> {
    let detail = match storage.get_session(id) {
        Ok(detail) => detail,
        Err(StorageError::NotFound(_)) => {
            return Err(ExitError::failure(format!("session not found: {}", id)).into());
        }
        Err(e) => return Err(ExitError::from(e).into()),
    };

    format_or_json(format, &detail, || {
        let session = &detail.session;
        println!("Session: {}", session.id);
        println!("Title: {}", text_or_dash(&session.title));
        println!("Source: {}", text_or_dash(&session.source));
        println!("Model: {}", text_or_dash(&session.model));
        println!("Status: {}", text_or_dash(&session.status));
        if let (Some(prompt), Some(completion)) =
            (session.prompt_tokens, session.completion_tokens)
        {
            println!("Tokens: {} prompt / {} completion", prompt, completion);
        }
        println!();
        if detail.messages.is_empty() {
            println!("No messages.");
            return;
        }
        println!("Messages ({}):", detail.messages.len());
        for message in &detail.messages {
            let role = message.role.as_deref().unwrap_or("-");
            let preview = message
                .text_content
                .as_deref()
                .unwrap_or("")
                .chars()
                .take(72)
                .collect::<String>();
            println!("  [{}] {}", role, preview);
        }
    })
}

fn text_or_dash(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}
