// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `clankers daemon` - run the daemon in the foreground, or check it.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::client::DaemonClient;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct DaemonArgs {
    /// Socket (or Windows TCP address) to listen on
    #[arg(long)]
    pub socket: Option<PathBuf>,

    /// Data root directory override
    #[arg(long)]
    pub data_root: Option<PathBuf>,

    /// Database file override
    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// Minimum structured-log level (debug|info|warn|error)
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<DaemonCommand>,
}

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Check whether a daemon is running on the configured socket
    Status {
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Print the tail of today's structured log file
    Logs {
        /// Number of recent lines to show
        #[arg(short = 'n', long, default_value = "200")]
        limit: usize,
    },
}

pub async fn daemon(args: DaemonArgs) -> Result<()> {
    match args.command {
        Some(DaemonCommand::Status { format }) => status(format).await,
        Some(DaemonCommand::Logs { limit }) => logs(limit),
        None => run(args).await,
    }
}

/// Run the daemon in the foreground until a shutdown signal.
///
/// Flags are exported as the matching `CLANKERS_*` variables before any
/// path is resolved, so nested components agree on the layout.
async fn run(args: DaemonArgs) -> Result<()> {
    if let Some(socket) = args.socket {
        std::env::set_var("CLANKERS_SOCKET_PATH", socket);
    }
    if let Some(data_root) = args.data_root {
        std::env::set_var("CLANKERS_DATA_PATH", data_root);
    }
    if let Some(db_path) = args.db_path {
        std::env::set_var("CLANKERS_DB_PATH", db_path);
    }
    if let Some(level) = args.log_level {
        std::env::set_var("CLANKERS_LOG_LEVEL", level);
    }

    let config = clankers_daemon::DaemonConfig::load().map_err(ExitError::from)?;
    clankers_daemon::run(config)
        .await
        .map_err(|e| ExitError::failure(format!("daemon failed: {}", e)))?;
    Ok(())
}

fn logs(limit: usize) -> Result<()> {
    let path = clankers_core::paths::current_log_file().map_err(ExitError::from)?;
    if !path.exists() {
        println!("No log file found at {}", path.display());
        return Ok(());
    }

    let content = std::fs::read_to_string(&path)?;
    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(limit);
    for line in &lines[start..] {
        println!("{}", line);
    }
    Ok(())
}

async fn status(format: OutputFormat) -> Result<()> {
    let client = DaemonClient::from_env().map_err(ExitError::from)?;

    match client.health().await {
        Ok(version) => {
            let obj = serde_json::json!({ "status": "running", "version": version });
            format_or_json(format, &obj, || {
                println!("Status: running");
                println!("Version: {}", version);
            })
        }
        Err(_) => {
            let obj = serde_json::json!({ "status": "not_running" });
            format_or_json(format, &obj, || println!("Daemon not running"))
        }
    }
}
