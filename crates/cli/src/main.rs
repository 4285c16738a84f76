// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `clankers` - session telemetry daemon and operator CLI.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod commands;
mod exit_error;
mod output;

use clap::{Parser, Subcommand};

use crate::exit_error::ExitError;

#[derive(Parser)]
#[command(name = "clankers", version, about = "Session telemetry daemon for AI coding assistants")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run or inspect the telemetry daemon
    Daemon(commands::daemon::DaemonArgs),
    /// Run a read-only SQL query against the telemetry database
    Query(commands::query::QueryArgs),
    /// Read or modify the configuration file
    Config(commands::config::ConfigArgs),
    /// List recorded sessions
    Sessions(commands::sessions::SessionsArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Daemon(args) => commands::daemon::daemon(args).await,
        Commands::Query(args) => commands::query::query(args),
        Commands::Config(args) => commands::config::config(args),
        Commands::Sessions(args) => commands::sessions::sessions(args),
    };

    if let Err(e) = result {
        if let Some(exit) = e.downcast_ref::<ExitError>() {
            eprintln!("{}", exit.message);
            std::process::exit(exit.code);
        }
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
