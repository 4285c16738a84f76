// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `clankers config` - read and modify the configuration file.

use anyhow::Result;
use clap::{Args, Subcommand};

use clankers_core::ConfigStore;

use crate::exit_error::ExitError;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print one value from the active profile
    Get { key: String },
    /// Set one value on the active profile
    Set { key: String, value: String },
    /// Print every key of the active profile
    List,
    /// Manage named profiles
    Profiles {
        #[command(subcommand)]
        command: ProfilesCommand,
    },
}

#[derive(Subcommand)]
pub enum ProfilesCommand {
    /// List profile names; the active one is marked
    List,
    /// Switch the active profile
    Use { name: String },
    /// Create a new profile from defaults
    Create { name: String },
    /// Delete a profile (`default` is protected)
    Delete { name: String },
}

const KEYS: &[&str] = &["endpoint", "sync_enabled", "sync_interval", "auth"];

pub fn config(args: ConfigArgs) -> Result<()> {
    let store = load_store()?;
    match args.command {
        ConfigCommand::Get { key } => {
            let value = store.get_value(&key).map_err(ExitError::from)?;
            println!("{}", value);
            Ok(())
        }
        ConfigCommand::Set { key, value } => {
            let mut store = store;
            store.set_value(&key, &value).map_err(ExitError::from)?;
            store.save().map_err(ExitError::from)?;
            Ok(())
        }
        ConfigCommand::List => {
            for key in KEYS {
                let value = store.get_value(key).map_err(ExitError::from)?;
                println!("{} = {}", key, value);
            }
            Ok(())
        }
        ConfigCommand::Profiles { command: ProfilesCommand::List } => {
            for name in store.profile_names() {
                if name == store.active_profile_name() {
                    println!("* {}", name);
                } else {
                    println!("  {}", name);
                }
            }
            Ok(())
        }
        ConfigCommand::Profiles { command: ProfilesCommand::Use { name } } => {
            let mut store = store;
            store.set_active_profile(&name).map_err(ExitError::from)?;
            store.save().map_err(ExitError::from)?;
            println!("Active profile: {}", name);
            Ok(())
        }
        ConfigCommand::Profiles { command: ProfilesCommand::Create { name } } => {
            let mut store = store;
            store.create_profile(&name);
            store.save().map_err(ExitError::from)?;
            println!("Created profile: {}", name);
            Ok(())
        }
        ConfigCommand::Profiles { command: ProfilesCommand::Delete { name } } => {
            let mut store = store;
            store.delete_profile(&name).map_err(ExitError::from)?;
            store.save().map_err(ExitError::from)?;
            println!("Deleted profile: {}", name);
            Ok(())
        }
    }
}

fn load_store() -> Result<ConfigStore> {
    let path = clankers_core::paths::config_path().map_err(ExitError::from)?;
    Ok(ConfigStore::load(path).map_err(ExitError::from)?)
}
