// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON configuration store: named profiles with one active profile.
//!
//! The file lives at data dir + `clankers.json`. In-memory state is the
//! source of truth within a process; the daemon reads it once at startup
//! and never rereads.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Profile that every config starts with and that cannot be deleted.
pub const DEFAULT_PROFILE: &str = "default";

/// Config store errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("profile not found: {0}")]
    ProfileNotFound(String),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("unknown config key: {0}")]
    UnknownKey(String),

    #[error("cannot delete the {0} profile")]
    ProtectedProfile(String),
}

/// Authentication mode. Only `none` is implemented; other values are
/// reserved for future sync backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    #[default]
    None,
}

/// A named configuration bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub sync_enabled: bool,
    #[serde(default = "default_sync_interval")]
    pub sync_interval: u32,
    #[serde(default, rename = "auth")]
    pub auth_mode: AuthMode,
}

fn default_sync_interval() -> u32 {
    30
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            sync_enabled: false,
            sync_interval: default_sync_interval(),
            auth_mode: AuthMode::None,
        }
    }
}

/// On-disk config shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub profiles: BTreeMap<String, Profile>,
    pub active_profile: String,
}

impl Default for Config {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(DEFAULT_PROFILE.to_string(), Profile::default());
        Self { profiles, active_profile: DEFAULT_PROFILE.to_string() }
    }
}

/// Config file plus the path it was loaded from.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    config: Config,
    path: PathBuf,
}

impl ConfigStore {
    /// Load the config from `path`, or start from defaults when the file
    /// does not exist. Environment overrides (`CLANKERS_ENDPOINT`,
    /// `CLANKERS_SYNC_ENABLED`) are applied to the active profile; an
    /// unparseable boolean leaves the field unchanged.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(&path)?;
            let config: Config = serde_json::from_str(&text)?;
            if !config.profiles.contains_key(&config.active_profile) {
                return Err(ConfigError::ProfileNotFound(config.active_profile));
            }
            config
        } else {
            Config::default()
        };

        apply_env_overrides(&mut config);
        Ok(Self { config, path })
    }

    /// Write the current state as indented JSON, creating parent
    /// directories when missing.
    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(&self.config)?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn active_profile_name(&self) -> &str {
        &self.config.active_profile
    }

    /// Copy of the current active profile.
    pub fn active_profile(&self) -> Profile {
        self.config
            .profiles
            .get(&self.config.active_profile)
            .cloned()
            .unwrap_or_default()
    }

    pub fn profile_names(&self) -> Vec<String> {
        self.config.profiles.keys().cloned().collect()
    }

    pub fn set_active_profile(&mut self, name: &str) -> Result<(), ConfigError> {
        if !self.config.profiles.contains_key(name) {
            return Err(ConfigError::ProfileNotFound(name.to_string()));
        }
        self.config.active_profile = name.to_string();
        Ok(())
    }

    /// Add a new profile initialised from defaults. No-op when the name
    /// already exists.
    pub fn create_profile(&mut self, name: &str) {
        self.config
            .profiles
            .entry(name.to_string())
            .or_default();
    }

    pub fn delete_profile(&mut self, name: &str) -> Result<(), ConfigError> {
        if name == DEFAULT_PROFILE {
            return Err(ConfigError::ProtectedProfile(name.to_string()));
        }
        if self.config.profiles.remove(name).is_none() {
            return Err(ConfigError::ProfileNotFound(name.to_string()));
        }
        if self.config.active_profile == name {
            self.config.active_profile = DEFAULT_PROFILE.to_string();
        }
        Ok(())
    }

    /// String get on the active profile for the closed key set
    /// `{endpoint, sync_enabled, sync_interval, auth}`.
    pub fn get_value(&self, key: &str) -> Result<String, ConfigError> {
        let profile = self.active_profile();
        match key {
            "endpoint" => Ok(profile.endpoint),
            "sync_enabled" => Ok(profile.sync_enabled.to_string()),
            "sync_interval" => Ok(profile.sync_interval.to_string()),
            "auth" => Ok("none".to_string()),
            _ => Err(ConfigError::UnknownKey(key.to_string())),
        }
    }

    /// String set on the active profile. Boolean and integer parses are
    /// strict; any parse error is `InvalidValue`.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let active = self.config.active_profile.clone();
        let profile = self
            .config
            .profiles
            .get_mut(&active)
            .ok_or(ConfigError::ProfileNotFound(active))?;
        match key {
            "endpoint" => profile.endpoint = value.to_string(),
            "sync_enabled" => {
                profile.sync_enabled = parse_bool(value).ok_or_else(|| {
                    ConfigError::InvalidValue { key: key.to_string(), value: value.to_string() }
                })?;
            }
            "sync_interval" => {
                profile.sync_interval = value.parse().map_err(|_| {
                    ConfigError::InvalidValue { key: key.to_string(), value: value.to_string() }
                })?;
            }
            "auth" => {
                if value != "none" {
                    return Err(ConfigError::InvalidValue {
                        key: key.to_string(),
                        value: value.to_string(),
                    });
                }
                profile.auth_mode = AuthMode::None;
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

fn apply_env_overrides(config: &mut Config) {
    let active = config.active_profile.clone();
    let Some(profile) = config.profiles.get_mut(&active) else {
        return;
    };
    if let Ok(endpoint) = std::env::var("CLANKERS_ENDPOINT") {
        profile.endpoint = endpoint;
    }
    if let Ok(enabled) = std::env::var("CLANKERS_SYNC_ENABLED") {
        if let Some(value) = parse_bool(&enabled) {
            profile.sync_enabled = value;
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
