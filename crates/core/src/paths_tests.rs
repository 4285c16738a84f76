// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

struct EnvGuard {
    vars: Vec<(&'static str, Option<String>)>,
}

impl EnvGuard {
    fn set(pairs: &[(&'static str, Option<&str>)]) -> Self {
        let vars = pairs
            .iter()
            .map(|(name, value)| {
                let saved = std::env::var(name).ok();
                match value {
                    Some(v) => std::env::set_var(name, v),
                    None => std::env::remove_var(name),
                }
                (*name, saved)
            })
            .collect();
        Self { vars }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (name, saved) in &self.vars {
            match saved {
                Some(v) => std::env::set_var(name, v),
                None => std::env::remove_var(name),
            }
        }
    }
}

#[test]
#[serial]
fn data_path_override_wins() {
    let _env = EnvGuard::set(&[("CLANKERS_DATA_PATH", Some("/tmp/custom-root"))]);
    assert_eq!(data_root().unwrap(), PathBuf::from("/tmp/custom-root"));
    assert_eq!(data_dir().unwrap(), PathBuf::from("/tmp/custom-root/clankers"));
}

#[test]
#[serial]
fn empty_override_is_ignored() {
    let _env = EnvGuard::set(&[("CLANKERS_DATA_PATH", Some(""))]);
    // Falls back to the platform default rather than an empty path
    assert_ne!(data_root().unwrap(), PathBuf::new());
}

#[test]
#[serial]
fn db_path_defaults_under_data_dir() {
    let _env = EnvGuard::set(&[
        ("CLANKERS_DATA_PATH", Some("/tmp/root")),
        ("CLANKERS_DB_PATH", None),
    ]);
    assert_eq!(db_path().unwrap(), PathBuf::from("/tmp/root/clankers/clankers.db"));
}

#[test]
#[serial]
fn db_path_override_wins() {
    let _env = EnvGuard::set(&[("CLANKERS_DB_PATH", Some("/tmp/elsewhere.db"))]);
    assert_eq!(db_path().unwrap(), PathBuf::from("/tmp/elsewhere.db"));
}

#[test]
#[serial]
fn config_path_lives_in_data_dir() {
    let _env = EnvGuard::set(&[("CLANKERS_DATA_PATH", Some("/tmp/root"))]);
    assert_eq!(config_path().unwrap(), PathBuf::from("/tmp/root/clankers/clankers.json"));
}

#[test]
#[serial]
#[cfg(not(windows))]
fn socket_path_defaults_to_unix_socket() {
    let _env = EnvGuard::set(&[
        ("CLANKERS_DATA_PATH", Some("/tmp/root")),
        ("CLANKERS_SOCKET_PATH", None),
    ]);
    assert_eq!(
        socket_path().unwrap(),
        PathBuf::from("/tmp/root/clankers/dxta-clankers.sock")
    );
}

#[test]
#[serial]
fn socket_path_override_wins() {
    let _env = EnvGuard::set(&[("CLANKERS_SOCKET_PATH", Some("/tmp/other.sock"))]);
    assert_eq!(socket_path().unwrap(), PathBuf::from("/tmp/other.sock"));
}

#[test]
#[serial]
fn log_dir_defaults_under_data_dir() {
    let _env = EnvGuard::set(&[
        ("CLANKERS_DATA_PATH", Some("/tmp/root")),
        ("CLANKERS_LOG_PATH", None),
    ]);
    assert_eq!(log_dir().unwrap(), PathBuf::from("/tmp/root/clankers/logs"));
}

#[test]
fn log_file_name_encodes_date() {
    let date = NaiveDate::from_ymd_opt(2025, 1, 29).unwrap();
    assert_eq!(log_file_name(date), "clankers-2025-01-29.jsonl");
}

#[test]
fn log_file_name_pads_month_and_day() {
    let date = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
    assert_eq!(log_file_name(date), "clankers-2025-03-05.jsonl");
}

#[test]
#[serial]
fn current_log_file_is_todays_name_under_log_dir() {
    let _env = EnvGuard::set(&[
        ("CLANKERS_DATA_PATH", Some("/tmp/root")),
        ("CLANKERS_LOG_PATH", None),
    ]);
    let expected = log_dir().unwrap().join(log_file_name(chrono::Local::now().date_naive()));
    assert_eq!(current_log_file().unwrap(), expected);
}
