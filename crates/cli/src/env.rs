// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI binary.

use std::path::PathBuf;

const DEFAULT_CONFIG_PATH: &str = "/etc/warden/config.yml";
const DEFAULT_STATE_DB_PATH: &str = "/var/lib/warden/state.db";

/// Path to the primary YAML configuration document: `WARDEN_CONFIG`, or
/// `/etc/warden/config.yml` if unset.
pub fn config_path() -> PathBuf {
    std::env::var("WARDEN_CONFIG").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Path to the SQLite state database: `WARDEN_STATE_DB`, or
/// `/var/lib/warden/state.db` if unset.
pub fn state_db_path() -> PathBuf {
    std::env::var("WARDEN_STATE_DB").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from(DEFAULT_STATE_DB_PATH))
}
