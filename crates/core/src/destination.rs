// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Where a backup archive ends up.
//!
//! The Python original carried this as a `method: str` field on the backup
//! config plus a grab-bag of optional fields consulted by string
//! comparison. Modeled here as a proper sum type so an unreachable
//! destination variant is a compile error, not a runtime KeyError.

use crate::normalize::deserialize_lowercase;
use serde::{Deserialize, Serialize};

/// A remote archive server reached over the network (Proxmox Backup
/// Server or equivalent), configured under `backup.remote_archive_server`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteArchiveServerConfig {
    #[serde(default)]
    pub enabled: bool,
    pub host: String,
    #[serde(default = "default_remote_port")]
    pub port: u16,
    pub datastore: String,
    pub user: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub password_command: Option<String>,
    #[serde(default = "default_true")]
    pub verify_tls: bool,
}

fn default_remote_port() -> u16 {
    8007
}

fn default_true() -> bool {
    true
}

/// Shared storage already mounted and reachable from every hypervisor
/// node, configured under `backup.direct_shared_storage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirectSharedStorageConfig {
    #[serde(default)]
    pub enabled: bool,
    pub path: String,
    #[serde(default = "default_format", deserialize_with = "deserialize_lowercase")]
    pub format: String,
}

fn default_format() -> String {
    "vma".to_string()
}

/// The resolved destination for one service's backup attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum BackupDestination {
    Remote { remote_config: RemoteArchiveServerConfig },
    Direct { path: String },
    Local { path: String },
}

impl BackupDestination {
    /// The `method` tag as used in logs, metadata, and state.
    pub fn method(&self) -> &'static str {
        match self {
            BackupDestination::Remote { .. } => "remote",
            BackupDestination::Direct { .. } => "direct",
            BackupDestination::Local { .. } => "local",
        }
    }
}
