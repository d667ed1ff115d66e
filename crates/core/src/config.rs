// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plain data shapes for the global configuration tree.
//!
//! Kept in `warden-core` (rather than `warden-config`) so adapters and the
//! engine can depend on the typed configuration without pulling in the
//! YAML loader and merge logic.

use crate::normalize::deserialize_lowercase;
use serde::{Deserialize, Serialize};

/// Credentials and connection details for the hypervisor cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HypervisorConfig {
    #[serde(default = "default_hypervisor_kind", deserialize_with = "deserialize_lowercase")]
    pub kind: String,
    pub host: String,
    pub user: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub token_id: Option<String>,
    #[serde(default)]
    pub token_secret: Option<String>,
    #[serde(default = "default_true")]
    pub verify_tls: bool,
}

fn default_hypervisor_kind() -> String {
    "proxmox".to_string()
}

/// Top-level backup subsystem settings: root directory, default
/// retention, and optional alternate destinations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackupConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub root: String,
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
    #[serde(default = "default_true")]
    pub compression: bool,
    #[serde(default)]
    pub remote_archive_server: Option<crate::destination::RemoteArchiveServerConfig>,
    #[serde(default)]
    pub direct_shared_storage: Option<crate::destination::DirectSharedStorageConfig>,
}

fn default_retention_days() -> i64 {
    30
}

fn default_true() -> bool {
    true
}

/// Where and how to send run summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotificationConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_notification_kind", deserialize_with = "deserialize_lowercase")]
    pub kind: String,
    #[serde(default)]
    pub settings: serde_json::Map<String, serde_json::Value>,
}

fn default_notification_kind() -> String {
    "webhook".to_string()
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { enabled: false, kind: default_notification_kind(), settings: Default::default() }
    }
}

/// The fully loaded, validated configuration tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlobalConfig {
    pub hypervisor: HypervisorConfig,
    pub backup: BackupConfig,
    #[serde(default)]
    pub notification: NotificationConfig,
    #[serde(default)]
    pub services: Vec<crate::service::ServiceDescriptor>,
}

impl GlobalConfig {
    /// Looks up a service by name.
    pub fn service(&self, name: &str) -> Option<&crate::service::ServiceDescriptor> {
        self.services.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn hypervisor_kind_normalizes_to_lowercase() {
        let hv: HypervisorConfig = serde_yaml::from_str(
            "kind: Proxmox\nhost: pve.local\nuser: root@pam\n",
        )
        .unwrap();
        assert_eq!(hv.kind, "proxmox");
    }

    #[test]
    fn notification_kind_normalizes_to_lowercase() {
        let n: NotificationConfig = serde_yaml::from_str("kind: WEBHOOK\n").unwrap();
        assert_eq!(n.kind, "webhook");
    }

    #[test]
    fn hypervisor_config_rejects_unknown_field() {
        let result: Result<HypervisorConfig, _> =
            serde_yaml::from_str("kind: proxmox\nhost: pve.local\nuser: root@pam\nbogus: true\n");
        assert!(result.is_err());
    }
}
