// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service descriptors: the unit of work the engine iterates over.

use crate::error::ValueError;
use serde::{Deserialize, Serialize};

/// What kind of workload a service is. Determines which adapter capability
/// set handles it: `Vm`/`Lxc` go through the hypervisor adapter, the rest
/// through the service adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    Vm,
    Lxc,
    Docker,
    Systemd,
    Generic,
    Host,
}

impl ServiceKind {
    /// Whether this kind is served by the hypervisor adapter rather than
    /// the service adapter.
    pub fn is_hypervisor_managed(self) -> bool {
        matches!(self, ServiceKind::Vm | ServiceKind::Lxc)
    }
}

/// Accepts any case (`Docker`, `DOCKER`, `docker`), matching the original
/// loader's `.lower()` pass on the service `type` field before validation.
impl<'de> Deserialize<'de> for ServiceKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        match raw.to_lowercase().as_str() {
            "vm" => Ok(ServiceKind::Vm),
            "lxc" => Ok(ServiceKind::Lxc),
            "docker" => Ok(ServiceKind::Docker),
            "systemd" => Ok(ServiceKind::Systemd),
            "generic" => Ok(ServiceKind::Generic),
            "host" => Ok(ServiceKind::Host),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &["vm", "lxc", "docker", "systemd", "generic", "host"],
            )),
        }
    }
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ServiceKind::Vm => "vm",
            ServiceKind::Lxc => "lxc",
            ServiceKind::Docker => "docker",
            ServiceKind::Systemd => "systemd",
            ServiceKind::Generic => "generic",
            ServiceKind::Host => "host",
        };
        f.write_str(s)
    }
}

/// One backupable unit as declared in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    /// Unique name, used as the key into state and as the default
    /// filename stem.
    pub name: String,
    pub kind: ServiceKind,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Whether this service participates in `backup_all_services`.
    #[serde(default = "default_true")]
    pub backup: bool,
    #[serde(default = "default_true")]
    pub update: bool,
    #[serde(default = "default_true")]
    pub monitor: bool,

    // vm/lxc
    #[serde(default)]
    pub vmid: Option<i64>,
    #[serde(default)]
    pub node: Option<String>,

    // docker
    #[serde(default)]
    pub container_name: Option<String>,
    #[serde(default)]
    pub compose_file: Option<String>,

    // systemd
    #[serde(default)]
    pub unit_name: Option<String>,
    #[serde(default)]
    pub config_paths: Vec<String>,
    #[serde(default)]
    pub data_paths: Vec<String>,
    #[serde(default)]
    pub package_name: Option<String>,

    // generic / host
    #[serde(default)]
    pub backup_paths: Vec<String>,

    /// Optional HTTP health-check URL, consulted by the service
    /// adapter's `validate` step for any kind.
    #[serde(default)]
    pub health_check_url: Option<String>,

    /// Per-service retention override; falls back to the global backup
    /// config's `retention_days` when absent.
    #[serde(default)]
    pub retention_days: Option<i64>,
}

fn default_true() -> bool {
    true
}

impl ServiceDescriptor {
    /// Validates invariants that must hold regardless of kind: non-empty
    /// name, kind-appropriate required fields present, valid vmid range.
    pub fn validate(&self) -> Result<(), ValueError> {
        if self.name.trim().is_empty() {
            return Err(ValueError::EmptyServiceName);
        }
        if let Some(days) = self.retention_days {
            if days < 1 {
                return Err(ValueError::Invalid {
                    reason: format!(
                        "service '{}': retention_days must be at least 1, got {days}",
                        self.name
                    ),
                });
            }
        }
        match self.kind {
            ServiceKind::Vm | ServiceKind::Lxc => {
                let vmid = self.vmid.ok_or_else(|| self.missing("vmid"))?;
                if !(100..=999_999).contains(&vmid) {
                    return Err(ValueError::Invalid {
                        reason: format!(
                            "service '{}': vmid must be in [100, 999999], got {vmid}",
                            self.name
                        ),
                    });
                }
                if self.node.is_none() {
                    return Err(self.missing("node"));
                }
            }
            ServiceKind::Docker => {
                if self.container_name.is_none() {
                    return Err(self.missing("container_name"));
                }
            }
            ServiceKind::Systemd => {
                if self.unit_name.is_none() {
                    return Err(self.missing("unit_name"));
                }
            }
            ServiceKind::Generic | ServiceKind::Host => {}
        }
        Ok(())
    }

    fn missing(&self, field: &str) -> ValueError {
        ValueError::Invalid {
            reason: format!("service '{}' ({}): missing required field '{field}'", self.name, self.kind),
        }
    }

    /// Returns the effective retention window, falling back to `default_days`
    /// when no per-service override is set.
    pub fn effective_retention_days(&self, default_days: i64) -> i64 {
        self.retention_days.unwrap_or(default_days)
    }

    /// Name with spaces and forward slashes replaced by underscores, safe
    /// for use as a filename stem.
    pub fn safe_name(&self) -> String {
        self.name.chars().map(|c| if c == ' ' || c == '/' { '_' } else { c }).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn vm(name: &str, vmid: Option<i64>, node: Option<&str>) -> ServiceDescriptor {
        ServiceDescriptor {
            name: name.to_string(),
            kind: ServiceKind::Vm,
            enabled: true,
            backup: true,
            update: true,
            monitor: true,
            vmid,
            node: node.map(str::to_string),
            container_name: None,
            compose_file: None,
            unit_name: None,
            config_paths: Vec::new(),
            data_paths: Vec::new(),
            package_name: None,
            backup_paths: Vec::new(),
            health_check_url: None,
            retention_days: None,
        }
    }

    #[test]
    fn rejects_empty_name() {
        let mut svc = vm("plex", Some(101), Some("pve1"));
        svc.name = "   ".to_string();
        assert!(matches!(svc.validate(), Err(ValueError::EmptyServiceName)));
    }

    #[test]
    fn rejects_vm_missing_vmid() {
        let svc = vm("plex", None, Some("pve1"));
        assert!(svc.validate().is_err());
    }

    #[test]
    fn rejects_vm_missing_node() {
        let svc = vm("plex", Some(101), None);
        assert!(svc.validate().is_err());
    }

    #[test]
    fn rejects_vmid_out_of_range() {
        let svc = vm("plex", Some(50), Some("pve1"));
        assert!(svc.validate().is_err());
    }

    #[test]
    fn accepts_well_formed_vm() {
        let svc = vm("plex", Some(101), Some("pve1"));
        assert!(svc.validate().is_ok());
    }

    #[test]
    fn safe_name_replaces_spaces_and_slashes() {
        let mut svc = vm("my plex/server", Some(101), Some("pve1"));
        svc.name = "my plex/server".to_string();
        assert_eq!(svc.safe_name(), "my_plex_server");
    }

    #[test]
    fn effective_retention_falls_back_to_default() {
        let svc = vm("plex", Some(101), Some("pve1"));
        assert_eq!(svc.effective_retention_days(14), 14);
    }

    #[test]
    fn effective_retention_honors_override() {
        let mut svc = vm("plex", Some(101), Some("pve1"));
        svc.retention_days = Some(30);
        assert_eq!(svc.effective_retention_days(14), 30);
    }

    #[test]
    fn kind_deserializes_case_insensitively() {
        let docker: ServiceKind = serde_json::from_str("\"Docker\"").unwrap();
        assert_eq!(docker, ServiceKind::Docker);
        let vm_kind: ServiceKind = serde_json::from_str("\"VM\"").unwrap();
        assert_eq!(vm_kind, ServiceKind::Vm);
    }

    #[test]
    fn kind_rejects_unknown_variant() {
        let result: Result<ServiceKind, _> = serde_json::from_str("\"container\"");
        assert!(result.is_err());
    }
}
