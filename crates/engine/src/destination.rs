// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Destination selection: remote archive server beats direct shared
//! storage beats local disk, but only virtualization-managed kinds may
//! use the hypervisor-backed destinations at all.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, warn};
use warden_core::{BackupConfig, BackupError, RemoteArchiveServerConfig, ServiceDescriptor};

const REMOTE_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// A reachability check for a configured remote archive server, abstracted
/// so the probe can be faked in tests instead of requiring a live listener.
#[async_trait]
pub trait RemoteReachability: Send + Sync {
    async fn check(&self, remote: &RemoteArchiveServerConfig) -> Result<(), BackupError>;
}

/// The real probe: an HTTP GET against the remote's version endpoint.
pub struct HttpProbe {
    http: reqwest::Client,
}

impl HttpProbe {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl RemoteReachability for HttpProbe {
    async fn check(&self, remote: &RemoteArchiveServerConfig) -> Result<(), BackupError> {
        probe_remote(&self.http, remote).await
    }
}

/// Picks where `service`'s next backup will land, probing remote
/// reachability when a remote archive server is configured and enabled.
pub async fn resolve(
    reachability: &dyn RemoteReachability,
    config: &BackupConfig,
    service: &ServiceDescriptor,
) -> Result<warden_core::BackupDestination, BackupError> {
    if !service.kind.is_hypervisor_managed() {
        return Ok(warden_core::BackupDestination::Local { path: config.root.clone() });
    }

    if let Some(remote) = &config.remote_archive_server {
        if remote.enabled {
            require_field(!remote.host.is_empty(), "host")?;
            require_field(!remote.datastore.is_empty(), "datastore")?;
            require_field(!remote.user.is_empty(), "user")?;
            reachability.check(remote).await?;
            return Ok(warden_core::BackupDestination::Remote { remote_config: remote.clone() });
        }
    }

    if let Some(direct) = &config.direct_shared_storage {
        if direct.enabled {
            require_field(!direct.path.is_empty(), "path")
                .map_err(|_| BackupError::DirectConfigIncomplete { field: "path" })?;
            if !["/mnt", "/nfs", "/ceph"].iter().any(|prefix| direct.path.starts_with(prefix)) {
                warn!(path = %direct.path, service = %service.name, "direct shared storage path is outside /mnt, /nfs, /ceph; proceeding anyway");
            }
            return Ok(warden_core::BackupDestination::Direct { path: direct.path.clone() });
        }
    }

    Ok(warden_core::BackupDestination::Local { path: config.root.clone() })
}

fn require_field(present: bool, field: &'static str) -> Result<(), BackupError> {
    if present {
        Ok(())
    } else {
        Err(BackupError::RemoteConfigIncomplete { field })
    }
}

async fn probe_remote(http: &reqwest::Client, remote: &warden_core::RemoteArchiveServerConfig) -> Result<(), BackupError> {
    let url = format!("https://{}:{}/api2/json/version", remote.host, remote.port);
    let result = http.get(&url).timeout(REMOTE_PROBE_TIMEOUT).send().await;
    match result {
        Ok(resp) if resp.status().is_success() => {
            info!(host = %remote.host, port = remote.port, "remote archive server reachable");
            Ok(())
        }
        Ok(resp) => Err(BackupError::RemoteUnreachable {
            host: remote.host.clone(),
            port: remote.port,
            reason: format!("server responded with status {}", resp.status()),
        }),
        Err(e) => Err(BackupError::RemoteUnreachable { host: remote.host.clone(), port: remote.port, reason: e.to_string() }),
    }
}

/// A scriptable reachability probe for tests: no live listener needed to
/// exercise the "remote reachable" path through `resolve`.
#[cfg(feature = "test-support")]
pub enum FakeReachability {
    AlwaysOk,
    AlwaysUnreachable,
}

#[cfg(feature = "test-support")]
#[async_trait]
impl RemoteReachability for FakeReachability {
    async fn check(&self, remote: &RemoteArchiveServerConfig) -> Result<(), BackupError> {
        match self {
            FakeReachability::AlwaysOk => Ok(()),
            FakeReachability::AlwaysUnreachable => Err(BackupError::RemoteUnreachable {
                host: remote.host.clone(),
                port: remote.port,
                reason: "fake probe: unreachable".to_string(),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use warden_core::{DirectSharedStorageConfig, ServiceKind};

    fn config() -> BackupConfig {
        BackupConfig {
            enabled: true,
            root: "/srv/backups".to_string(),
            retention_days: 14,
            compression: true,
            remote_archive_server: None,
            direct_shared_storage: None,
        }
    }

    fn service(kind: ServiceKind) -> ServiceDescriptor {
        ServiceDescriptor {
            name: "plex".to_string(),
            kind,
            enabled: true,
            backup: true,
            update: true,
            monitor: true,
            vmid: Some(101),
            node: Some("pve1".to_string()),
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

    #[tokio::test]
    async fn non_hypervisor_kinds_always_go_local() {
        let probe = HttpProbe::new(reqwest::Client::new());
        let dest = resolve(&probe, &config(), &service(ServiceKind::Docker)).await.unwrap();
        assert_eq!(dest, warden_core::BackupDestination::Local { path: "/srv/backups".to_string() });
    }

    #[tokio::test]
    async fn vm_without_remote_or_direct_falls_back_to_local() {
        let probe = HttpProbe::new(reqwest::Client::new());
        let dest = resolve(&probe, &config(), &service(ServiceKind::Vm)).await.unwrap();
        assert_eq!(dest, warden_core::BackupDestination::Local { path: "/srv/backups".to_string() });
    }

    #[tokio::test]
    async fn vm_with_direct_shared_storage_uses_direct() {
        let mut cfg = config();
        cfg.direct_shared_storage = Some(DirectSharedStorageConfig { enabled: true, path: "/mnt/pbs-direct".to_string(), format: "vma".to_string() });
        let probe = HttpProbe::new(reqwest::Client::new());
        let dest = resolve(&probe, &cfg, &service(ServiceKind::Vm)).await.unwrap();
        assert_eq!(dest, warden_core::BackupDestination::Direct { path: "/mnt/pbs-direct".to_string() });
    }

    #[tokio::test]
    async fn remote_archive_server_unreachable_is_a_backup_error() {
        let mut cfg = config();
        cfg.remote_archive_server = Some(RemoteArchiveServerConfig {
            enabled: true,
            host: "pbs.invalid.example".to_string(),
            port: 8007,
            datastore: "main".to_string(),
            user: "root@pam".to_string(),
            password: Some("secret".to_string()),
            password_command: None,
            verify_tls: true,
        });
        let probe = HttpProbe::new(reqwest::Client::new());
        let err = resolve(&probe, &cfg, &service(ServiceKind::Vm)).await.unwrap_err();
        assert!(matches!(err, BackupError::RemoteUnreachable { .. }));
    }

    #[cfg(feature = "test-support")]
    #[tokio::test]
    async fn remote_reachable_probe_selects_remote_over_direct() {
        let mut cfg = config();
        cfg.remote_archive_server = Some(RemoteArchiveServerConfig {
            enabled: true,
            host: "pbs.local".to_string(),
            port: 8007,
            datastore: "main".to_string(),
            user: "root@pam".to_string(),
            password: Some("secret".to_string()),
            password_command: None,
            verify_tls: true,
        });
        cfg.direct_shared_storage =
            Some(DirectSharedStorageConfig { enabled: true, path: "/mnt/pbs-direct".to_string(), format: "vma".to_string() });

        let dest = resolve(&FakeReachability::AlwaysOk, &cfg, &service(ServiceKind::Vm)).await.unwrap();
        assert!(matches!(dest, warden_core::BackupDestination::Remote { .. }));
    }
}
