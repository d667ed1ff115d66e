// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end pipeline scenarios against fake adapters: a single
//! successful local backup, a mixed-result run with a notifier
//! summary, remote-over-direct priority, and an unreachable remote
//! archive server surfacing as a hard failure rather than a silent
//! fallback.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use warden_adapters::test_support::{FakeHypervisorAdapter, FakeNotifierAdapter, FakeServiceAdapter};
use warden_core::{
    BackupConfig, Clock, DirectSharedStorageConfig, FakeClock, GlobalConfig, HypervisorConfig, NotificationConfig,
    RemoteArchiveServerConfig, ServiceDescriptor, ServiceKind,
};
use warden_engine::BackupEngine;
use warden_state::fake::FakeStateStore;
use warden_state::StateStore;

fn clock() -> Arc<FakeClock> {
    Arc::new(FakeClock::new("2026-03-05T02:30:00Z".parse().expect("valid timestamp")))
}

fn docker_service(name: &str) -> ServiceDescriptor {
    ServiceDescriptor {
        name: name.to_string(),
        kind: ServiceKind::Docker,
        enabled: true,
        backup: true,
        update: true,
        monitor: true,
        vmid: None,
        node: None,
        container_name: Some(name.to_string()),
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

fn vm_service(name: &str, vmid: i64) -> ServiceDescriptor {
    ServiceDescriptor {
        name: name.to_string(),
        kind: ServiceKind::Vm,
        enabled: true,
        backup: true,
        update: true,
        monitor: true,
        vmid: Some(vmid),
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

fn base_config(dir: &std::path::Path, services: Vec<ServiceDescriptor>) -> GlobalConfig {
    GlobalConfig {
        hypervisor: HypervisorConfig {
            kind: "proxmox".to_string(),
            host: "pve.local".to_string(),
            user: "root@pam".to_string(),
            password: None,
            token_id: Some("autopilot".to_string()),
            token_secret: Some("secret".to_string()),
            verify_tls: true,
        },
        backup: BackupConfig {
            enabled: true,
            root: dir.to_string_lossy().to_string(),
            retention_days: 14,
            compression: true,
            remote_archive_server: None,
            direct_shared_storage: None,
        },
        notification: NotificationConfig { enabled: true, kind: "webhook".to_string(), settings: Default::default() },
        services,
    }
}

/// S1 — single docker service, local backup, success.
#[tokio::test]
async fn single_docker_service_backs_up_locally_and_succeeds() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = base_config(dir.path(), vec![docker_service("plex")]);
    let state = Arc::new(FakeStateStore::new(clock()));
    let engine = BackupEngine::new(
        config,
        state.clone(),
        clock(),
        Arc::new(FakeHypervisorAdapter::new()),
        Arc::new(FakeServiceAdapter::new()),
        Some(Arc::new(FakeNotifierAdapter::new())),
    )
    .expect("engine constructs");

    let ok = engine.backup_service("plex", false).await.expect("no value error");
    assert!(ok);
    assert_eq!(state.get_str("backup_status.plex").unwrap(), Some("success".to_string()));
    assert!(state.get_str("backup_path.plex").unwrap().is_some());
    assert!(state.get("backup_error.plex").unwrap().is_none());
}

/// S2 — mixed three-service run with a notifier summary covering both
/// outcomes.
#[tokio::test]
async fn mixed_results_across_services_notify_a_summary() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = base_config(
        dir.path(),
        vec![docker_service("plex"), docker_service("jellyfin"), docker_service("sonarr")],
    );
    let state = Arc::new(FakeStateStore::new(clock()));
    let service_adapter = Arc::new(FakeServiceAdapter::new());
    service_adapter.set_backup_result("jellyfin", false);
    let notifier = Arc::new(FakeNotifierAdapter::new());

    let engine = BackupEngine::new(
        config,
        state.clone(),
        clock(),
        Arc::new(FakeHypervisorAdapter::new()),
        service_adapter,
        Some(notifier.clone()),
    )
    .expect("engine constructs");

    let results = engine.backup_all_services(false).await;
    assert_eq!(results.get("plex"), Some(&true));
    assert_eq!(results.get("jellyfin"), Some(&false));
    assert_eq!(results.get("sonarr"), Some(&true));

    let calls = notifier.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].title.contains("2/3 Successful"));
    assert!(calls[0].body.contains("jellyfin"));
}

/// S4 variant — remote archive server configured but unreachable; its
/// failure surfaces as a destination-selection error rather than
/// silently falling through to direct storage.
#[tokio::test]
async fn unreachable_remote_never_falls_back_to_direct_storage() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = base_config(dir.path(), vec![vm_service("database", 101)]);
    config.backup.remote_archive_server = Some(RemoteArchiveServerConfig {
        enabled: true,
        host: "pbs.invalid.example".to_string(),
        port: 8007,
        datastore: "main".to_string(),
        user: "root@pam".to_string(),
        password: Some("secret".to_string()),
        password_command: None,
        verify_tls: true,
    });
    config.backup.direct_shared_storage =
        Some(DirectSharedStorageConfig { enabled: true, path: "/mnt/pbs-direct".to_string(), format: "vma".to_string() });

    let state = Arc::new(FakeStateStore::new(clock()));
    let engine = BackupEngine::new(
        config,
        state.clone(),
        clock(),
        Arc::new(FakeHypervisorAdapter::new()),
        Arc::new(FakeServiceAdapter::new()),
        Some(Arc::new(FakeNotifierAdapter::new())),
    )
    .expect("engine constructs");

    let ok = engine.backup_service("database", false).await.expect("no value error");
    assert!(!ok, "remote probe failure must not silently fall back to direct storage");
    let error = state.get_str("backup_error.database").unwrap().expect("error recorded");
    assert!(error.contains("destination_selection"));
}

/// S3 — remote archive server configured and reachable; a vm/lxc
/// service prefers it over direct shared storage, and direct storage is
/// never consulted once the remote probe succeeds.
#[tokio::test]
async fn remote_is_preferred_over_direct_when_reachable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = base_config(dir.path(), vec![vm_service("database", 101)]);
    config.backup.remote_archive_server = Some(RemoteArchiveServerConfig {
        enabled: true,
        host: "pbs.local".to_string(),
        port: 8007,
        datastore: "main".to_string(),
        user: "root@pam".to_string(),
        password: Some("secret".to_string()),
        password_command: None,
        verify_tls: true,
    });
    config.backup.direct_shared_storage =
        Some(DirectSharedStorageConfig { enabled: true, path: "/mnt/pbs-direct".to_string(), format: "vma".to_string() });

    let state = Arc::new(FakeStateStore::new(clock()));
    let hypervisor = Arc::new(FakeHypervisorAdapter::new());
    let engine = BackupEngine::new(
        config,
        state.clone(),
        clock(),
        hypervisor.clone(),
        Arc::new(FakeServiceAdapter::new()),
        Some(Arc::new(FakeNotifierAdapter::new())),
    )
    .expect("engine constructs")
    .with_reachability(Arc::new(warden_engine::destination::FakeReachability::AlwaysOk));

    let ok = engine.backup_service("database", false).await.expect("no value error");
    assert!(ok, "reachable remote must be selected and succeed");
    let calls = hypervisor.calls();
    assert_eq!(calls.len(), 1);
    match &calls[0] {
        warden_adapters::test_support::HypervisorCall::Backup { method, .. } => {
            assert_eq!(*method, "remote", "direct shared storage must never be consulted once remote is reachable");
        }
        other => panic!("expected a Backup call, got {other:?}"),
    }
}

/// S4 — remote archive server unreachable surfaces as a recorded
/// failure, never substituted with a different destination.
#[tokio::test]
async fn unreachable_remote_archive_server_is_a_hard_failure() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = base_config(dir.path(), vec![vm_service("database", 101)]);
    config.backup.remote_archive_server = Some(RemoteArchiveServerConfig {
        enabled: true,
        host: "pbs.invalid.example".to_string(),
        port: 8007,
        datastore: "main".to_string(),
        user: "root@pam".to_string(),
        password: Some("secret".to_string()),
        password_command: None,
        verify_tls: true,
    });

    let state = Arc::new(FakeStateStore::new(clock()));
    let engine = BackupEngine::new(
        config,
        state.clone(),
        clock(),
        Arc::new(FakeHypervisorAdapter::new()),
        Arc::new(FakeServiceAdapter::new()),
        None,
    )
    .expect("engine constructs");

    let ok = engine.backup_service("database", false).await.expect("no value error");
    assert!(!ok);
    assert_eq!(state.get_str("backup_status.database").unwrap(), Some("failed".to_string()));
}

/// Dry runs mark success in state without invoking either adapter.
#[tokio::test]
async fn dry_run_short_circuits_before_touching_adapters() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = base_config(dir.path(), vec![docker_service("plex")]);
    let state = Arc::new(FakeStateStore::new(clock()));
    let service_adapter = Arc::new(FakeServiceAdapter::new());

    let engine = BackupEngine::new(
        config,
        state.clone(),
        clock(),
        Arc::new(FakeHypervisorAdapter::new()),
        service_adapter.clone(),
        None,
    )
    .expect("engine constructs");

    let ok = engine.backup_service("plex", true).await.expect("no value error");
    assert!(ok);
    assert_eq!(state.get_str("backup_status.plex").unwrap(), Some("success".to_string()));
    assert!(service_adapter.calls().is_empty());
}

/// An empty service inventory produces an empty result map and sends
/// no notification.
#[tokio::test]
async fn empty_inventory_produces_no_results_and_no_notification() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = base_config(dir.path(), vec![]);
    let state = Arc::new(FakeStateStore::new(clock()));
    let notifier = Arc::new(FakeNotifierAdapter::new());

    let engine = BackupEngine::new(
        config,
        state,
        clock(),
        Arc::new(FakeHypervisorAdapter::new()),
        Arc::new(FakeServiceAdapter::new()),
        Some(notifier.clone()),
    )
    .expect("engine constructs");

    let results = engine.backup_all_services(false).await;
    assert!(results.is_empty());
    assert!(notifier.calls().is_empty());
}

/// Construction rejects a disabled backup subsystem up front.
#[test]
fn construction_fails_fast_when_backup_is_disabled() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = base_config(dir.path(), vec![]);
    config.backup.enabled = false;
    let state: Arc<dyn StateStore> = Arc::new(FakeStateStore::new(clock()));
    let clock_arc: Arc<dyn Clock> = clock();

    let err = BackupEngine::new(
        config,
        state,
        clock_arc,
        Arc::new(FakeHypervisorAdapter::new()),
        Arc::new(FakeServiceAdapter::new()),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, warden_engine::EngineError::Backup(warden_core::BackupError::Disabled)));
}
