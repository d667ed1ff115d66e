// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `BackupEngine`: orchestrates the per-service backup pipeline,
//! sequentially, across every configured service.

use crate::{destination, filename, notify, retention, verify, EngineError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use warden_adapters::{HypervisorAdapter, NotifierAdapter, ServiceAdapter};
use warden_core::{
    BackupConfig, BackupDestination, BackupError, BackupMetadata, BackupStatus, Clock, GlobalConfig, ServiceDescriptor,
    StateValue, ValueError,
};
use warden_state::StateStore;

/// Everything the engine needs to run: the validated configuration, a
/// state store, a clock, and the adapter fleet. Constructed once per
/// process; `backup_all_services`/`backup_service` may be called
/// repeatedly against the same instance.
pub struct BackupEngine {
    config: GlobalConfig,
    state: Arc<dyn StateStore>,
    clock: Arc<dyn Clock>,
    hypervisor: Arc<dyn HypervisorAdapter>,
    service_adapter: Arc<dyn ServiceAdapter>,
    notifier: Option<Arc<dyn NotifierAdapter>>,
    reachability: Arc<dyn destination::RemoteReachability>,
}

impl BackupEngine {
    /// Validates the backup subsystem is usable before returning an
    /// engine instance; every later call assumes these hold.
    pub fn new(
        config: GlobalConfig,
        state: Arc<dyn StateStore>,
        clock: Arc<dyn Clock>,
        hypervisor: Arc<dyn HypervisorAdapter>,
        service_adapter: Arc<dyn ServiceAdapter>,
        notifier: Option<Arc<dyn NotifierAdapter>>,
    ) -> Result<Self, EngineError> {
        if !config.backup.enabled {
            return Err(BackupError::Disabled.into());
        }
        if !Path::new(&config.backup.root).is_absolute() {
            return Err(BackupError::RootNotAbsolute { path: config.backup.root.clone() }.into());
        }
        if config.backup.retention_days < 1 {
            return Err(BackupError::InvalidRetention { value: config.backup.retention_days }.into());
        }

        Ok(Self {
            config,
            state,
            clock,
            hypervisor,
            service_adapter,
            notifier,
            reachability: Arc::new(destination::HttpProbe::new(reqwest::Client::new())),
        })
    }

    /// Swaps the remote archive server reachability probe, e.g. with a
    /// fake for tests. Never needed outside test harnesses.
    #[cfg(feature = "test-support")]
    pub fn with_reachability(mut self, reachability: Arc<dyn destination::RemoteReachability>) -> Self {
        self.reachability = reachability;
        self
    }

    fn backup_config(&self) -> &BackupConfig {
        &self.config.backup
    }

    /// Backs up every enabled, `backup: true` service in configuration
    /// order. Per-service failures are caught and recorded, never abort
    /// the run; a summary notification follows once all are done.
    pub async fn backup_all_services(&self, dry_run: bool) -> BTreeMap<String, bool> {
        let started = Instant::now();
        let mut results = BTreeMap::new();

        for service in &self.config.services {
            if !service.backup {
                continue;
            }
            let outcome = match self.backup_service(&service.name, dry_run).await {
                Ok(ok) => ok,
                Err(e) => {
                    warn!(service = %service.name, error = %e, "backup_service raised an error escaping its own boundary");
                    false
                }
            };
            results.insert(service.name.clone(), outcome);
        }

        if results.is_empty() {
            info!("no services configured for backup, nothing to notify");
            return results;
        }

        let duration = started.elapsed().as_secs_f64();
        if let Err(e) = notify::send_summary(
            self.notifier.as_deref(),
            &self.config.notification,
            self.state.as_ref(),
            &results,
            Some(duration),
            dry_run,
        )
        .await
        {
            warn!(error = %e, "failed to send summary notification");
        }

        results
    }

    /// Runs the full backup pipeline for one named service.
    pub async fn backup_service(&self, name: &str, dry_run: bool) -> Result<bool, EngineError> {
        if name.trim().is_empty() {
            return Err(ValueError::EmptyServiceName.into());
        }
        let service = self
            .config
            .service(name)
            .cloned()
            .ok_or_else(|| ValueError::ServiceNotFound { name: name.to_string() })?;

        if !service.backup {
            return Ok(true);
        }

        if dry_run {
            info!(service = %name, "dry run: marking success without touching disk or adapters");
            self.record_success(&service, None, None);
            return Ok(true);
        }

        Ok(self.run_pipeline(&service).await)
    }

    async fn run_pipeline(&self, service: &ServiceDescriptor) -> bool {
        let started = Instant::now();

        let destination = match destination::resolve(self.reachability.as_ref(), self.backup_config(), service).await {
            Ok(d) => d,
            Err(e) => {
                self.record_failure(service, "destination_selection", &e.to_string());
                return false;
            }
        };

        if let Err(e) = self.ensure_service_dir(service) {
            self.record_failure(service, "ensure_service_dir", &e.to_string());
            return false;
        }

        let mut metadata = BackupMetadata::pending(
            service.name.clone(),
            service.kind,
            destination.method(),
            self.clock.iso_now(),
            service.vmid,
            service.node.clone(),
        );

        let outcome = self.execute(service, &destination, &mut metadata).await;
        let path = match outcome {
            Ok(path) => path,
            Err(e) => {
                self.record_failure(service, "execute_backup", &e);
                return false;
            }
        };

        if !verify::verify(path.as_deref(), verify::DEFAULT_MIN_SIZE_BYTES) {
            self.record_failure(service, "verify", "artifact failed post-backup verification");
            return false;
        }

        let duration = started.elapsed().as_secs_f64();
        self.record_success(service, path.clone(), Some(duration));

        if matches!(destination, BackupDestination::Local { .. } | BackupDestination::Direct { .. }) {
            self.apply_retention(service);
        }

        true
    }

    fn ensure_service_dir(&self, service: &ServiceDescriptor) -> std::io::Result<()> {
        std::fs::create_dir_all(self.service_dir(service))
    }

    fn service_dir(&self, service: &ServiceDescriptor) -> PathBuf {
        Path::new(&self.backup_config().root).join(&service.name)
    }

    /// Dispatches the backup to the right adapter for `destination`,
    /// returning the artifact path when one exists (local/direct) or
    /// `None` for a remote-method backup that never touches local disk.
    async fn execute(
        &self,
        service: &ServiceDescriptor,
        destination: &BackupDestination,
        metadata: &mut BackupMetadata,
    ) -> Result<Option<String>, String> {
        match destination {
            BackupDestination::Remote { remote_config } => {
                metadata.remote_details = Some(serde_json::json!({ "datastore": remote_config.datastore, "host": remote_config.host }));
                if self.hypervisor.backup(service, destination, metadata).await {
                    Ok(None)
                } else {
                    Err(metadata.error_message.clone().unwrap_or_else(|| "check remote archive server logs".to_string()))
                }
            }
            BackupDestination::Direct { path } => {
                if self.hypervisor.backup(service, destination, metadata).await {
                    Ok(Some(path.clone()))
                } else {
                    Err(metadata.error_message.clone().unwrap_or_else(|| "direct shared storage backup failed".to_string()))
                }
            }
            BackupDestination::Local { path } => {
                let dir = Path::new(path).join(&service.name);
                std::fs::create_dir_all(&dir).map_err(|e| e.to_string())?;
                let name = filename::generate(service, self.clock.now());
                let full_path = dir.join(name).to_string_lossy().to_string();

                if self.service_adapter.backup(service, &full_path).await {
                    Ok(Some(full_path))
                } else {
                    Err(format!("service '{}': adapter backup step failed", service.name))
                }
            }
        }
    }

    fn apply_retention(&self, service: &ServiceDescriptor) {
        let days = service.effective_retention_days(self.backup_config().retention_days);
        match retention::apply(&self.service_dir(service), days, false) {
            Ok(deleted) => {
                if deleted > 0 {
                    info!(service = %service.name, deleted, "retention sweep complete");
                }
            }
            Err(e) => warn!(service = %service.name, error = %e, "retention sweep failed, leaving artifacts in place"),
        }
    }

    fn record_success(&self, service: &ServiceDescriptor, path: Option<String>, duration_seconds: Option<f64>) {
        let _ = self.state.set(&format!("last_backup.{}", service.name), StateValue::Timestamp(self.clock.iso_now()));
        let _ = self.state.set(&format!("backup_status.{}", service.name), StateValue::String(BackupStatus::Success.to_string()));
        if let Some(path) = path {
            let _ = self.state.set(&format!("backup_path.{}", service.name), StateValue::String(path));
        }
        if let Some(duration) = duration_seconds {
            let _ = self.state.set(&format!("backup_duration.{}", service.name), StateValue::Float(duration));
        }
        let _ = self.state.delete(&format!("backup_error.{}", service.name));
    }

    fn record_failure(&self, service: &ServiceDescriptor, stage: &'static str, reason: &str) {
        let message = format!("{}: {stage} failed: {reason}", service.name);
        warn!(service = %service.name, stage, reason, "backup pipeline step failed");
        let _ = self.state.set(&format!("last_backup.{}", service.name), StateValue::Timestamp(self.clock.iso_now()));
        let _ = self.state.set(&format!("backup_status.{}", service.name), StateValue::String(BackupStatus::Failed.to_string()));
        let _ = self.state.set(&format!("backup_error.{}", service.name), StateValue::String(message));
        let _ = self.state.delete(&format!("backup_path.{}", service.name));
        let _ = self.state.delete(&format!("backup_duration.{}", service.name));
    }
}
