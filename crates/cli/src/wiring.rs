// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Assembles a `BackupEngine` from the environment: loads configuration,
//! opens the state database, and constructs the one hypervisor adapter,
//! one service adapter, and (if configured) one notifier adapter the
//! process needs for its lifetime.

use crate::env;
use anyhow::{Context, Result};
use std::sync::Arc;
use warden_adapters::notifier::WebhookNotifierAdapter;
use warden_adapters::{GenericServiceAdapter, NotifierAdapter, ProxmoxAdapter};
use warden_config::Loader;
use warden_core::{Clock, SystemClock};
use warden_engine::BackupEngine;
use warden_state::SqliteStateStore;

/// Loads configuration and builds an engine instance wired to real
/// adapters and the on-disk state database.
pub async fn build_engine() -> Result<BackupEngine> {
    let config_path = env::config_path();
    let loader = Loader::load(&config_path, &[])
        .with_context(|| format!("loading configuration from {}", config_path.display()))?;
    let config = loader.config().clone();

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let state_path = env::state_db_path();
    if let Some(parent) = state_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating state directory {}", parent.display()))?;
    }
    let state = Arc::new(
        SqliteStateStore::open(&state_path, clock.clone())
            .with_context(|| format!("opening state database at {}", state_path.display()))?,
    );

    let hypervisor = Arc::new(ProxmoxAdapter::new(config.hypervisor.clone()));
    let service_adapter = Arc::new(
        GenericServiceAdapter::new(clock.clone()).context("connecting to the local Docker socket")?,
    );

    let notifier = build_notifier(&config.notification);

    let engine = BackupEngine::new(config, state, clock, hypervisor, service_adapter, notifier)
        .context("constructing the backup engine")?;
    Ok(engine)
}

fn build_notifier(config: &warden_core::NotificationConfig) -> Option<Arc<dyn NotifierAdapter>> {
    if !config.enabled {
        return None;
    }
    match config.kind.as_str() {
        "webhook" => {
            let url = config.settings.get("url")?.as_str()?.to_string();
            Some(Arc::new(WebhookNotifierAdapter::new(url)) as Arc<dyn NotifierAdapter>)
        }
        other => {
            tracing::warn!(kind = other, "no notifier implementation matches the configured notification kind");
            None
        }
    }
}
