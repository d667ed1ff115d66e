// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `warden backup` - run, service, and status subcommands.

use crate::{env, wiring};
use anyhow::{Context, Result};
use clap::Subcommand;
use std::sync::Arc;
use warden_config::Loader;
use warden_core::SystemClock;
use warden_state::{SqliteStateStore, StateStore};

#[derive(Subcommand)]
pub enum BackupCommand {
    /// Back up every enabled service in configuration order.
    Run,
    /// Back up a single named service.
    Service {
        /// The service name as it appears in configuration.
        name: String,
    },
    /// Print the last recorded backup status for every service.
    Status,
}

pub async fn handle(command: BackupCommand, dry_run: bool) -> Result<()> {
    match command {
        BackupCommand::Run => {
            let engine = wiring::build_engine().await?;
            let results = engine.backup_all_services(dry_run).await;
            let succeeded = results.values().filter(|ok| **ok).count();
            println!("{succeeded}/{} services backed up successfully", results.len());
            for (name, ok) in &results {
                println!("  {name}: {}", if *ok { "success" } else { "failed" });
            }
            if succeeded < results.len() {
                anyhow::bail!("{} service(s) failed", results.len() - succeeded);
            }
            Ok(())
        }
        BackupCommand::Service { name } => {
            let engine = wiring::build_engine().await?;
            let ok = engine.backup_service(&name, dry_run).await.context("running backup pipeline")?;
            println!("{name}: {}", if ok { "success" } else { "failed" });
            if !ok {
                anyhow::bail!("backup of '{name}' failed");
            }
            Ok(())
        }
        BackupCommand::Status => status().await,
    }
}

async fn status() -> Result<()> {
    let config_path = env::config_path();
    let loader = Loader::load(&config_path, &[])
        .with_context(|| format!("loading configuration from {}", config_path.display()))?;

    let clock = Arc::new(SystemClock);
    let state_path = env::state_db_path();
    let state = SqliteStateStore::open(&state_path, clock)
        .with_context(|| format!("opening state database at {}", state_path.display()))?;

    for service in loader.services() {
        let last_backup = state.get_str(&format!("last_backup.{}", service.name))?.unwrap_or_else(|| "never".to_string());
        let backup_status = state.get_str(&format!("backup_status.{}", service.name))?.unwrap_or_else(|| "unknown".to_string());
        println!("{}: status={backup_status} last_backup={last_backup}", service.name);
        if backup_status == "failed" {
            if let Some(error) = state.get_str(&format!("backup_error.{}", service.name))? {
                println!("  error: {error}");
            }
        }
    }
    Ok(())
}
