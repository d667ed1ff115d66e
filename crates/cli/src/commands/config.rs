// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `warden config` - validate the on-disk configuration without running
//! any backup.

use crate::env;
use anyhow::Result;
use clap::Subcommand;
use warden_config::Loader;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Load and validate configuration, printing a summary on success.
    Check,
}

pub async fn handle(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Check => check().await,
    }
}

async fn check() -> Result<()> {
    let config_path = env::config_path();
    match Loader::load(&config_path, &[]) {
        Ok(loader) => {
            println!("configuration OK: {} service(s) configured", loader.services().len());
            Ok(())
        }
        Err(e) => {
            eprintln!("configuration invalid: {e}");
            Err(e.into())
        }
    }
}
