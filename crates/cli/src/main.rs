// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `warden`: a thin CLI over the backup engine. Parses arguments, wires
//! up configuration/state/adapters, and hands off to `warden-engine` —
//! it does no orchestration of its own.

mod commands;
mod env;
mod wiring;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "warden", version, about = "Homelab backup orchestration")]
struct Cli {
    /// Describe what would happen without touching disk, adapters, or
    /// notifications.
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run or inspect backups.
    Backup {
        #[command(subcommand)]
        command: commands::backup::BackupCommand,
    },
    /// Validate configuration.
    Config {
        #[command(subcommand)]
        command: commands::config::ConfigCommand,
    },
    /// Inspect or mutate the state database directly.
    State {
        #[command(subcommand)]
        command: commands::state::StateCommand,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Backup { command } => commands::backup::handle(command, cli.dry_run).await,
        Commands::Config { command } => commands::config::handle(command).await,
        Commands::State { command } => commands::state::handle(command).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
