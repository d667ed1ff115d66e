// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `warden state` - direct key/value inspection of the state database,
//! for debugging outside of a backup run.

use crate::env;
use anyhow::{Context, Result};
use clap::Subcommand;
use std::sync::Arc;
use warden_core::{StateValue, StateValueKind, SystemClock};
use warden_state::{SqliteStateStore, StateStore};

#[derive(Subcommand)]
pub enum StateCommand {
    /// Print a single key's value, if set.
    Get {
        key: String,
    },
    /// Set a key to a value, encoded as the given type.
    Set {
        key: String,
        value: String,
        /// One of: null, bool, int, float, str, timestamp, structured.
        #[arg(long, default_value = "str")]
        r#type: String,
    },
    /// List keys, optionally restricted to a prefix.
    Keys {
        #[arg(long)]
        prefix: Option<String>,
    },
}

pub async fn handle(command: StateCommand) -> Result<()> {
    let clock = Arc::new(SystemClock);
    let state_path = env::state_db_path();
    let state = SqliteStateStore::open(&state_path, clock)
        .with_context(|| format!("opening state database at {}", state_path.display()))?;

    match command {
        StateCommand::Get { key } => match state.get(&key)? {
            Some(record) => println!("{key} = {:?} (updated_at {})", record.value, record.updated_at),
            None => println!("{key} is not set"),
        },
        StateCommand::Set { key, value, r#type } => {
            let kind = StateValueKind::parse(&r#type).with_context(|| format!("unknown state value type '{}'", r#type))?;
            let decoded = StateValue::decode(kind, &value).map_err(anyhow::Error::msg)?;
            state.set(&key, decoded)?;
            println!("{key} set");
        }
        StateCommand::Keys { prefix } => {
            for key in state.keys(prefix.as_deref())? {
                println!("{key}");
            }
        }
    }
    Ok(())
}
