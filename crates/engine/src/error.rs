// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Crate-level error type: wraps the four `warden_core` error kinds plus
//! an `Adapter` variant for an adapter that violates its never-throws
//! contract, so callers outside the engine see one error type.

use thiserror::Error;
use warden_core::{BackupError, ConfigError, StateError, ValueError};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("backup error: {0}")]
    Backup(#[from] BackupError),
    #[error("state error: {0}")]
    State(#[from] StateError),
    #[error("value error: {0}")]
    Value(#[from] ValueError),
    #[error("adapter violated its contract: {0}")]
    Adapter(String),
}
