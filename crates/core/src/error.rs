// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The four error kinds shared across the workspace.
//!
//! `ConfigError` and `ValueError` are unrecoverable at the point they are
//! raised (bad input, caller misuse). `BackupError` and `StateError` are
//! recoverable at the `backup_all_services` level: the engine records the
//! failing service and continues the run.

use thiserror::Error;

/// Invalid or missing configuration, raised at load time or engine
/// construction. Unrecoverable; terminates the run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {path}")]
    NotFound { path: String },

    #[error("failed to read configuration at {path}: {source}")]
    Io { path: String, #[source] source: std::io::Error },

    #[error("failed to parse configuration at {path}: {source}")]
    Parse { path: String, #[source] source: serde_yaml::Error },

    #[error("configuration validation failed with {} error(s):\n{}", .diagnostics.len(), .diagnostics.join("\n"))]
    Invalid { diagnostics: Vec<String> },

    #[error("dot-notation depth exceeds maximum of {max} levels: {path}")]
    DotDepthExceeded { path: String, max: usize },

    #[error("duplicate service name in configuration: {name}")]
    DuplicateService { name: String },
}

/// Orchestration-level failure the engine itself raises: destination
/// selection, retention, unreachable remote archive server.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("backup subsystem is disabled in configuration")]
    Disabled,

    #[error("backup root is not an absolute path: {path}")]
    RootNotAbsolute { path: String },

    #[error("retention_days must be at least 1, got {value}")]
    InvalidRetention { value: i64 },

    #[error("remote archive server config incomplete: missing {field}")]
    RemoteConfigIncomplete { field: &'static str },

    #[error(
        "remote archive server {host}:{port} unreachable: {reason} (check network connectivity and that the server is running)"
    )]
    RemoteUnreachable { host: String, port: u16, reason: String },

    #[error("direct shared storage config incomplete: missing {field}")]
    DirectConfigIncomplete { field: &'static str },

    #[error("retention listing failed for service {service}: {reason}")]
    RetentionListing { service: String, reason: String },

    #[error("no adapter registered for service kind {kind}")]
    NoAdapter { kind: String },

    #[error("{service}: {stage} failed: {reason}")]
    Step { service: String, stage: &'static str, reason: String },
}

/// Backing-store I/O failure, wrapping the underlying cause.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("state store I/O error for key '{key}': {source}")]
    Io { key: String, #[source] source: rusqlite_error::BoxedError },

    #[error("unsupported value type for state key '{key}'")]
    UnsupportedType { key: String },

    #[error("corrupt state value for key '{key}': {reason}")]
    Corrupt { key: String, reason: String },
}

/// Caller misuse: empty names, wrong argument shapes. Always raised, never
/// caught internally.
#[derive(Debug, Error)]
pub enum ValueError {
    #[error("service name must not be empty or whitespace")]
    EmptyServiceName,

    #[error("service not found in configuration: {name}")]
    ServiceNotFound { name: String },

    #[error("summary map must not be empty")]
    EmptySummary,

    #[error("invalid argument: {reason}")]
    Invalid { reason: String },
}

/// Small indirection so `warden-core` doesn't need a direct dependency on
/// `rusqlite` just to express "boxed I/O error" in `StateError`.
pub mod rusqlite_error {
    pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;
}
