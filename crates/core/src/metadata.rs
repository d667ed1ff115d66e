// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-run backup results, persisted to the state store and surfaced in
//! summary notifications.

use serde::{Deserialize, Serialize};

/// Outcome of a single service's backup attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupStatus {
    Pending,
    Success,
    Failed,
}

impl std::fmt::Display for BackupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BackupStatus::Pending => "pending",
            BackupStatus::Success => "success",
            BackupStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Everything recorded about one backup attempt: enough to verify it,
/// list it for retention, and report it in a summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupMetadata {
    pub service_name: String,
    pub service_kind: crate::service::ServiceKind,
    pub backup_method: &'static str,
    /// ISO 8601 timestamp of when the attempt was created.
    pub timestamp: String,
    pub status: BackupStatus,
    pub file_size_bytes: Option<u64>,
    pub duration_seconds: Option<f64>,
    pub vmid: Option<i64>,
    pub node: Option<String>,
    /// Destination details safe to log and notify with (no secrets).
    pub remote_details: Option<serde_json::Value>,
    pub error_message: Option<String>,
}

impl BackupMetadata {
    /// A freshly created `pending` record for `service`, ahead of
    /// invoking the adapter.
    pub fn pending(
        service_name: impl Into<String>,
        service_kind: crate::service::ServiceKind,
        backup_method: &'static str,
        timestamp: String,
        vmid: Option<i64>,
        node: Option<String>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            service_kind,
            backup_method,
            timestamp,
            status: BackupStatus::Pending,
            file_size_bytes: None,
            duration_seconds: None,
            vmid,
            node,
            remote_details: None,
            error_message: None,
        }
    }
}
