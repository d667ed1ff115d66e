// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The manifest written into every service-adapter archive, per
//! spec.md §4.5.

use serde::Serialize;
use warden_core::ServiceKind;

#[derive(Debug, Serialize)]
pub struct Manifest {
    pub service_name: String,
    pub service_kind: ServiceKind,
    pub backup_date: String,
    pub version: &'static str,
    pub metadata: serde_json::Value,
}

impl Manifest {
    pub fn new(service_name: impl Into<String>, service_kind: ServiceKind, backup_date: String, metadata: serde_json::Value) -> Self {
        Self { service_name: service_name.into(), service_kind, backup_date, version: "1.0", metadata }
    }

    pub fn write_to(&self, staging_dir: &std::path::Path) -> std::io::Result<()> {
        let text = serde_json::to_string_pretty(self).unwrap_or_default();
        std::fs::write(staging_dir.join("manifest.json"), text)
    }
}
