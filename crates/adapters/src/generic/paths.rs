// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plain-path backup for `generic`/`host` services: stage
//! `backup_paths` recursively, preserving symlinks, then archive.

use super::archive;
use super::manifest::Manifest;
use std::path::Path;
use tracing::warn;
use warden_core::{Clock, ServiceDescriptor};

pub async fn backup(descriptor: &ServiceDescriptor, destination_path: &str, clock: &dyn Clock) -> bool {
    if descriptor.backup_paths.is_empty() {
        warn!(service = %descriptor.name, "generic backup requested with no backup_paths configured");
        return false;
    }

    let staging = match archive::create_staging_dir(Path::new(destination_path)) {
        Ok(dir) => dir,
        Err(e) => {
            warn!(service = %descriptor.name, error = %e, "failed to create staging directory");
            return false;
        }
    };

    let result = run_backup(descriptor, &staging, destination_path, clock);
    archive::cleanup(&staging);
    result
}

fn run_backup(descriptor: &ServiceDescriptor, staging: &Path, destination_path: &str, clock: &dyn Clock) -> bool {
    for path in &descriptor.backup_paths {
        let src = Path::new(path);
        if !src.exists() {
            warn!(service = %descriptor.name, path = %path, "configured backup path does not exist");
            return false;
        }
        let dst = staging.join("data").join(src.file_name().unwrap_or_default());
        if let Err(e) = archive::copy_recursive(src, &dst) {
            warn!(service = %descriptor.name, path = %path, error = %e, "failed to stage backup path");
            return false;
        }
    }

    let manifest = Manifest::new(
        &descriptor.name,
        descriptor.kind,
        clock.iso_now(),
        serde_json::json!({ "backup_paths": descriptor.backup_paths }),
    );
    if let Err(e) = manifest.write_to(staging) {
        warn!(service = %descriptor.name, error = %e, "failed to write manifest");
        return false;
    }

    if let Err(e) = archive::archive(staging, Path::new(destination_path)) {
        warn!(service = %descriptor.name, error = %e, "failed to archive staging directory");
        return false;
    }

    true
}

pub fn validate(descriptor: &ServiceDescriptor) -> bool {
    !descriptor.backup_paths.is_empty() && descriptor.backup_paths.iter().all(|p| Path::new(p).exists())
}

pub fn status(descriptor: &ServiceDescriptor) -> serde_json::Map<String, serde_json::Value> {
    let mut out = serde_json::Map::new();
    out.insert("running".to_string(), serde_json::Value::Null);
    let paths_exist = descriptor.backup_paths.iter().all(|p| Path::new(p).exists());
    out.insert("paths_exist".to_string(), serde_json::Value::from(paths_exist));
    out
}
