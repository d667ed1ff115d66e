// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! systemd-unit backup/update/validate/status, grounded in
//! `original_source/plugins/services/generic.py`'s systemd path: the
//! unit file plus any configured config/data paths are staged and
//! archived; updates go through the host package manager.

use super::archive;
use super::manifest::Manifest;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{info, warn};
use warden_core::{Clock, ServiceDescriptor, ServiceKind};

const UNIT_SEARCH_DIRS: [&str; 2] = ["/etc/systemd/system", "/lib/systemd/system"];

fn locate_unit_file(unit_name: &str) -> Option<PathBuf> {
    UNIT_SEARCH_DIRS.iter().map(|dir| Path::new(dir).join(unit_name)).find(|p| p.is_file())
}

pub async fn backup(descriptor: &ServiceDescriptor, destination_path: &str, clock: &dyn Clock) -> bool {
    let Some(unit_name) = &descriptor.unit_name else {
        warn!(service = %descriptor.name, "systemd backup requested without unit_name");
        return false;
    };

    let staging = match archive::create_staging_dir(Path::new(destination_path)) {
        Ok(dir) => dir,
        Err(e) => {
            warn!(service = %descriptor.name, error = %e, "failed to create staging directory");
            return false;
        }
    };

    let result = run_backup(descriptor, unit_name, &staging, destination_path, clock).await;
    archive::cleanup(&staging);
    result
}

async fn run_backup(descriptor: &ServiceDescriptor, unit_name: &str, staging: &Path, destination_path: &str, clock: &dyn Clock) -> bool {
    let Some(unit_path) = locate_unit_file(unit_name) else {
        warn!(service = %descriptor.name, unit = %unit_name, "unit file not found in any search directory");
        return false;
    };
    if let Err(e) = std::fs::create_dir_all(staging.join("service")) {
        warn!(service = %descriptor.name, error = %e, "failed to create service staging directory");
        return false;
    }
    if let Err(e) = std::fs::copy(&unit_path, staging.join("service").join(unit_name)) {
        warn!(service = %descriptor.name, error = %e, "failed to copy unit file");
        return false;
    }

    for path in &descriptor.config_paths {
        if let Err(e) = copy_into(Path::new(path), &staging.join("config")) {
            warn!(service = %descriptor.name, path = %path, error = %e, "failed to copy config path");
            return false;
        }
    }
    for path in &descriptor.data_paths {
        if let Err(e) = copy_into(Path::new(path), &staging.join("data")) {
            warn!(service = %descriptor.name, path = %path, error = %e, "failed to copy data path");
            return false;
        }
    }

    let manifest = Manifest::new(
        &descriptor.name,
        ServiceKind::Systemd,
        clock.iso_now(),
        serde_json::json!({
            "unit_name": unit_name,
            "package_name": descriptor.package_name,
            "config_paths": descriptor.config_paths,
            "data_paths": descriptor.data_paths,
        }),
    );
    if let Err(e) = manifest.write_to(staging) {
        warn!(service = %descriptor.name, error = %e, "failed to write manifest");
        return false;
    }

    if let Err(e) = archive::archive(staging, Path::new(destination_path)) {
        warn!(service = %descriptor.name, error = %e, "failed to archive staging directory");
        return false;
    }

    info!(service = %descriptor.name, unit = %unit_name, "systemd backup complete");
    true
}

fn copy_into(src: &Path, staging_subdir: &Path) -> std::io::Result<()> {
    if !src.exists() {
        return Ok(());
    }
    let dst = staging_subdir.join(src.file_name().unwrap_or_default());
    archive::copy_recursive(src, &dst)
}

pub async fn update(descriptor: &ServiceDescriptor) -> bool {
    let Some(unit_name) = &descriptor.unit_name else {
        return false;
    };
    let Some(package_name) = &descriptor.package_name else {
        info!(service = %descriptor.name, "no package_name configured, skipping package manager update");
        return false;
    };

    let package_updated = update_package(package_name).await;
    if !package_updated {
        warn!(service = %descriptor.name, package = %package_name, "package manager update failed");
        return false;
    }

    let reload = Command::new("systemctl").arg("daemon-reload").status().await;
    if !matches!(reload, Ok(s) if s.success()) {
        warn!(service = %descriptor.name, "systemctl daemon-reload failed");
        return false;
    }

    let restart = Command::new("systemctl").args(["restart", unit_name]).status().await;
    matches!(restart, Ok(s) if s.success())
}

async fn update_package(package_name: &str) -> bool {
    let apt = Command::new("apt-get").args(["install", "--only-upgrade", "-y", package_name]).status().await;
    if matches!(apt, Ok(s) if s.success()) {
        return true;
    }
    let dnf = Command::new("dnf").args(["upgrade", "-y", package_name]).status().await;
    matches!(dnf, Ok(s) if s.success())
}

pub async fn validate(descriptor: &ServiceDescriptor) -> bool {
    let Some(unit_name) = &descriptor.unit_name else {
        return false;
    };
    let output = Command::new("systemctl").args(["is-active", unit_name]).output().await;
    match output {
        Ok(out) => String::from_utf8_lossy(&out.stdout).trim() == "active",
        Err(_) => false,
    }
}

pub async fn status(descriptor: &ServiceDescriptor) -> BTreeMap<String, serde_json::Value> {
    let mut out = BTreeMap::new();
    let Some(unit_name) = &descriptor.unit_name else {
        return out;
    };
    let is_active = Command::new("systemctl").args(["is-active", unit_name]).output().await;
    let active = is_active.map(|o| String::from_utf8_lossy(&o.stdout).trim() == "active").unwrap_or(false);
    let is_enabled = Command::new("systemctl").args(["is-enabled", unit_name]).output().await;
    let enabled = is_enabled.map(|o| String::from_utf8_lossy(&o.stdout).trim() == "enabled").unwrap_or(false);
    out.insert("running".to_string(), serde_json::Value::from(active));
    out.insert("active".to_string(), serde_json::Value::from(active));
    out.insert("enabled".to_string(), serde_json::Value::from(enabled));
    out
}
