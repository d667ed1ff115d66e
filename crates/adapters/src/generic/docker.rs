// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Docker container backup/update/validate/status, grounded in
//! `original_source/plugins/services/generic.py`'s Docker path: named
//! volumes only (bind mounts skipped by design), a short-lived helper
//! container streams each volume's contents into the staging directory.

use super::archive;
use super::manifest::Manifest;
use bollard::container::{
    Config as ContainerConfig, CreateContainerOptions, InspectContainerOptions, RemoveContainerOptions,
    WaitContainerOptions,
};
use bollard::Docker;
use futures_util::TryStreamExt;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use warden_core::{Clock, ServiceDescriptor, ServiceKind};

pub async fn backup(docker: &Docker, descriptor: &ServiceDescriptor, destination_path: &str, clock: &dyn Clock) -> bool {
    let Some(container_name) = &descriptor.container_name else {
        warn!(service = %descriptor.name, "docker backup requested without container_name");
        return false;
    };

    let staging = match archive::create_staging_dir(Path::new(destination_path)) {
        Ok(dir) => dir,
        Err(e) => {
            warn!(service = %descriptor.name, error = %e, "failed to create staging directory");
            return false;
        }
    };

    let result = run_backup(docker, descriptor, container_name, &staging, destination_path, clock).await;
    archive::cleanup(&staging);
    result
}

async fn run_backup(
    docker: &Docker,
    descriptor: &ServiceDescriptor,
    container_name: &str,
    staging: &Path,
    destination_path: &str,
    clock: &dyn Clock,
) -> bool {
    let inspect = match docker.inspect_container(container_name, None::<InspectContainerOptions>).await {
        Ok(info) => info,
        Err(e) => {
            warn!(service = %descriptor.name, container = %container_name, error = %e, "failed to inspect container");
            return false;
        }
    };

    if let Some(compose_file) = &descriptor.compose_file {
        if Path::new(compose_file).is_file() {
            if let Err(e) = std::fs::copy(compose_file, staging.join("compose.yml")) {
                warn!(service = %descriptor.name, error = %e, "failed to copy compose file");
            }
        }
    }

    let volumes = named_volumes(&inspect);
    if !volumes.is_empty() {
        if let Err(e) = std::fs::create_dir_all(staging.join("volumes")) {
            warn!(service = %descriptor.name, error = %e, "failed to create volumes staging directory");
            return false;
        }
    }
    for volume in &volumes {
        if let Err(e) = stream_volume_to_file(docker, volume, &staging.join("volumes").join(format!("{volume}.tar.gz"))).await {
            warn!(service = %descriptor.name, volume = %volume, error = %e, "failed to capture named volume");
            return false;
        }
    }

    let config_snapshot = serde_json::json!({
        "image": inspect.config.as_ref().and_then(|c| c.image.clone()),
        "env": inspect.config.as_ref().and_then(|c| c.env.clone()),
        "labels": inspect.config.as_ref().and_then(|c| c.labels.clone()),
        "cmd": inspect.config.as_ref().and_then(|c| c.cmd.clone()),
        "entrypoint": inspect.config.as_ref().and_then(|c| c.entrypoint.clone()),
    });
    if let Err(e) = std::fs::write(staging.join("config.json"), serde_json::to_string_pretty(&config_snapshot).unwrap_or_default()) {
        warn!(service = %descriptor.name, error = %e, "failed to write config.json");
        return false;
    }

    let manifest = Manifest::new(
        &descriptor.name,
        ServiceKind::Docker,
        clock.iso_now(),
        serde_json::json!({ "container": container_name, "volumes": volumes, "compose_file": descriptor.compose_file }),
    );
    if let Err(e) = manifest.write_to(staging) {
        warn!(service = %descriptor.name, error = %e, "failed to write manifest");
        return false;
    }

    if let Err(e) = archive::archive(staging, Path::new(destination_path)) {
        warn!(service = %descriptor.name, error = %e, "failed to archive staging directory");
        return false;
    }

    info!(service = %descriptor.name, container = %container_name, volumes = volumes.len(), "docker backup complete");
    true
}

fn named_volumes(inspect: &bollard::models::ContainerInspectResponse) -> Vec<String> {
    inspect
        .mounts
        .as_ref()
        .into_iter()
        .flatten()
        .filter(|m| m.typ == Some(bollard::models::MountPointTypeEnum::VOLUME))
        .filter_map(|m| m.name.clone())
        .collect()
}

/// Runs a short-lived helper container with `volume` mounted read-only
/// and streams `tar czf -` of its contents to `out_path`.
async fn stream_volume_to_file(docker: &Docker, volume: &str, out_path: &Path) -> Result<(), bollard::errors::Error> {
    let helper_name = format!("warden-backup-helper-{volume}");
    let config = ContainerConfig {
        image: Some("busybox:latest"),
        cmd: Some(vec!["tar", "czf", "-", "-C", "/source", "."]),
        host_config: Some(bollard::models::HostConfig {
            binds: Some(vec![format!("{volume}:/source:ro")]),
            auto_remove: Some(false),
            ..Default::default()
        }),
        ..Default::default()
    };

    let _ = docker.remove_container(&helper_name, Some(RemoveContainerOptions { force: true, ..Default::default() })).await;
    docker
        .create_container(Some(CreateContainerOptions { name: helper_name.clone(), platform: None }), config)
        .await?;
    docker.start_container::<String>(&helper_name, None).await?;

    let mut file = tokio::fs::File::create(out_path).await.map_err(|e| bollard::errors::Error::IOError { err: e })?;
    let mut stream = docker.download_from_container(&helper_name, None::<bollard::container::DownloadFromContainerOptions<String>>);
    while let Some(chunk) = stream.try_next().await.ok().flatten() {
        let _ = file.write_all(&chunk).await;
    }

    let mut waiter = docker.wait_container(&helper_name, None::<WaitContainerOptions<String>>);
    while waiter.try_next().await.ok().flatten().is_some() {}

    let _ = docker.remove_container(&helper_name, Some(RemoveContainerOptions { force: true, ..Default::default() })).await;
    Ok(())
}

pub async fn update(docker: &Docker, descriptor: &ServiceDescriptor) -> bool {
    let Some(container_name) = &descriptor.container_name else {
        return false;
    };

    if let Some(compose_file) = &descriptor.compose_file {
        let pull = tokio::process::Command::new("docker").args(["compose", "-f", compose_file, "pull"]).status().await;
        let up = tokio::process::Command::new("docker").args(["compose", "-f", compose_file, "up", "-d"]).status().await;
        return matches!(pull, Ok(s) if s.success()) && matches!(up, Ok(s) if s.success());
    }

    let inspect = match docker.inspect_container(container_name, None::<InspectContainerOptions>).await {
        Ok(info) => info,
        Err(e) => {
            warn!(service = %descriptor.name, error = %e, "failed to inspect container for update");
            return false;
        }
    };
    let Some(image) = inspect.config.and_then(|c| c.image) else {
        return false;
    };
    info!(service = %descriptor.name, image = %image, "pulling image for standalone container; recreate is out of scope");
    docker.create_image(Some(bollard::image::CreateImageOptions { from_image: image.as_str(), ..Default::default() }), None, None)
        .try_collect::<Vec<_>>()
        .await
        .is_ok()
}

pub async fn validate(docker: &Docker, descriptor: &ServiceDescriptor) -> bool {
    let Some(container_name) = &descriptor.container_name else {
        return false;
    };
    let inspect = match docker.inspect_container(container_name, None::<InspectContainerOptions>).await {
        Ok(info) => info,
        Err(_) => return false,
    };
    let running = inspect.state.as_ref().and_then(|s| s.running).unwrap_or(false);
    if !running {
        return false;
    }
    let healthy = inspect
        .state
        .as_ref()
        .and_then(|s| s.health.as_ref())
        .and_then(|h| h.status)
        .map(|status| status != bollard::models::HealthStatusEnum::UNHEALTHY)
        .unwrap_or(true);
    healthy
}

pub async fn status(docker: &Docker, descriptor: &ServiceDescriptor) -> BTreeMap<String, serde_json::Value> {
    let mut out = BTreeMap::new();
    let Some(container_name) = &descriptor.container_name else {
        return out;
    };
    if let Ok(inspect) = docker.inspect_container(container_name, None::<InspectContainerOptions>).await {
        let running = inspect.state.as_ref().and_then(|s| s.running).unwrap_or(false);
        out.insert("running".to_string(), serde_json::Value::from(running));
        out.insert("status".to_string(), serde_json::Value::from(inspect.state.as_ref().and_then(|s| s.status).map(|s| s.to_string()).unwrap_or_default()));
        out.insert("created".to_string(), serde_json::Value::from(inspect.created.unwrap_or_default()));
        out.insert("image".to_string(), serde_json::Value::from(inspect.config.and_then(|c| c.image).unwrap_or_default()));
        if let Some(health) = inspect.state.and_then(|s| s.health) {
            out.insert("healthy".to_string(), serde_json::Value::from(health.status != Some(bollard::models::HealthStatusEnum::UNHEALTHY)));
        }
    }
    out
}
