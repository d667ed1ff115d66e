// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service adapter serving `docker`, `systemd`, and `generic`/`host`
//! kinds by dispatching to a dedicated backup/update/validate/status
//! path per kind, grounded in `original_source/plugins/services/generic.py`.

mod archive;
mod docker;
mod manifest;
mod paths;
mod systemd;

use crate::service::{ServiceAdapter, StatusValue};
use async_trait::async_trait;
use bollard::Docker;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use warden_core::{Clock, ServiceDescriptor, ServiceKind};

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

pub struct GenericServiceAdapter {
    docker: Docker,
    clock: Arc<dyn Clock>,
    http: reqwest::Client,
}

impl GenericServiceAdapter {
    /// Connects to the local Docker daemon using its default
    /// environment-derived socket. Construction fails only if Docker's
    /// own connection setup is malformed, never on daemon unavailability
    /// (that surfaces per-call as adapter-level failures instead).
    pub fn new(clock: Arc<dyn Clock>) -> Result<Self, bollard::errors::Error> {
        Ok(Self {
            docker: Docker::connect_with_local_defaults()?,
            clock,
            http: reqwest::Client::builder().timeout(HEALTH_CHECK_TIMEOUT).build().unwrap_or_default(),
        })
    }

    async fn health_check_ok(&self, descriptor: &ServiceDescriptor) -> bool {
        let Some(url) = &descriptor.health_check_url else {
            return true;
        };
        match self.http.get(url).send().await {
            Ok(resp) => resp.status().as_u16() == 200,
            Err(e) => {
                warn!(service = %descriptor.name, url = %url, error = %e, "health check request failed");
                false
            }
        }
    }
}

#[async_trait]
impl ServiceAdapter for GenericServiceAdapter {
    async fn backup(&self, descriptor: &ServiceDescriptor, destination_path: &str) -> bool {
        match descriptor.kind {
            ServiceKind::Docker => docker::backup(&self.docker, descriptor, destination_path, self.clock.as_ref()).await,
            ServiceKind::Systemd => systemd::backup(descriptor, destination_path, self.clock.as_ref()).await,
            ServiceKind::Generic | ServiceKind::Host => paths::backup(descriptor, destination_path, self.clock.as_ref()).await,
            ServiceKind::Vm | ServiceKind::Lxc => {
                warn!(service = %descriptor.name, "generic service adapter does not serve hypervisor-managed kinds");
                false
            }
        }
    }

    async fn update(&self, descriptor: &ServiceDescriptor) -> bool {
        if !descriptor.update {
            return true;
        }
        match descriptor.kind {
            ServiceKind::Docker => docker::update(&self.docker, descriptor).await,
            ServiceKind::Systemd => systemd::update(descriptor).await,
            ServiceKind::Generic | ServiceKind::Host => {
                warn!(service = %descriptor.name, "generic kind does not support update");
                false
            }
            ServiceKind::Vm | ServiceKind::Lxc => false,
        }
    }

    async fn validate(&self, descriptor: &ServiceDescriptor) -> bool {
        let kind_ok = match descriptor.kind {
            ServiceKind::Docker => docker::validate(&self.docker, descriptor).await,
            ServiceKind::Systemd => systemd::validate(descriptor).await,
            ServiceKind::Generic | ServiceKind::Host => paths::validate(descriptor),
            ServiceKind::Vm | ServiceKind::Lxc => false,
        };
        kind_ok && self.health_check_ok(descriptor).await
    }

    async fn rollback(&self, descriptor: &ServiceDescriptor) -> bool {
        warn!(service = %descriptor.name, "rollback is not supported for any service kind");
        false
    }

    async fn status(&self, descriptor: &ServiceDescriptor) -> BTreeMap<String, StatusValue> {
        match descriptor.kind {
            ServiceKind::Docker => docker::status(&self.docker, descriptor).await,
            ServiceKind::Systemd => systemd::status(descriptor).await,
            ServiceKind::Generic | ServiceKind::Host => paths::status(descriptor).into_iter().collect(),
            ServiceKind::Vm | ServiceKind::Lxc => BTreeMap::new(),
        }
    }
}
