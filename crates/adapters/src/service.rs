// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service capability: serves `docker`/`systemd`/`generic` kinds.

use async_trait::async_trait;
use std::collections::BTreeMap;
use warden_core::{ServiceDescriptor, ServiceKind};

pub type StatusValue = serde_json::Value;

/// Operations against Docker containers, systemd units, and plain file
/// trees. Implementations never let underlying errors escape.
#[async_trait]
pub trait ServiceAdapter: Send + Sync + 'static {
    fn matches(&self, descriptor: &ServiceDescriptor) -> bool {
        matches!(descriptor.kind, ServiceKind::Docker | ServiceKind::Systemd | ServiceKind::Generic | ServiceKind::Host)
    }

    /// Produces a single archive at `destination_path`.
    async fn backup(&self, descriptor: &ServiceDescriptor, destination_path: &str) -> bool;

    async fn update(&self, descriptor: &ServiceDescriptor) -> bool;

    /// Whether the workload is currently healthy.
    async fn validate(&self, descriptor: &ServiceDescriptor) -> bool;

    /// May be unsupported; returns `false` when it is.
    async fn rollback(&self, descriptor: &ServiceDescriptor) -> bool;

    async fn status(&self, descriptor: &ServiceDescriptor) -> BTreeMap<String, StatusValue>;
}
