// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hypervisor capability: serves `vm`/`lxc` kinds.

use async_trait::async_trait;
use std::collections::BTreeMap;
use warden_core::{BackupDestination, BackupMetadata, ServiceDescriptor, ServiceKind};

/// A value in a kind-appropriate status mapping (`cpu`, `memory`,
/// `uptime`, ...). Kept loosely typed since fields vary by hypervisor.
pub type StatusValue = serde_json::Value;

/// Operations against a virtualization cluster. Implementations never
/// let underlying errors escape: every expected failure is logged and
/// returned as `false`.
#[async_trait]
pub trait HypervisorAdapter: Send + Sync + 'static {
    /// Whether this adapter handles `descriptor`'s kind.
    fn matches(&self, descriptor: &ServiceDescriptor) -> bool {
        matches!(descriptor.kind, ServiceKind::Vm | ServiceKind::Lxc)
    }

    /// Executes a backup to `destination`, recording outcome fields into
    /// `metadata`. Returns whether the backup succeeded.
    async fn backup(
        &self,
        descriptor: &ServiceDescriptor,
        destination: &BackupDestination,
        metadata: &mut BackupMetadata,
    ) -> bool;

    async fn snapshot_create(&self, descriptor: &ServiceDescriptor, name: &str) -> bool;
    async fn snapshot_restore(&self, descriptor: &ServiceDescriptor, name: &str) -> bool;
    async fn snapshot_delete(&self, descriptor: &ServiceDescriptor, name: &str) -> bool;

    /// Status mapping with at least `status`, `node`, `vmid`, `kind`.
    async fn status(&self, descriptor: &ServiceDescriptor) -> BTreeMap<String, StatusValue>;
}
