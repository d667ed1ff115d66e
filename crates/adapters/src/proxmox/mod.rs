// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Proxmox VE hypervisor adapter, grounded in
//! `original_source/plugins/hypervisors/proxmox.py`: cluster-aware node
//! resolution, task polling with progress logging, and last-error-line
//! extraction on failure.

mod client;
mod task;

use crate::hypervisor::{HypervisorAdapter, StatusValue};
use async_trait::async_trait;
use client::ProxmoxClient;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{info, warn};
use warden_core::{BackupDestination, BackupMetadata, HypervisorConfig, ServiceDescriptor, ServiceKind};

const SNAPSHOT_TIMEOUT: Duration = Duration::from_secs(600);
const BACKUP_TIMEOUT: Duration = Duration::from_secs(3600);

/// Executes backups and snapshots against a Proxmox cluster, remaining
/// correct across live migration by re-resolving the authoritative node
/// on every call instead of trusting the descriptor's `node` hint.
pub struct ProxmoxAdapter {
    client: ProxmoxClient,
}

impl ProxmoxAdapter {
    pub fn new(config: HypervisorConfig) -> Self {
        Self { client: ProxmoxClient::new(config) }
    }

    fn proxmox_kind(descriptor: &ServiceDescriptor) -> &'static str {
        match descriptor.kind {
            ServiceKind::Vm => "qemu",
            ServiceKind::Lxc => "lxc",
            _ => "qemu",
        }
    }

    /// Resolves the node a workload actually lives on via the cluster
    /// resources index, falling back to the descriptor's hint (logged)
    /// when the lookup fails or the vmid is absent from the index.
    async fn resolve_node(&self, descriptor: &ServiceDescriptor) -> String {
        let hint = descriptor.node.clone().unwrap_or_default();
        let Some(vmid) = descriptor.vmid else {
            return hint;
        };
        let kind = Self::proxmox_kind(descriptor);

        match self.client.cluster_resources(kind).await {
            Ok(resources) => match pick_node(&resources, vmid) {
                NodeLookup::Found(actual) if actual == hint => actual,
                NodeLookup::Found(actual) => {
                    warn!(service = %descriptor.name, hint = %hint, actual = %actual, "descriptor node hint is stale, using cluster-reported node");
                    actual
                }
                NodeLookup::NotFound => {
                    warn!(service = %descriptor.name, vmid, "vmid not found in cluster resources index, falling back to configured node hint");
                    hint
                }
            },
            Err(e) => {
                warn!(service = %descriptor.name, error = %e, "cluster resources lookup failed, falling back to configured node hint");
                hint
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeLookup {
    Found(String),
    NotFound,
}

/// Finds `vmid`'s current node in a `/cluster/resources` index. Pure
/// matching logic, pulled out of `resolve_node` so it is testable without
/// a live Proxmox API.
fn pick_node(resources: &[serde_json::Value], vmid: i64) -> NodeLookup {
    resources
        .iter()
        .find_map(|r| {
            if r.get("vmid").and_then(|v| v.as_i64()) == Some(vmid) {
                r.get("node").and_then(|v| v.as_str()).map(str::to_string)
            } else {
                None
            }
        })
        .map(NodeLookup::Found)
        .unwrap_or(NodeLookup::NotFound)
}

#[async_trait]
impl HypervisorAdapter for ProxmoxAdapter {
    async fn backup(
        &self,
        descriptor: &ServiceDescriptor,
        destination: &BackupDestination,
        metadata: &mut BackupMetadata,
    ) -> bool {
        let Some(vmid) = descriptor.vmid else {
            warn!(service = %descriptor.name, "backup requested for descriptor without a vmid");
            return false;
        };
        let node = self.resolve_node(descriptor).await;
        metadata.node = Some(node.clone());

        let mut params = BTreeMap::new();
        params.insert("vmid".to_string(), vmid.to_string());
        params.insert("mode".to_string(), "snapshot".to_string());

        match destination {
            BackupDestination::Remote { remote_config } => {
                params.insert("storage".to_string(), remote_config.datastore.clone());
                params.insert("compress".to_string(), "zstd".to_string());
                params.insert("remove".to_string(), "0".to_string());
            }
            BackupDestination::Direct { path } => {
                params.insert("dumpdir".to_string(), path.clone());
                params.insert("compress".to_string(), "zstd".to_string());
            }
            BackupDestination::Local { .. } => {
                warn!(service = %descriptor.name, "local destination requested for a hypervisor-managed service, this is a configuration error");
                return false;
            }
        }

        let upid = match self.client.post_task(&node, "vzdump", params).await {
            Ok(upid) => upid,
            Err(e) => {
                warn!(service = %descriptor.name, node = %node, error = %e, "failed to start vzdump task");
                metadata.error_message = Some(format!("failed to start backup task: {e}"));
                return false;
            }
        };

        match self.client.poll_task(&node, &upid, BACKUP_TIMEOUT).await {
            Ok(()) => {
                info!(service = %descriptor.name, node = %node, upid = %upid, "backup task completed successfully");
                true
            }
            Err(reason) => {
                warn!(service = %descriptor.name, node = %node, upid = %upid, reason = %reason, "backup task failed");
                metadata.error_message = Some(reason);
                false
            }
        }
    }

    async fn snapshot_create(&self, descriptor: &ServiceDescriptor, name: &str) -> bool {
        self.run_snapshot_op(descriptor, SnapshotOp::Create, name).await
    }

    async fn snapshot_restore(&self, descriptor: &ServiceDescriptor, name: &str) -> bool {
        self.run_snapshot_op(descriptor, SnapshotOp::Rollback, name).await
    }

    async fn snapshot_delete(&self, descriptor: &ServiceDescriptor, name: &str) -> bool {
        self.run_snapshot_op(descriptor, SnapshotOp::Delete, name).await
    }

    async fn status(&self, descriptor: &ServiceDescriptor) -> BTreeMap<String, StatusValue> {
        let mut out = BTreeMap::new();
        let Some(vmid) = descriptor.vmid else {
            return out;
        };
        let node = self.resolve_node(descriptor).await;
        let kind = Self::proxmox_kind(descriptor);

        match self.client.workload_status(&node, kind, vmid).await {
            Ok(status) => {
                out.insert("node".to_string(), StatusValue::from(node));
                out.insert("vmid".to_string(), StatusValue::from(vmid));
                out.insert("kind".to_string(), StatusValue::from(kind));
                for key in ["status", "cpu", "mem", "uptime"] {
                    if let Some(v) = status.get(key) {
                        let mapped_key = if key == "mem" { "memory" } else { key };
                        out.insert(mapped_key.to_string(), v.clone());
                    }
                }
            }
            Err(e) => {
                warn!(service = %descriptor.name, node = %node, error = %e, "status lookup failed");
                out.insert("status".to_string(), StatusValue::from("unknown"));
            }
        }
        out
    }
}

#[derive(Debug, Clone, Copy)]
enum SnapshotOp {
    Create,
    Rollback,
    Delete,
}

impl std::fmt::Display for SnapshotOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SnapshotOp::Create => "create",
            SnapshotOp::Rollback => "rollback",
            SnapshotOp::Delete => "delete",
        };
        f.write_str(s)
    }
}

impl ProxmoxAdapter {
    async fn run_snapshot_op(&self, descriptor: &ServiceDescriptor, op: SnapshotOp, name: &str) -> bool {
        let Some(vmid) = descriptor.vmid else {
            return false;
        };
        let node = self.resolve_node(descriptor).await;
        let kind = Self::proxmox_kind(descriptor);

        let result = match op {
            SnapshotOp::Create => self.client.snapshot_create(&node, kind, vmid, name).await,
            SnapshotOp::Rollback => self.client.snapshot_rollback(&node, kind, vmid, name).await,
            SnapshotOp::Delete => self.client.snapshot_delete(&node, kind, vmid, name).await,
        };

        let upid = match result {
            Ok(upid) => upid,
            Err(e) => {
                warn!(service = %descriptor.name, node = %node, %op, error = %e, "snapshot operation failed to start");
                return false;
            }
        };

        match self.client.poll_task(&node, &upid, SNAPSHOT_TIMEOUT).await {
            Ok(()) => true,
            Err(reason) => {
                warn!(service = %descriptor.name, node = %node, %op, reason = %reason, "snapshot task failed");
                false
            }
        }
    }
}
