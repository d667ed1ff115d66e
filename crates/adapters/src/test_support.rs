// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory fakes for the three adapter capabilities, recording every
//! call for assertions in engine unit tests.

use crate::hypervisor::{HypervisorAdapter, StatusValue};
use crate::notifier::{NotificationLevel, NotifierAdapter};
use crate::service::ServiceAdapter;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use warden_core::{BackupDestination, BackupMetadata, NotificationConfig, ServiceDescriptor};

#[derive(Debug, Clone, PartialEq)]
pub enum HypervisorCall {
    Backup { service: String, method: &'static str },
    SnapshotCreate { service: String, name: String },
    SnapshotRestore { service: String, name: String },
    SnapshotDelete { service: String, name: String },
    Status { service: String },
}

#[derive(Default)]
struct FakeHypervisorState {
    calls: Vec<HypervisorCall>,
    backup_results: BTreeMap<String, bool>,
    status_results: BTreeMap<String, BTreeMap<String, StatusValue>>,
}

/// A scriptable `HypervisorAdapter` whose backup outcome per service is
/// set ahead of time, following the workspace's `Fake*Adapter` pattern.
#[derive(Clone, Default)]
pub struct FakeHypervisorAdapter {
    state: Arc<Mutex<FakeHypervisorState>>,
}

impl FakeHypervisorAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_backup_result(&self, service: impl Into<String>, success: bool) {
        self.state.lock().backup_results.insert(service.into(), success);
    }

    pub fn set_status(&self, service: impl Into<String>, status: BTreeMap<String, StatusValue>) {
        self.state.lock().status_results.insert(service.into(), status);
    }

    pub fn calls(&self) -> Vec<HypervisorCall> {
        self.state.lock().calls.clone()
    }
}

#[async_trait]
impl HypervisorAdapter for FakeHypervisorAdapter {
    async fn backup(
        &self,
        descriptor: &ServiceDescriptor,
        destination: &BackupDestination,
        metadata: &mut BackupMetadata,
    ) -> bool {
        let mut guard = self.state.lock();
        guard.calls.push(HypervisorCall::Backup { service: descriptor.name.clone(), method: destination.method() });
        let result = guard.backup_results.get(&descriptor.name).copied().unwrap_or(true);
        if result {
            metadata.status = warden_core::BackupStatus::Success;
        } else {
            metadata.error_message = Some("fake hypervisor adapter was scripted to fail".to_string());
        }
        result
    }

    async fn snapshot_create(&self, descriptor: &ServiceDescriptor, name: &str) -> bool {
        self.state.lock().calls.push(HypervisorCall::SnapshotCreate { service: descriptor.name.clone(), name: name.to_string() });
        true
    }

    async fn snapshot_restore(&self, descriptor: &ServiceDescriptor, name: &str) -> bool {
        self.state.lock().calls.push(HypervisorCall::SnapshotRestore { service: descriptor.name.clone(), name: name.to_string() });
        true
    }

    async fn snapshot_delete(&self, descriptor: &ServiceDescriptor, name: &str) -> bool {
        self.state.lock().calls.push(HypervisorCall::SnapshotDelete { service: descriptor.name.clone(), name: name.to_string() });
        true
    }

    async fn status(&self, descriptor: &ServiceDescriptor) -> BTreeMap<String, StatusValue> {
        let mut guard = self.state.lock();
        guard.calls.push(HypervisorCall::Status { service: descriptor.name.clone() });
        guard.status_results.get(&descriptor.name).cloned().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServiceCall {
    Backup { service: String, destination_path: String },
    Update { service: String },
    Validate { service: String },
    Rollback { service: String },
    Status { service: String },
}

#[derive(Default)]
struct FakeServiceState {
    calls: Vec<ServiceCall>,
    backup_results: BTreeMap<String, bool>,
    validate_results: BTreeMap<String, bool>,
}

/// A scriptable `ServiceAdapter`.
#[derive(Clone, Default)]
pub struct FakeServiceAdapter {
    state: Arc<Mutex<FakeServiceState>>,
}

impl FakeServiceAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_backup_result(&self, service: impl Into<String>, success: bool) {
        self.state.lock().backup_results.insert(service.into(), success);
    }

    pub fn set_validate_result(&self, service: impl Into<String>, healthy: bool) {
        self.state.lock().validate_results.insert(service.into(), healthy);
    }

    pub fn calls(&self) -> Vec<ServiceCall> {
        self.state.lock().calls.clone()
    }
}

#[async_trait]
impl ServiceAdapter for FakeServiceAdapter {
    async fn backup(&self, descriptor: &ServiceDescriptor, destination_path: &str) -> bool {
        let mut guard = self.state.lock();
        guard.calls.push(ServiceCall::Backup { service: descriptor.name.clone(), destination_path: destination_path.to_string() });
        let result = guard.backup_results.get(&descriptor.name).copied().unwrap_or(true);
        if result {
            if let Some(parent) = std::path::Path::new(destination_path).parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = std::fs::write(destination_path, b"fake archive contents, large enough to pass verification thresholds in tests");
        }
        result
    }

    async fn update(&self, descriptor: &ServiceDescriptor) -> bool {
        self.state.lock().calls.push(ServiceCall::Update { service: descriptor.name.clone() });
        true
    }

    async fn validate(&self, descriptor: &ServiceDescriptor) -> bool {
        let mut guard = self.state.lock();
        guard.calls.push(ServiceCall::Validate { service: descriptor.name.clone() });
        guard.validate_results.get(&descriptor.name).copied().unwrap_or(true)
    }

    async fn rollback(&self, descriptor: &ServiceDescriptor) -> bool {
        self.state.lock().calls.push(ServiceCall::Rollback { service: descriptor.name.clone() });
        false
    }

    async fn status(&self, descriptor: &ServiceDescriptor) -> BTreeMap<String, StatusValue> {
        self.state.lock().calls.push(ServiceCall::Status { service: descriptor.name.clone() });
        BTreeMap::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotifierCall {
    pub title: String,
    pub body: String,
    pub level: NotificationLevel,
}

#[derive(Default)]
struct FakeNotifierState {
    calls: Vec<NotifierCall>,
    send_result: bool,
}

/// A scriptable `NotifierAdapter` recording every summary sent, mirroring
/// the workspace's `FakeNotifyAdapter`.
#[derive(Clone)]
pub struct FakeNotifierAdapter {
    state: Arc<Mutex<FakeNotifierState>>,
}

impl Default for FakeNotifierAdapter {
    fn default() -> Self {
        Self { state: Arc::new(Mutex::new(FakeNotifierState { calls: Vec::new(), send_result: true })) }
    }
}

impl FakeNotifierAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_send_result(&self, result: bool) {
        self.state.lock().send_result = result;
    }

    pub fn calls(&self) -> Vec<NotifierCall> {
        self.state.lock().calls.clone()
    }
}

#[async_trait]
impl NotifierAdapter for FakeNotifierAdapter {
    fn matches(&self, _config: &NotificationConfig) -> bool {
        true
    }

    async fn send(&self, title: &str, body: &str, level: NotificationLevel, _metadata: Option<serde_json::Value>) -> bool {
        let mut guard = self.state.lock();
        guard.calls.push(NotifierCall { title: title.to_string(), body: body.to_string(), level });
        guard.send_result
    }

    async fn test_connection(&self) -> bool {
        true
    }
}
