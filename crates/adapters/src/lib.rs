// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adapter contracts and concrete implementations: the pluggable boundary
//! between the backup engine and the outside world (hypervisor REST API,
//! Docker/systemd hosts, notification transports).

pub mod generic;
pub mod hypervisor;
pub mod notifier;
pub mod proxmox;
pub mod service;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use generic::GenericServiceAdapter;
pub use hypervisor::HypervisorAdapter;
pub use notifier::{NotificationLevel, NotifierAdapter};
pub use proxmox::ProxmoxAdapter;
pub use service::ServiceAdapter;

#[cfg(any(test, feature = "test-support"))]
pub use test_support::{FakeHypervisorAdapter, FakeNotifierAdapter, FakeServiceAdapter};
