// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notifier capability: exactly one active implementation per process,
//! selected by configuration.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use warden_core::NotificationConfig;

/// Severity tag carried with every notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NotificationLevel::Info => "info",
            NotificationLevel::Success => "success",
            NotificationLevel::Warning => "warning",
            NotificationLevel::Error => "error",
        };
        f.write_str(s)
    }
}

/// Delivers run summaries and other operator-facing messages. Send
/// failures are the caller's problem to swallow, not the adapter's: the
/// adapter reports `false` and logs, it never panics or blocks forever.
#[async_trait]
pub trait NotifierAdapter: Send + Sync + 'static {
    fn matches(&self, config: &NotificationConfig) -> bool;

    async fn send(
        &self,
        title: &str,
        body: &str,
        level: NotificationLevel,
        metadata: Option<serde_json::Value>,
    ) -> bool;

    async fn test_connection(&self) -> bool;
}

pub mod webhook;
pub use webhook::WebhookNotifierAdapter;
