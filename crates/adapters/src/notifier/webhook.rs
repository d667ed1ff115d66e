// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Webhook notifier: POSTs a JSON payload to a configured URL. The
//! simplest transport that satisfies spec.md's "transport is
//! notifier-specific and out of scope" — grounded in the adapter-over-
//! `reqwest` shape used by the hypervisor adapter.

use crate::notifier::{NotificationLevel, NotifierAdapter};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, warn};
use warden_core::NotificationConfig;

#[derive(Debug, Serialize)]
struct Payload<'a> {
    title: &'a str,
    body: &'a str,
    level: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<Value>,
}

/// Sends notifications as a JSON POST to a webhook URL (Slack/Discord-
/// compatible endpoints, a generic HTTP sink, etc).
pub struct WebhookNotifierAdapter {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifierAdapter {
    pub fn new(url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), url: url.into() }
    }
}

#[async_trait]
impl NotifierAdapter for WebhookNotifierAdapter {
    fn matches(&self, config: &NotificationConfig) -> bool {
        config.kind.eq_ignore_ascii_case("webhook")
    }

    async fn send(&self, title: &str, body: &str, level: NotificationLevel, metadata: Option<Value>) -> bool {
        let payload = Payload { title, body, level: &level.to_string(), metadata };
        match self.client.post(&self.url).json(&payload).send().await {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                warn!(status = %resp.status(), url = %self.url, "webhook notification rejected");
                false
            }
            Err(e) => {
                error!(error = %e, url = %self.url, "webhook notification failed to send");
                false
            }
        }
    }

    async fn test_connection(&self) -> bool {
        match self.client.head(&self.url).send().await {
            Ok(resp) => resp.status().is_success() || resp.status().is_redirection(),
            Err(e) => {
                warn!(error = %e, url = %self.url, "webhook connectivity test failed");
                false
            }
        }
    }
}
