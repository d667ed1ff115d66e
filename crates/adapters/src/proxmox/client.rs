// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin REST client over the Proxmox VE API. One `reqwest::Client`
//! instance is built lazily and reused for the adapter's lifetime.

use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;
use tokio::sync::OnceCell;
use warden_core::HypervisorConfig;

#[derive(Debug, Error)]
pub enum ProxmoxError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("unexpected response shape: {0}")]
    Shape(String),
}

impl From<reqwest::Error> for ProxmoxError {
    fn from(e: reqwest::Error) -> Self {
        ProxmoxError::Request(e.to_string())
    }
}

pub struct ProxmoxClient {
    config: HypervisorConfig,
    client: OnceCell<reqwest::Client>,
}

impl ProxmoxClient {
    pub fn new(config: HypervisorConfig) -> Self {
        Self { config, client: OnceCell::new() }
    }

    async fn client(&self) -> Result<&reqwest::Client, ProxmoxError> {
        self.client
            .get_or_try_init(|| async {
                reqwest::Client::builder()
                    .danger_accept_invalid_certs(!self.config.verify_tls)
                    .build()
                    .map_err(ProxmoxError::from)
            })
            .await
    }

    fn base_url(&self) -> String {
        format!("https://{}:8006/api2/json", self.config.host)
    }

    fn auth_header(&self) -> Result<String, ProxmoxError> {
        let (Some(token_id), Some(token_secret)) = (&self.config.token_id, &self.config.token_secret) else {
            return Err(ProxmoxError::Request("hypervisor token_id/token_secret not configured".to_string()));
        };
        Ok(format!("PVEAPIToken={}!{token_id}={token_secret}", self.config.user))
    }

    async fn get(&self, path: &str) -> Result<Value, ProxmoxError> {
        let client = self.client().await?;
        let resp = client
            .get(format!("{}{path}", self.base_url()))
            .header("Authorization", self.auth_header()?)
            .send()
            .await?
            .error_for_status()?;
        let body: Value = resp.json().await?;
        body.get("data").cloned().ok_or_else(|| ProxmoxError::Shape("missing 'data' field".to_string()))
    }

    async fn post(&self, path: &str, params: BTreeMap<String, String>) -> Result<Value, ProxmoxError> {
        let client = self.client().await?;
        let resp = client
            .post(format!("{}{path}", self.base_url()))
            .header("Authorization", self.auth_header()?)
            .form(&params)
            .send()
            .await?
            .error_for_status()?;
        let body: Value = resp.json().await?;
        body.get("data").cloned().ok_or_else(|| ProxmoxError::Shape("missing 'data' field".to_string()))
    }

    /// Cluster resources index, filtered to `kind` ("qemu" or "lxc").
    pub async fn cluster_resources(&self, kind: &str) -> Result<Vec<Value>, ProxmoxError> {
        let data = self.get(&format!("/cluster/resources?type={kind}")).await?;
        let items = data.as_array().cloned().unwrap_or_default();
        Ok(items.into_iter().filter(|i| i.get("type").and_then(Value::as_str) == Some(kind)).collect())
    }

    /// Issues a `vzdump`-style async task and returns its UPID.
    pub async fn post_task(&self, node: &str, op: &str, params: BTreeMap<String, String>) -> Result<String, ProxmoxError> {
        let path = format!("/nodes/{node}/{op}");
        let data = self.post(&path, params).await?;
        data.as_str().map(str::to_string).ok_or_else(|| ProxmoxError::Shape("task endpoint did not return a UPID string".to_string()))
    }

    pub async fn snapshot_create(&self, node: &str, kind: &str, vmid: i64, name: &str) -> Result<String, ProxmoxError> {
        let mut params = BTreeMap::new();
        params.insert("snapname".to_string(), name.to_string());
        let data = self.post(&format!("/nodes/{node}/{kind}/{vmid}/snapshot"), params).await?;
        data.as_str().map(str::to_string).ok_or_else(|| ProxmoxError::Shape("snapshot create did not return a UPID".to_string()))
    }

    pub async fn snapshot_rollback(&self, node: &str, kind: &str, vmid: i64, name: &str) -> Result<String, ProxmoxError> {
        let data = self.post(&format!("/nodes/{node}/{kind}/{vmid}/snapshot/{name}/rollback"), BTreeMap::new()).await?;
        data.as_str().map(str::to_string).ok_or_else(|| ProxmoxError::Shape("snapshot rollback did not return a UPID".to_string()))
    }

    pub async fn snapshot_delete(&self, node: &str, kind: &str, vmid: i64, name: &str) -> Result<String, ProxmoxError> {
        let client = self.client().await?;
        let resp = client
            .delete(format!("{}/nodes/{node}/{kind}/{vmid}/snapshot/{name}", self.base_url()))
            .header("Authorization", self.auth_header()?)
            .send()
            .await?
            .error_for_status()?;
        let body: Value = resp.json().await?;
        body.get("data")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ProxmoxError::Shape("snapshot delete did not return a UPID".to_string()))
    }

    pub async fn workload_status(&self, node: &str, kind: &str, vmid: i64) -> Result<Value, ProxmoxError> {
        self.get(&format!("/nodes/{node}/{kind}/{vmid}/status/current")).await
    }

    pub async fn task_status(&self, node: &str, upid: &str) -> Result<Value, ProxmoxError> {
        self.get(&format!("/nodes/{node}/tasks/{upid}/status")).await
    }

    pub async fn task_log(&self, node: &str, upid: &str) -> Result<Vec<String>, ProxmoxError> {
        let data = self.get(&format!("/nodes/{node}/tasks/{upid}/log")).await?;
        let lines = data
            .as_array()
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|e| e.get("t").and_then(Value::as_str).map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        Ok(lines)
    }

    pub async fn poll_task(&self, node: &str, upid: &str, timeout: std::time::Duration) -> Result<(), String> {
        super::task::poll(self, node, upid, timeout).await
    }
}
