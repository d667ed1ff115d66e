// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task-polling loop shared by backups and snapshots: fixed 2-second
//! interval, a progress log every 30 elapsed seconds, timeout as failure.

use super::client::ProxmoxClient;
use std::time::{Duration, Instant};
use tracing::info;

const POLL_INTERVAL: Duration = Duration::from_secs(2);
const PROGRESS_INTERVAL: Duration = Duration::from_secs(30);
const MAX_ERROR_LINES: usize = 3;

/// Polls a Proxmox task until it stops, then inspects `exitstatus`.
/// Returns `Ok(())` when the task succeeded, or `Err(reason)` containing
/// up to the last three error/fail lines from the task log on failure or
/// timeout.
pub async fn poll(client: &ProxmoxClient, node: &str, upid: &str, timeout: Duration) -> Result<(), String> {
    let started = Instant::now();
    let mut last_progress_log = Instant::now();

    loop {
        if started.elapsed() > timeout {
            return Err(format!("task {upid} on node {node} timed out after {}s", timeout.as_secs()));
        }

        let status = client
            .task_status(node, upid)
            .await
            .map_err(|e| format!("failed to poll task {upid} on node {node}: {e}"))?;

        let task_status = status.get("status").and_then(|v| v.as_str()).unwrap_or("");
        if task_status == "stopped" {
            let exit_status = status.get("exitstatus").and_then(|v| v.as_str()).unwrap_or("");
            if exit_status == "OK" {
                return Ok(());
            }
            let log = client.task_log(node, upid).await.unwrap_or_default();
            let error_lines: Vec<&String> = log
                .iter()
                .filter(|line| {
                    let lower = line.to_lowercase();
                    lower.contains("error") || lower.contains("fail")
                })
                .rev()
                .take(MAX_ERROR_LINES)
                .collect();
            let mut error_lines: Vec<String> = error_lines.into_iter().rev().cloned().collect();
            if error_lines.is_empty() {
                error_lines.push(exit_status.to_string());
            }
            return Err(format!("task {upid} exited with status '{exit_status}': {}", error_lines.join("; ")));
        }

        if last_progress_log.elapsed() >= PROGRESS_INTERVAL {
            info!(node, upid, elapsed_secs = started.elapsed().as_secs(), "task still running");
            last_progress_log = Instant::now();
        }

        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
