// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Summary notification: one message after a `backup_all_services` run,
//! built from the per-service results and the state store's recorded
//! errors. Sending is best-effort; failures are logged, never raised.

use std::collections::BTreeMap;
use tracing::{info, warn};
use warden_adapters::{NotificationLevel, NotifierAdapter};
use warden_core::{NotificationConfig, ValueError};
use warden_state::StateStore;

/// Sends (or, in dry-run mode, logs) a summary of `results` — a map of
/// service name to success/failure. Rejects an empty map.
pub async fn send_summary(
    notifier: Option<&dyn NotifierAdapter>,
    config: &NotificationConfig,
    state: &dyn StateStore,
    results: &BTreeMap<String, bool>,
    duration_seconds: Option<f64>,
    dry_run: bool,
) -> Result<(), ValueError> {
    if results.is_empty() {
        return Err(ValueError::EmptySummary);
    }

    let succeeded = results.values().filter(|v| **v).count();
    let total = results.len();
    let subject = format!("Backup Summary — {succeeded}/{total} Successful");
    let body = build_body(results, state, duration_seconds);

    if !config.enabled {
        info!("notifications disabled, skipping summary send");
        return Ok(());
    }

    if dry_run {
        info!(subject = %subject, "dry run: would have sent summary notification");
        return Ok(());
    }

    let Some(notifier) = notifier else {
        warn!("notifications enabled but no notifier adapter matched the configured kind");
        return Ok(());
    };

    let level = if succeeded == total { NotificationLevel::Success } else { NotificationLevel::Warning };
    if !notifier.send(&subject, &body, level, None).await {
        warn!("summary notification failed to send");
    }
    Ok(())
}

fn build_body(results: &BTreeMap<String, bool>, state: &dyn StateStore, duration_seconds: Option<f64>) -> String {
    let mut lines = Vec::new();
    if let Some(seconds) = duration_seconds {
        lines.push(format!("Run duration: {seconds:.2}s"));
    }

    let successes: Vec<&String> = results.iter().filter(|(_, ok)| **ok).map(|(name, _)| name).collect();
    let failures: Vec<&String> = results.iter().filter(|(_, ok)| !**ok).map(|(name, _)| name).collect();

    if !successes.is_empty() {
        lines.push("Succeeded:".to_string());
        for name in successes {
            lines.push(format!("  - {name}"));
        }
    }
    if !failures.is_empty() {
        lines.push("Failed:".to_string());
        for name in failures {
            let error = state
                .get_str(&format!("backup_error.{name}"))
                .ok()
                .flatten()
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| "(no error details)".to_string());
            lines.push(format!("  - {name}: {error}"));
        }
    }
    lines.join("\n")
}
