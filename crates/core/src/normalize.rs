// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Enum-field normalization shared by the config and service types.
//!
//! The original `ConfigLoader` lowercases hypervisor kind, backup format,
//! notification kind, and service type before validating them against an
//! allow-list, so `kind: Proxmox` and `kind: proxmox` are equivalent.
//! `deserialize_with` hooks reproduce that at parse time rather than
//! relying on every call site to compare case-insensitively.

use serde::{Deserialize, Deserializer};

/// Deserializes a string field, lowercasing it first.
pub fn deserialize_lowercase<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.to_lowercase())
}
