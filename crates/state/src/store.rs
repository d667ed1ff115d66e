// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `StateStore` contract: a typed key/value store with updated_at
//! bookkeeping, mirroring the original `StateManager`'s table shape
//! (`key TEXT PRIMARY KEY, value TEXT, type TEXT, updated_at TIMESTAMP`).

use warden_core::StateError;
use warden_core::StateValue;

/// A single row as read back from the store, carrying the last-write
/// timestamp alongside the typed value.
#[derive(Debug, Clone, PartialEq)]
pub struct StateRecord {
    pub key: String,
    pub value: StateValue,
    /// ISO 8601 timestamp of the most recent write to this key.
    pub updated_at: String,
}

/// Typed key/value persistence for engine bookkeeping. Every write updates
/// `updated_at` to the time of the call.
pub trait StateStore: Send + Sync {
    /// Inserts or overwrites `key` with `value`.
    fn set(&self, key: &str, value: StateValue) -> Result<(), StateError>;

    /// Reads `key`, if present.
    fn get(&self, key: &str) -> Result<Option<StateRecord>, StateError>;

    /// Removes `key`. Returns whether a row was actually deleted.
    fn delete(&self, key: &str) -> Result<bool, StateError>;

    /// Lists all keys, optionally restricted to those starting with
    /// `prefix`.
    fn keys(&self, prefix: Option<&str>) -> Result<Vec<String>, StateError>;

    /// Convenience: reads `key` and unwraps it as a bool, or `None` if
    /// absent or of a different type.
    fn get_bool(&self, key: &str) -> Result<Option<bool>, StateError> {
        Ok(self.get(key)?.and_then(|r| r.value.as_bool()))
    }

    /// Convenience: reads `key` and unwraps it as an i64, or `None` if
    /// absent or of a different type.
    fn get_i64(&self, key: &str) -> Result<Option<i64>, StateError> {
        Ok(self.get(key)?.and_then(|r| r.value.as_i64()))
    }

    /// Convenience: reads `key` and unwraps it as a string, or `None` if
    /// absent or of a different type.
    fn get_str(&self, key: &str) -> Result<Option<String>, StateError> {
        Ok(self.get(key)?.and_then(|r| r.value.as_str().map(str::to_string)))
    }
}
