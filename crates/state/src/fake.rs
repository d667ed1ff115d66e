// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory `StateStore` for tests, following the same fake-adapter
//! shape used throughout the workspace: state behind `Arc<Mutex<_>>`, a
//! `Clone` handle shared between the test and the code under test.

use crate::store::{StateRecord, StateStore};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use warden_core::{Clock, StateError, StateValue};

#[derive(Default)]
struct FakeState {
    rows: BTreeMap<String, StateRecord>,
}

/// A `StateStore` that lives entirely in memory, for unit tests of
/// callers that don't need real persistence.
#[derive(Clone)]
pub struct FakeStateStore {
    state: Arc<Mutex<FakeState>>,
    clock: Arc<dyn Clock>,
}

impl FakeStateStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { state: Arc::new(Mutex::new(FakeState::default())), clock }
    }

    /// Snapshot of every row currently stored, for assertions.
    pub fn snapshot(&self) -> Vec<StateRecord> {
        self.state.lock().rows.values().cloned().collect()
    }
}

impl StateStore for FakeStateStore {
    fn set(&self, key: &str, value: StateValue) -> Result<(), StateError> {
        let updated_at = self.clock.iso_now();
        self.state
            .lock()
            .rows
            .insert(key.to_string(), StateRecord { key: key.to_string(), value, updated_at });
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<StateRecord>, StateError> {
        Ok(self.state.lock().rows.get(key).cloned())
    }

    fn delete(&self, key: &str) -> Result<bool, StateError> {
        Ok(self.state.lock().rows.remove(key).is_some())
    }

    fn keys(&self, prefix: Option<&str>) -> Result<Vec<String>, StateError> {
        let guard = self.state.lock();
        Ok(guard
            .rows
            .keys()
            .filter(|k| match prefix {
                Some(p) => k.starts_with(p),
                None => true,
            })
            .cloned()
            .collect())
    }
}
