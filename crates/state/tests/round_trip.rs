// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use std::sync::Arc;
use warden_core::{Clock, FakeClock, StateValue};
use warden_state::{SqliteStateStore, StateStore};

fn fresh_store() -> SqliteStateStore {
    let clock: Arc<dyn Clock> = Arc::new(FakeClock::new("2026-01-01T00:00:00Z".parse().unwrap()));
    #[allow(clippy::unwrap_used)]
    SqliteStateStore::open_in_memory(clock).unwrap()
}

proptest! {
    #[test]
    fn int_values_round_trip(key in "[a-z][a-z0-9_.]{0,32}", value in any::<i64>()) {
        let store = fresh_store();
        store.set(&key, StateValue::Int(value)).unwrap();
        let read_back = store.get(&key).unwrap().unwrap();
        prop_assert_eq!(read_back.value, StateValue::Int(value));
    }

    #[test]
    fn string_values_round_trip(key in "[a-z][a-z0-9_.]{0,32}", value in "[\\PC]{0,64}") {
        let store = fresh_store();
        store.set(&key, StateValue::String(value.clone())).unwrap();
        let read_back = store.get(&key).unwrap().unwrap();
        prop_assert_eq!(read_back.value, StateValue::String(value));
    }

    #[test]
    fn bool_values_never_decode_as_int(key in "[a-z][a-z0-9_.]{0,32}", value in any::<bool>()) {
        let store = fresh_store();
        store.set(&key, StateValue::Bool(value)).unwrap();
        prop_assert_eq!(store.get_i64(&key).unwrap(), None);
        prop_assert_eq!(store.get_bool(&key).unwrap(), Some(value));
    }
}
