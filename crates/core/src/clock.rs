// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time source abstraction so retention math and timestamp generation are
//! deterministic in tests.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

/// Anything that can tell the time. Production code uses [`SystemClock`];
/// tests use [`FakeClock`] to pin retention-day boundaries exactly.
pub trait Clock: Send + Sync + 'static {
    /// Current wall-clock time.
    fn now(&self) -> DateTime<Utc>;

    /// `now()` formatted as an ISO 8601 timestamp, the format persisted in
    /// backup metadata and state records.
    fn iso_now(&self) -> String {
        self.now().to_rfc3339()
    }
}

/// Reads the real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock under test control. Starts at a fixed instant and only moves
/// when told to.
#[derive(Clone)]
pub struct FakeClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl FakeClock {
    /// Creates a fake clock pinned at `at`.
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { now: Arc::new(Mutex::new(at)) }
    }

    /// Moves the clock forward by `duration`.
    pub fn advance(&self, duration: chrono::Duration) {
        let mut guard = self.now.lock();
        *guard += duration;
    }

    /// Pins the clock to an exact instant.
    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock() = at;
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn fake_clock_advances_by_exact_duration() {
        let start: DateTime<Utc> = "2026-01-01T00:00:00Z".parse().unwrap();
        let clock = FakeClock::new(start);
        clock.advance(chrono::Duration::days(3));
        assert_eq!(clock.now(), start + chrono::Duration::days(3));
    }

    #[test]
    fn iso_now_round_trips_through_rfc3339() {
        let at: DateTime<Utc> = "2026-03-05T12:00:00Z".parse().unwrap();
        let clock = FakeClock::new(at);
        let parsed: DateTime<Utc> = clock.iso_now().parse().unwrap();
        assert_eq!(parsed, at);
    }
}
