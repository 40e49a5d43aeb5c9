// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for session ageing.
//!
//! Token age decides when a session must rederive its key. Sessions read
//! time through [`Clock`] so tests can age a token without sleeping.

use std::time::{Duration, Instant};

/// Monotonic time source.
pub trait Clock: Clone + Send + Sync + 'static {
    fn now(&self) -> Instant;

    /// Time elapsed since `earlier`, saturating at zero.
    fn since(&self, earlier: Instant) -> Duration {
        self.now().saturating_duration_since(earlier)
    }
}

/// Real monotonic clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeClock;

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::Clock;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    /// Manually driven clock. Clones share the same timeline.
    #[derive(Debug, Clone)]
    pub struct FakeClock {
        now: Arc<Mutex<Instant>>,
    }

    impl FakeClock {
        pub fn new() -> Self {
            Self { now: Arc::new(Mutex::new(Instant::now())) }
        }

        /// Move the clock forward.
        pub fn advance(&self, by: Duration) {
            *self.now.lock() += by;
        }
    }

    impl Default for FakeClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> Instant {
            *self.now.lock()
        }
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
