//! Time source for the defense engine.
//!
//! Every timestamp the engine stores or compares goes through [`Clock`], so
//! lockout and rate-limit windows can be driven by a manual clock in tests.

use bulwark_common::Timestamp;

/// Source of "now" in Unix epoch seconds
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall clock backed by chrono
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        chrono::Utc::now().timestamp_millis() as f64 / 1000.0
    }
}

#[cfg(test)]
pub use manual::ManualClock;

#[cfg(test)]
mod manual {
    use super::Clock;
    use bulwark_common::Timestamp;
    use std::sync::{Arc, Mutex};

    /// Clock that only moves when told to. Clones share the same time.
    #[derive(Debug, Clone)]
    pub struct ManualClock(Arc<Mutex<Timestamp>>);

    impl ManualClock {
        pub fn new(start: Timestamp) -> Self {
            Self(Arc::new(Mutex::new(start)))
        }

        pub fn advance(&self, secs: f64) {
            *self.0.lock().unwrap() += secs;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Timestamp {
            *self.0.lock().unwrap()
        }
    }
}
