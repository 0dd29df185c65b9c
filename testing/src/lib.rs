//! # Lead Capture Testing
//!
//! Testing utilities and helpers for the lead capture pipeline.
//!
//! This crate provides:
//! - A deterministic [`FixedClock`]
//! - [`ReducerTest`], a Given-When-Then harness for reducers
//! - Assertion helpers for effect lists
//! - [`logs::EventCounter`] for asserting on emitted log events
//!
//! ## Example
//!
//! ```ignore
//! use lead_capture_testing::{ReducerTest, assertions, test_clock};
//!
//! ReducerTest::new(SubmissionReducer::new())
//!     .with_env(test_environment())
//!     .given_state(SubmissionState::default())
//!     .when_action(SubmissionAction::Submit)
//!     .then_effects(|effects| assertions::assert_has_future_effect(effects))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use lead_capture_core::environment::Clock;

pub mod logs;

pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use lead_capture_testing::mocks::FixedClock;
    /// use lead_capture_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
        assert_eq!(time1.to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }
}
