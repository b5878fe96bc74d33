//! Time sources for the stopwatch.
//!
//! Active time is read from the monotonic clock; the session start and
//! session duration from the wall clock.

use chrono::{DateTime, Utc};

pub trait Clock {
    /// Monotonic milliseconds from an arbitrary origin.
    fn monotonic_ms(&self) -> f64;
    fn wall_now(&self) -> DateTime<Utc>;
}

/// `performance.now()` + `Date.now()` in the browser, `Instant` elsewhere.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

#[cfg(target_arch = "wasm32")]
impl Clock for SystemClock {
    fn monotonic_ms(&self) -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or(0.0)
    }

    fn wall_now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Clock for SystemClock {
    fn monotonic_ms(&self) -> f64 {
        use std::sync::OnceLock;
        use std::time::Instant;

        static ORIGIN: OnceLock<Instant> = OnceLock::new();
        ORIGIN.get_or_init(Instant::now).elapsed().as_secs_f64() * 1000.0
    }

    fn wall_now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
pub use manual::ManualClock;

#[cfg(test)]
mod manual {
    use super::Clock;
    use chrono::{DateTime, TimeDelta, Utc};
    use std::cell::Cell;
    use std::rc::Rc;

    /// Hand-driven clock; clones share the same readings.
    #[derive(Clone, Debug)]
    pub struct ManualClock {
        mono: Rc<Cell<f64>>,
        wall: Rc<Cell<DateTime<Utc>>>,
    }

    impl ManualClock {
        pub fn new(wall: DateTime<Utc>) -> Self {
            Self {
                mono: Rc::new(Cell::new(1_000.0)),
                wall: Rc::new(Cell::new(wall)),
            }
        }

        /// Moves both clocks forward together, as real time would.
        pub fn advance(&self, ms: u64) {
            self.mono.set(self.mono.get() + ms as f64);
            self.wall.set(self.wall.get() + TimeDelta::milliseconds(ms as i64));
        }

        /// Steps only the wall clock, e.g. a user changing the system time.
        pub fn shift_wall(&self, delta: TimeDelta) {
            self.wall.set(self.wall.get() + delta);
        }

        pub fn set_monotonic(&self, ms: f64) {
            self.mono.set(ms);
        }
    }

    impl Clock for ManualClock {
        fn monotonic_ms(&self) -> f64 {
            self.mono.get()
        }

        fn wall_now(&self) -> DateTime<Utc> {
            self.wall.get()
        }
    }
}
