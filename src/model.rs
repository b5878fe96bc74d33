//! Core stopwatch model.
//!
//! Two separate metrics come out of this type: the *active* duration (time
//! spent running, pauses excluded) and the *session* duration (wall time since
//! the first start, pauses included). Neither is derived from the other.

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use crate::clock::{Clock, SystemClock};

#[derive(Clone, Debug)]
pub struct Stopwatch<C: Clock = SystemClock> {
    clock: C,
    /// Monotonic reading at the last `start()`; only meaningful while running.
    start_mark: Option<f64>,
    /// Active milliseconds over all completed start/stop cycles, offset included.
    accumulated_ms: f64,
    running: bool,
    /// Wall-clock begin of the current session, shifted back by the offset.
    session_start: Option<DateTime<Utc>>,
    initial_offset_ms: u64,
}

impl<C: Clock> Stopwatch<C> {
    pub fn new(clock: C, initial_offset_ms: u64) -> Self {
        Self {
            clock,
            start_mark: None,
            accumulated_ms: initial_offset_ms as f64,
            running: false,
            session_start: None,
            initial_offset_ms,
        }
    }

    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.start_mark = Some(self.clock.monotonic_ms());
        self.running = true;
        if self.session_start.is_none() {
            let offset = i64::try_from(self.initial_offset_ms)
                .ok()
                .and_then(TimeDelta::try_milliseconds)
                .unwrap_or(TimeDelta::MAX);
            let now = self.clock.wall_now();
            self.session_start = Some(
                now.checked_sub_signed(offset)
                    .unwrap_or(DateTime::<Utc>::MIN_UTC),
            );
        }
        debug!(elapsed_ms = self.elapsed_ms(), "stopwatch started");
    }

    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.accumulated_ms += self.running_span_ms();
        self.start_mark = None;
        self.running = false;
        debug!(elapsed_ms = self.accumulated_ms, "stopwatch stopped");
    }

    pub fn reset(&mut self) {
        self.start_mark = None;
        self.accumulated_ms = self.initial_offset_ms as f64;
        self.running = false;
        self.session_start = None;
        debug!(offset_ms = self.initial_offset_ms, "stopwatch reset");
    }

    pub fn toggle(&mut self) {
        if self.running {
            self.stop();
        } else {
            self.start();
        }
    }

    /// Active time in milliseconds, offset included.
    pub fn elapsed_ms(&self) -> f64 {
        if self.running {
            self.accumulated_ms + self.running_span_ms()
        } else {
            self.accumulated_ms
        }
    }

    /// Wall time since the session start, pauses included.
    pub fn session_elapsed_ms(&self) -> Option<u64> {
        let start = self.session_start?;
        let span = self.clock.wall_now().signed_duration_since(start);
        Some(span.num_milliseconds().max(0) as u64)
    }

    pub fn session_start_time(&self) -> Option<DateTime<Utc>> {
        self.session_start
    }

    pub fn has_started(&self) -> bool {
        self.session_start.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    // A monotonic source stepping backwards counts as no progress.
    fn running_span_ms(&self) -> f64 {
        match self.start_mark {
            Some(mark) => (self.clock.monotonic_ms() - mark).max(0.0),
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn wall() -> DateTime<Utc> {
        DateTime::from_timestamp(1_756_629_028, 0).unwrap()
    }

    fn watch(offset: u64) -> (Stopwatch<ManualClock>, ManualClock) {
        let clock = ManualClock::new(wall());
        (Stopwatch::new(clock.clone(), offset), clock)
    }

    #[test]
    fn fresh_stopwatch_reports_offset() {
        let (sw, _) = watch(90_000);
        assert_eq!(sw.elapsed_ms(), 90_000.0);
        assert!(!sw.is_running());
        assert!(!sw.has_started());
        assert_eq!(sw.session_start_time(), None);
        assert_eq!(sw.session_elapsed_ms(), None);
    }

    #[test]
    fn start_stop_accumulates_clock_delta() {
        let (mut sw, clock) = watch(0);
        sw.start();
        clock.advance(1_500);
        assert_eq!(sw.elapsed_ms(), 1_500.0);
        sw.stop();
        clock.advance(10_000);
        assert_eq!(sw.elapsed_ms(), 1_500.0);
        sw.start();
        clock.advance(500);
        sw.stop();
        assert_eq!(sw.elapsed_ms(), 2_000.0);
    }

    #[test]
    fn double_start_is_single_start() {
        let (mut sw, clock) = watch(0);
        sw.start();
        let session = sw.session_start_time();
        clock.advance(700);
        sw.start();
        assert_eq!(sw.session_start_time(), session);
        clock.advance(300);
        assert_eq!(sw.elapsed_ms(), 1_000.0);
    }

    #[test]
    fn stop_when_stopped_changes_nothing() {
        let (mut sw, clock) = watch(5_000);
        sw.stop();
        clock.advance(1_000);
        assert_eq!(sw.elapsed_ms(), 5_000.0);
        assert!(!sw.is_running());
        assert!(!sw.has_started());
    }

    #[test]
    fn session_start_is_shifted_back_by_offset() {
        let (mut sw, clock) = watch(3_600_000);
        sw.start();
        assert_eq!(
            sw.session_start_time(),
            Some(wall() - TimeDelta::hours(1))
        );
        sw.stop();
        clock.advance(60_000);
        sw.start();
        assert_eq!(
            sw.session_start_time(),
            Some(wall() - TimeDelta::hours(1))
        );
    }

    #[test]
    fn reset_restores_offset_and_clears_session() {
        let (mut sw, clock) = watch(42_000);
        sw.start();
        clock.advance(9_000);
        sw.reset();
        assert_eq!(sw.elapsed_ms(), 42_000.0);
        assert!(!sw.has_started());
        assert!(!sw.is_running());
        clock.advance(9_000);
        assert_eq!(sw.elapsed_ms(), 42_000.0);

        sw.start();
        assert_eq!(
            sw.session_start_time(),
            Some(wall() + TimeDelta::seconds(18) - TimeDelta::seconds(42))
        );
    }

    #[test]
    fn session_duration_includes_pauses() {
        let (mut sw, clock) = watch(0);
        sw.start();
        clock.advance(2_000);
        sw.stop();
        clock.advance(8_000);
        assert_eq!(sw.elapsed_ms(), 2_000.0);
        assert_eq!(sw.session_elapsed_ms(), Some(10_000));
    }

    #[test]
    fn session_duration_includes_offset() {
        let (mut sw, clock) = watch(60_000);
        sw.start();
        clock.advance(1_000);
        assert_eq!(sw.session_elapsed_ms(), Some(61_000));
    }

    #[test]
    fn wall_clock_jump_does_not_touch_active_time() {
        let (mut sw, clock) = watch(0);
        sw.start();
        clock.advance(1_000);
        clock.shift_wall(TimeDelta::hours(-2));
        assert_eq!(sw.elapsed_ms(), 1_000.0);
        assert_eq!(sw.session_elapsed_ms(), Some(0));
    }

    #[test]
    fn monotonic_step_back_never_goes_negative() {
        let (mut sw, clock) = watch(0);
        clock.set_monotonic(5_000.0);
        sw.start();
        clock.set_monotonic(4_000.0);
        assert_eq!(sw.elapsed_ms(), 0.0);
        sw.stop();
        assert_eq!(sw.elapsed_ms(), 0.0);
    }

    #[test]
    fn huge_offsets_push_session_start_into_the_past() {
        for offset in [u64::MAX, i64::MAX as u64, i64::MAX as u64 + 1] {
            let (mut sw, clock) = watch(offset);
            sw.start();
            clock.advance(5_000);
            let start = sw.session_start_time().unwrap();
            assert!(start <= clock.wall_now(), "offset {offset}");
            assert_eq!(start, DateTime::<Utc>::MIN_UTC, "offset {offset}");
            assert!(sw.session_elapsed_ms().unwrap() > 5_000);
        }
    }

    #[test]
    fn toggle_alternates() {
        let (mut sw, clock) = watch(0);
        sw.toggle();
        assert!(sw.is_running());
        clock.advance(250);
        sw.toggle();
        assert!(!sw.is_running());
        assert_eq!(sw.elapsed_ms(), 250.0);
    }
}
