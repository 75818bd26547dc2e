//! # Fixed-Timestep Clock
//!
//! Converts frame time from the host's render loop into a whole number of
//! simulation ticks. Leftover time carries over to the next frame, so the
//! simulation advances at exactly `tick_rate` on average regardless of the
//! frame rate.
//!
//! The clock never reads the system time itself; the host passes the
//! elapsed duration, which keeps it deterministic under test.

use std::time::Duration;

/// Upper bound on ticks owed for a single frame.
///
/// A long stall (window dragged, debugger attached) would otherwise queue a
/// burst of catch-up ticks.
pub const MAX_CATCH_UP_TICKS: u32 = 8;

/// Timing statistics for executed ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickTiming {
    /// Shortest tick observed, in microseconds.
    pub min_tick_us: u64,
    /// Longest tick observed, in microseconds.
    pub max_tick_us: u64,
    /// Rolling average tick duration, in microseconds.
    pub avg_tick_us: u64,
    /// Ticks that took longer than one timestep.
    pub late_ticks: u64,
    /// Ticks measured.
    pub total_ticks: u64,
    /// Owed ticks discarded by the catch-up cap.
    pub dropped_ticks: u64,
}

impl TickTiming {
    fn new(tick_duration: Duration) -> Self {
        Self {
            min_tick_us: u64::MAX,
            max_tick_us: 0,
            avg_tick_us: tick_duration.as_micros() as u64,
            late_ticks: 0,
            total_ticks: 0,
            dropped_ticks: 0,
        }
    }
}

/// Fixed-timestep accumulator.
#[derive(Clone, Debug)]
pub struct TickClock {
    tick_duration: Duration,
    accumulator: Duration,
    timing: TickTiming,
}

impl TickClock {
    /// Creates a clock running at `tick_rate` ticks per second.
    ///
    /// # Panics
    ///
    /// Panics if `tick_rate` is zero.
    #[must_use]
    pub fn new(tick_rate: u32) -> Self {
        assert!(tick_rate > 0, "Tick rate must be at least 1");
        let tick_duration = Duration::from_micros(1_000_000 / u64::from(tick_rate));
        Self {
            tick_duration,
            accumulator: Duration::ZERO,
            timing: TickTiming::new(tick_duration),
        }
    }

    /// Length of one tick.
    #[inline]
    #[must_use]
    pub const fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    /// Time accumulated towards the next tick.
    #[inline]
    #[must_use]
    pub const fn accumulated(&self) -> Duration {
        self.accumulator
    }

    /// Adds frame time and returns how many ticks are now due.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulator += elapsed;

        let mut due = 0;
        while self.accumulator >= self.tick_duration {
            self.accumulator -= self.tick_duration;
            due += 1;
        }

        if due > MAX_CATCH_UP_TICKS {
            let dropped = due - MAX_CATCH_UP_TICKS;
            self.timing.dropped_ticks += u64::from(dropped);
            tracing::warn!(due, dropped, "Simulation fell behind, dropping ticks");
            due = MAX_CATCH_UP_TICKS;
        }
        due
    }

    /// Fraction of a tick accumulated, for render interpolation.
    #[must_use]
    pub fn alpha(&self) -> f32 {
        self.accumulator.as_secs_f32() / self.tick_duration.as_secs_f32()
    }

    /// Records how long one executed tick took.
    pub fn record_tick(&mut self, duration: Duration) {
        let duration_us = duration.as_micros() as u64;
        let timing = &mut self.timing;

        timing.total_ticks += 1;
        timing.min_tick_us = timing.min_tick_us.min(duration_us);
        timing.max_tick_us = timing.max_tick_us.max(duration_us);
        timing.avg_tick_us = (timing.avg_tick_us * 15 + duration_us) / 16;

        if duration > self.tick_duration {
            timing.late_ticks += 1;
        }
    }

    /// Timing statistics.
    #[inline]
    #[must_use]
    pub const fn timing(&self) -> &TickTiming {
        &self.timing
    }

    /// Resets the statistics.
    pub fn reset_timing(&mut self) {
        self.timing = TickTiming::new(self.tick_duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_duration() {
        let clock = TickClock::new(60);
        assert_eq!(clock.tick_duration(), Duration::from_micros(16_666));
    }

    #[test]
    fn test_leftover_time_carries_over() {
        let mut clock = TickClock::new(100);

        assert_eq!(clock.advance(Duration::from_millis(15)), 1);
        assert_eq!(clock.accumulated(), Duration::from_millis(5));
        assert!((clock.alpha() - 0.5).abs() < 1e-4);

        assert_eq!(clock.advance(Duration::from_millis(6)), 1);
        assert_eq!(clock.advance(Duration::from_millis(3)), 0);
    }

    #[test]
    fn test_catch_up_is_capped() {
        let mut clock = TickClock::new(100);
        assert_eq!(clock.advance(Duration::from_secs(1)), MAX_CATCH_UP_TICKS);
        assert_eq!(
            clock.timing().dropped_ticks,
            u64::from(100 - MAX_CATCH_UP_TICKS)
        );
    }

    #[test]
    fn test_late_tick_recorded() {
        let mut clock = TickClock::new(100);
        clock.record_tick(Duration::from_millis(2));
        clock.record_tick(Duration::from_millis(25));

        let timing = clock.timing();
        assert_eq!(timing.total_ticks, 2);
        assert_eq!(timing.late_ticks, 1);
        assert_eq!(timing.min_tick_us, 2_000);
        assert_eq!(timing.max_tick_us, 25_000);

        clock.reset_timing();
        assert_eq!(clock.timing().total_ticks, 0);
    }
}
