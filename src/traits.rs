//! Seams for the things a trip session cannot compute by itself.
//!
//! Wall-clock time and random movement are injected so the state machine
//! stays deterministic under test.

use chrono::{Local, NaiveTime, Timelike};
use rand::Rng;

/// Source of the current time of day.
pub trait Clock {
    /// Current time of day, truncated to the minute.
    fn now(&self) -> NaiveTime;
}

/// Random offset applied to simulated user movement, in degrees.
pub trait Jitter {
    /// Returns `(d_lat, d_lon)`, each within `[-max_degrees, max_degrees]`.
    fn offset(&mut self, max_degrees: f64) -> (f64, f64);
}

/// Local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveTime {
        let time = Local::now().time();
        time.with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(time)
    }
}

/// A clock stuck at one time of day.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveTime {
        self.0
    }
}

/// Uniform jitter drawn from any `rand` generator.
#[derive(Debug, Clone)]
pub struct RandomJitter<R> {
    rng: R,
}

impl<R: Rng> RandomJitter<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Jitter for RandomJitter<R> {
    fn offset(&mut self, max_degrees: f64) -> (f64, f64) {
        if max_degrees <= 0.0 {
            return (0.0, 0.0);
        }
        (
            self.rng.gen_range(-max_degrees..=max_degrees),
            self.rng.gen_range(-max_degrees..=max_degrees),
        )
    }
}

/// Always returns the same offset, clamped to the allowed range.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedJitter {
    pub d_lat: f64,
    pub d_lon: f64,
}

impl Jitter for FixedJitter {
    fn offset(&mut self, max_degrees: f64) -> (f64, f64) {
        let limit = max_degrees.abs();
        (self.d_lat.clamp(-limit, limit), self.d_lon.clamp(-limit, limit))
    }
}
