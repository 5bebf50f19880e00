use std::time::Instant;

use crate::error::ViewerError;

/// Source of monotonic timestamps for the instrumentation cadence.
pub trait Clock {
    fn now(&self) -> Result<Instant, ViewerError>;
}

/// Clock backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl MonotonicClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Result<Instant, ViewerError> {
        Ok(Instant::now())
    }
}

/// Convenient alias for owning clocks behind trait objects.
pub type BoxedClock = Box<dyn Clock>;

/// Seconds between two samples, with sub-second precision.
///
/// Returns `0.0` when `end` precedes `start`.
pub fn elapsed_seconds(start: Instant, end: Instant) -> f64 {
    end.saturating_duration_since(start).as_secs_f64()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn elapsed_keeps_sub_second_precision() {
        let start = Instant::now();
        let end = start + Duration::from_millis(1_250);
        assert!((elapsed_seconds(start, end) - 1.25).abs() < 1e-9);
    }

    #[test]
    fn elapsed_saturates_when_samples_are_reversed() {
        let start = Instant::now();
        let end = start + Duration::from_millis(10);
        assert_eq!(elapsed_seconds(end, start), 0.0);
    }

    #[test]
    fn monotonic_clock_never_goes_backwards() {
        let clock = MonotonicClock::new();
        let first = clock.now().expect("clock");
        let second = clock.now().expect("clock");
        assert!(second >= first);
    }
}
