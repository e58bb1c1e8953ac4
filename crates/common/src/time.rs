use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::time::Instant;

/// Global monotonic start time for the application.
/// Used to calculate relative timestamps for latency measurements.
pub static MONOTONIC_START: Lazy<Instant> = Lazy::new(Instant::now);

/// Nanoseconds elapsed since the process monotonic anchor.
pub fn now_nanos() -> u64 {
    MONOTONIC_START.elapsed().as_nanos() as u64
}

/// Elapsed-seconds timer with an explicit lifecycle.
///
/// The baseline is captured on the first `measure` call; until then the
/// timer is disarmed. `reset` drops the baseline so the next `measure`
/// restarts the sequence at 0.0.
#[derive(Debug, Default, Clone, Copy)]
pub struct ElapsedTimer {
    baseline: Option<Instant>,
}

impl ElapsedTimer {
    pub const fn new() -> Self {
        Self { baseline: None }
    }

    /// The first call captures the baseline and returns 0.0. Every later
    /// call returns seconds elapsed since the baseline, non-decreasing
    /// until `reset`.
    pub fn measure(&mut self) -> f64 {
        match self.baseline {
            Some(baseline) => baseline.elapsed().as_secs_f64(),
            None => {
                self.baseline = Some(Instant::now());
                0.0
            }
        }
    }

    /// Disarm the timer. The next `measure` re-arms and returns 0.0.
    pub fn reset(&mut self) {
        self.baseline = None;
    }

    /// Whether a baseline has been captured.
    pub fn is_armed(&self) -> bool {
        self.baseline.is_some()
    }
}

/// Process-wide timer for callers that want the free-function surface
/// instead of owning an `ElapsedTimer`.
static PROCESS_TIMER: Lazy<Mutex<ElapsedTimer>> = Lazy::new(|| Mutex::new(ElapsedTimer::new()));

/// Measure against the process-wide timer. See [`ElapsedTimer::measure`].
pub fn measure() -> f64 {
    PROCESS_TIMER.lock().measure()
}

/// Reset the process-wide timer. See [`ElapsedTimer::reset`].
pub fn reset() {
    PROCESS_TIMER.lock().reset()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn burn_cpu(amount: Duration) {
        let start = Instant::now();
        while start.elapsed() < amount {
            std::hint::spin_loop();
        }
    }

    #[test]
    fn test_first_measure_returns_zero() {
        let mut timer = ElapsedTimer::new();
        assert_eq!(timer.measure(), 0.0);
        assert!(timer.is_armed());
    }

    #[test]
    fn test_measure_after_busy_wait() {
        let mut timer = ElapsedTimer::new();
        timer.measure();
        burn_cpu(Duration::from_millis(100));
        let elapsed = timer.measure();
        // Generous upper bound to absorb scheduling jitter.
        assert!(elapsed >= 0.09, "elapsed too small: {}", elapsed);
        assert!(elapsed <= 1.0, "elapsed too large: {}", elapsed);
    }

    #[test]
    fn test_measurements_are_non_decreasing() {
        let mut timer = ElapsedTimer::new();
        timer.measure();
        let mut last = 0.0;
        for _ in 0..100 {
            let next = timer.measure();
            assert!(next >= last);
            last = next;
        }
    }

    #[test]
    fn test_reset_restarts_sequence() {
        let mut timer = ElapsedTimer::new();
        timer.measure();
        burn_cpu(Duration::from_millis(20));
        assert!(timer.measure() > 0.0);

        timer.reset();
        assert!(!timer.is_armed());
        assert_eq!(timer.measure(), 0.0);
        assert!(timer.measure() < 0.01, "baseline was not re-captured");
    }

    #[test]
    fn test_timer_stays_armed_when_elapsed_rounds_to_zero() {
        // A measured value of zero must not be mistaken for "never armed".
        let mut timer = ElapsedTimer::new();
        timer.measure();
        let _ = timer.measure();
        assert!(timer.is_armed());
        burn_cpu(Duration::from_millis(10));
        assert!(timer.measure() > 0.0);
    }

    #[test]
    fn test_process_wide_timer() {
        // Single test owns the global so parallel tests don't interleave.
        reset();
        assert_eq!(measure(), 0.0);
        burn_cpu(Duration::from_millis(10));
        assert!(measure() > 0.0);
        reset();
        assert_eq!(measure(), 0.0);
    }

    #[test]
    fn test_now_nanos_is_monotonic() {
        let a = now_nanos();
        let b = now_nanos();
        assert!(b >= a);
    }
}
