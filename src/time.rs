//! Tick accounting for a running simulation.
//!
//! Boids tick on their own free-running loops, so there is no global frame.
//! [`TickClock`] is shared by every boid task and counts completed ticks,
//! which is enough to tell how far the real cadence slipped from the
//! configured one under lock contention.
//!
//! # Example
//!
//! ```ignore
//! let clock = TickClock::new();
//! clock.record();
//!
//! println!("Ticks: {}", clock.ticks());
//! println!("Rate: {:.1}/s", clock.ticks_per_second());
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Shared tick counter.
#[derive(Debug)]
pub struct TickClock {
    /// When the clock was created.
    start: Instant,
    /// Completed ticks across all boids.
    ticks: AtomicU64,
}

impl TickClock {
    /// Create a clock starting from now.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            ticks: AtomicU64::new(0),
        }
    }

    /// Count one completed tick.
    #[inline]
    pub fn record(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Total ticks since start.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Time since the clock was created.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Average ticks per second over the whole run, summed over all boids.
    pub fn ticks_per_second(&self) -> f64 {
        let secs = self.elapsed().as_secs_f64();
        if secs > 0.0 {
            self.ticks() as f64 / secs
        } else {
            0.0
        }
    }

    /// Ratio of achieved to configured per-boid tick rate.
    ///
    /// `1.0` means every boid kept pace with `interval`; lower values mean the
    /// cadence slipped.
    pub fn cadence(&self, population: usize, interval: Duration) -> f64 {
        if population == 0 || interval.is_zero() {
            return 0.0;
        }
        let per_boid = self.ticks_per_second() / population as f64;
        per_boid * interval.as_secs_f64()
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_clock_new() {
        let clock = TickClock::new();
        assert_eq!(clock.ticks(), 0);
        assert_eq!(clock.cadence(0, Duration::from_millis(5)), 0.0);
    }

    #[test]
    fn test_record() {
        let clock = TickClock::new();
        for _ in 0..10 {
            clock.record();
        }
        assert_eq!(clock.ticks(), 10);
    }

    #[test]
    fn test_rate() {
        let clock = TickClock::new();
        thread::sleep(Duration::from_millis(10));
        clock.record();

        assert!(clock.elapsed() >= Duration::from_millis(10));
        assert!(clock.ticks_per_second() > 0.0);
        // One tick in at least 10ms cannot keep a 1ms cadence
        assert!(clock.cadence(1, Duration::from_millis(1)) < 1.0);
    }

    #[test]
    fn test_shared_across_threads() {
        let clock = std::sync::Arc::new(TickClock::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let clock = clock.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        clock.record();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(clock.ticks(), 400);
    }
}
