//! Time management utilities

use std::time::Instant;

/// Default upper bound for a single frame delta, in milliseconds.
///
/// A stalled tab or a debugger pause would otherwise hand the simulation a
/// multi-second step.
pub const DEFAULT_MAX_DELTA_MS: f32 = 100.0;

/// High-precision frame timer for the external game loop.
///
/// The core itself never reads the clock; the driver calls [`Timer::tick`]
/// once per frame and passes the clamped delta into [`crate::Engine::update`].
pub struct Timer {
    last_frame: Instant,
    delta_ms: f32,
    total_ms: f64,
    frame_count: u64,
    max_delta_ms: f32,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer with the default delta clamp
    pub fn new() -> Self {
        Self::with_max_delta(DEFAULT_MAX_DELTA_MS)
    }

    /// Create a timer with a custom delta clamp (milliseconds)
    pub fn with_max_delta(max_delta_ms: f32) -> Self {
        Self {
            last_frame: Instant::now(),
            delta_ms: 0.0,
            total_ms: 0.0,
            frame_count: 0,
            max_delta_ms,
        }
    }

    /// Advance the timer by one frame and return the clamped delta in
    /// milliseconds.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let raw_ms = now.duration_since(self.last_frame).as_secs_f32() * 1000.0;
        self.last_frame = now;
        self.delta_ms = raw_ms.min(self.max_delta_ms);
        self.total_ms += f64::from(self.delta_ms);
        self.frame_count += 1;
        self.delta_ms
    }

    /// Delta of the most recent frame in milliseconds
    pub fn delta_ms(&self) -> f32 {
        self.delta_ms
    }

    /// Total clamped time accumulated since creation, in milliseconds
    pub fn total_ms(&self) -> f64 {
        self.total_ms
    }

    /// Number of frames ticked so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_counts_frames() {
        let mut timer = Timer::new();
        timer.tick();
        timer.tick();
        assert_eq!(timer.frame_count(), 2);
    }

    #[test]
    fn test_delta_is_clamped() {
        let mut timer = Timer::with_max_delta(5.0);
        std::thread::sleep(std::time::Duration::from_millis(12));
        let delta = timer.tick();
        assert!(delta <= 5.0);
    }
}
