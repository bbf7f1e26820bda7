//! Frame timing handed to processing units.
//!
//! - [`Clock`] - per-tick timing token passed through `update` and `paint`
//! - [`FixedStep`] - turns variable frame time into fixed simulation steps
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use sparse_ecs::clock::{Clock, FixedStep};
//! use sparse_ecs::World;
//!
//! let mut world = World::new();
//! let mut clock = Clock::new();
//! let mut fixed = FixedStep::new(60);
//!
//! // In your game loop:
//! for _ in 0..fixed.tick(Duration::from_millis(20)) {
//!     clock.advance(fixed.timestep());
//!     world.update(&clock);
//! }
//! clock.set_alpha(fixed.alpha());
//! world.paint(&clock);
//! ```

use std::time::Duration;

/// Timing token for one tick. The world never reads it; units do.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Clock {
    /// Time covered by the current tick
    delta: Duration,
    /// Total time advanced so far
    elapsed: Duration,
    /// Number of ticks advanced
    frame: u64,
    /// Interpolation fraction between the last two ticks (0.0 to 1.0)
    alpha: f32,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step the clock forward by one tick of length `delta`.
    pub fn advance(&mut self, delta: Duration) {
        self.delta = delta;
        self.elapsed += delta;
        self.frame += 1;
    }

    /// Set the paint interpolation fraction, clamped to `[0, 1]`.
    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Get delta time in seconds
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }
}

/// Fixed timestep accumulator for deterministic updates
#[derive(Clone, Debug)]
pub struct FixedStep {
    timestep: Duration,
    accumulator: Duration,
}

impl FixedStep {
    /// Create with given frequency (Hz)
    pub fn new(hz: u32) -> Self {
        Self::from_duration(Duration::from_secs_f64(1.0 / hz.max(1) as f64))
    }

    pub fn from_duration(timestep: Duration) -> Self {
        Self {
            timestep,
            accumulator: Duration::ZERO,
        }
    }

    /// Accumulate `delta` and return the number of fixed steps to run
    pub fn tick(&mut self, delta: Duration) -> usize {
        self.accumulator += delta;
        if self.timestep.is_zero() {
            return 0;
        }

        let mut steps = 0;
        while self.accumulator >= self.timestep {
            self.accumulator -= self.timestep;
            steps += 1;
        }
        steps
    }

    pub fn timestep(&self) -> Duration {
        self.timestep
    }

    /// Time left over after the last full step
    pub fn overstep(&self) -> Duration {
        self.accumulator
    }

    /// Leftover as a fraction of the timestep, for paint interpolation
    pub fn alpha(&self) -> f32 {
        if self.timestep.is_zero() {
            0.0
        } else {
            (self.accumulator.as_secs_f64() / self.timestep.as_secs_f64()) as f32
        }
    }
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_advance() {
        let mut clock = Clock::new();
        assert_eq!(clock.frame(), 0);
        clock.advance(Duration::from_millis(10));
        clock.advance(Duration::from_millis(30));
        assert_eq!(clock.frame(), 2);
        assert_eq!(clock.delta(), Duration::from_millis(30));
        assert_eq!(clock.elapsed(), Duration::from_millis(40));
    }

    #[test]
    fn test_alpha_is_clamped() {
        let mut clock = Clock::new();
        clock.set_alpha(1.5);
        assert_eq!(clock.alpha(), 1.0);
        clock.set_alpha(-0.5);
        assert_eq!(clock.alpha(), 0.0);
    }

    #[test]
    fn test_fixed_step_60hz() {
        let mut fixed = FixedStep::new(60);

        // 16ms frame, not quite a full step yet
        assert_eq!(fixed.tick(Duration::from_millis(16)), 0);
        assert_eq!(fixed.tick(Duration::from_millis(17)), 1);
    }

    #[test]
    fn test_fixed_step_slow_frame() {
        let mut fixed = FixedStep::from_duration(Duration::from_millis(10));
        assert_eq!(fixed.tick(Duration::from_millis(35)), 3);
        assert_eq!(fixed.overstep(), Duration::from_millis(5));
        assert!((fixed.alpha() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_zero_timestep_never_steps() {
        let mut fixed = FixedStep::from_duration(Duration::ZERO);
        assert_eq!(fixed.tick(Duration::from_millis(5)), 0);
        assert_eq!(fixed.alpha(), 0.0);
    }
}
