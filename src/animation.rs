//! Frame-driven value animation.
//!
//! [`AnimatedValue`] is the needle smoother: the owner sets a target on
//! every telemetry sample and the frame loop calls [`AnimatedValue::tick`]
//! once per frame. [`LoopingValue`] is a sawtooth generator for driving
//! demo gauges without a data source.

use std::time::Duration;

/// Once the needle is this close to the target it snaps exactly.
const SNAP_EPSILON: f64 = 0.1;

/// Default exponential smoothing factor per tick.
const DEFAULT_SMOOTHING: f64 = 0.1;

/// Smooths a displayed value toward an externally set target.
///
/// Convergence is geometric and never overshoots: each tick closes a fixed
/// fraction of the remaining gap, then snaps once within [`SNAP_EPSILON`].
/// A later `set_target` reopens the transient.
#[derive(Debug, Clone, Copy)]
pub struct AnimatedValue {
    displayed: f64,
    target: f64,
    smoothing: f64,
}

impl AnimatedValue {
    pub fn new(initial: f64) -> Self {
        Self {
            displayed: initial,
            target: initial,
            smoothing: DEFAULT_SMOOTHING,
        }
    }

    /// Override the per-tick smoothing factor. Values outside (0, 1]
    /// degrade to a needle that creeps or jumps, they never error.
    pub fn with_smoothing(mut self, smoothing: f64) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// Set where the needle should head. Takes effect on following ticks only.
    pub fn set_target(&mut self, target: f64) {
        self.target = target;
    }

    /// Advance one animation frame.
    pub fn tick(&mut self) {
        if (self.target - self.displayed).abs() > SNAP_EPSILON {
            self.displayed += (self.target - self.displayed) * self.smoothing;
        } else {
            self.displayed = self.target;
        }
    }

    pub fn displayed(&self) -> f64 {
        self.displayed
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// True once the transient has finished and the needle sits on target.
    pub fn settled(&self) -> bool {
        self.displayed == self.target
    }
}

/// Cyclic sawtooth generator: steps from `min` to `max` over one cycle
/// duration, then wraps back to `min`. Demo and test driver only.
#[derive(Debug, Clone)]
pub struct LoopingValue {
    min: f64,
    max: f64,
    step: f64,
    step_interval: Duration,
    value: f64,
    elapsed: Duration,
}

impl LoopingValue {
    pub fn new(min: f64, max: f64, cycle: Duration, step: f64) -> Self {
        let steps = if step > 0.0 && max > min {
            (max - min) / step
        } else {
            1.0
        };
        Self {
            min,
            max,
            step,
            step_interval: cycle.div_f64(steps.max(1.0)),
            value: min,
            elapsed: Duration::ZERO,
        }
    }

    /// Advance by wall-clock time, stepping as many times as the elapsed
    /// interval allows. Degenerate configurations (non-positive step,
    /// empty range, zero cycle) hold the value at `min`.
    pub fn tick(&mut self, dt: Duration) {
        if self.step <= 0.0 || self.max <= self.min || self.step_interval.is_zero() {
            return;
        }
        self.elapsed += dt;
        while self.elapsed >= self.step_interval {
            self.elapsed -= self.step_interval;
            let next = self.value + self.step;
            self.value = if next > self.max { self.min } else { next };
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converges_to_target_without_overshoot() {
        let mut needle = AnimatedValue::new(0.0);
        needle.set_target(100.0);

        let mut prev = needle.displayed();
        let mut ticks = 0;
        while !needle.settled() {
            needle.tick();
            assert!(needle.displayed() >= prev, "needle moved backwards");
            assert!(needle.displayed() <= 100.0, "needle overshot");
            prev = needle.displayed();
            ticks += 1;
            assert!(ticks < 200, "did not settle in a bounded number of ticks");
        }
        assert_eq!(needle.displayed(), 100.0);
    }

    #[test]
    fn snaps_once_within_epsilon() {
        let mut needle = AnimatedValue::new(99.95);
        needle.set_target(100.0);
        needle.tick();
        assert_eq!(needle.displayed(), 100.0);
    }

    #[test]
    fn new_target_reopens_the_transient() {
        let mut needle = AnimatedValue::new(0.0);
        needle.set_target(50.0);
        for _ in 0..200 {
            needle.tick();
        }
        assert!(needle.settled());

        needle.set_target(10.0);
        assert!(!needle.settled());
        needle.tick();
        assert!(needle.displayed() < 50.0);
    }

    #[test]
    fn set_target_has_no_immediate_effect_on_displayed() {
        let mut needle = AnimatedValue::new(5.0);
        needle.set_target(80.0);
        assert_eq!(needle.displayed(), 5.0);
    }

    #[test]
    fn first_step_closes_a_tenth_of_the_gap() {
        let mut needle = AnimatedValue::new(0.0);
        needle.set_target(100.0);
        needle.tick();
        assert!((needle.displayed() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn looping_value_wraps_back_to_min() {
        let mut sweep = LoopingValue::new(0.0, 5.0, Duration::from_millis(500), 1.0);
        // 5 steps per cycle -> one step every 100ms.
        sweep.tick(Duration::from_millis(100));
        assert_eq!(sweep.value(), 1.0);
        sweep.tick(Duration::from_millis(400));
        assert_eq!(sweep.value(), 5.0);
        sweep.tick(Duration::from_millis(100));
        assert_eq!(sweep.value(), 0.0);
    }

    #[test]
    fn looping_value_tolerates_zero_step() {
        let mut sweep = LoopingValue::new(0.0, 10.0, Duration::from_secs(1), 0.0);
        sweep.tick(Duration::from_secs(5));
        assert_eq!(sweep.value(), 0.0);
    }

    #[test]
    fn looping_value_tolerates_zero_cycle() {
        // A zero cycle makes the step interval zero; tick must return
        // instead of draining the interval forever.
        let mut sweep = LoopingValue::new(0.0, 10.0, Duration::ZERO, 1.0);
        sweep.tick(Duration::from_millis(16));
        assert_eq!(sweep.value(), 0.0);
    }
}
