//! Scale-in Animation
//!
//! Eases a freshly loaded mesh from scale `0` up to its normalized scale.
//! Steps run on a fixed 60 Hz reference clock so the ramp looks the same
//! regardless of the host's frame rate.

/// Fixed time step configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedTimeStep {
    /// Fixed timestep in seconds
    pub step: f64,
    /// Maximum number of fixed updates per tick (to prevent spiral of death)
    pub max_updates: u32,
}

impl Default for FixedTimeStep {
    fn default() -> Self {
        Self {
            step: 1.0 / 60.0,
            max_updates: 8,
        }
    }
}

/// Accumulates variable frame time into whole fixed steps
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    timestep: FixedTimeStep,
    accumulator: f64,
}

impl FrameClock {
    /// Add `dt` seconds and return how many fixed steps are due
    pub fn advance(&mut self, dt: f64) -> u32 {
        if !dt.is_finite() || dt <= 0.0 || self.timestep.step <= 0.0 {
            return 0;
        }
        self.accumulator += dt;

        let mut due = 0;
        while self.accumulator >= self.timestep.step && due < self.timestep.max_updates {
            self.accumulator -= self.timestep.step;
            due += 1;
        }

        // Drop the backlog after a long stall
        if due == self.timestep.max_updates {
            self.accumulator = self.accumulator.min(self.timestep.step);
        }
        due
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

pub const DEFAULT_SCALE_RATE: f64 = 0.2;
pub const DEFAULT_MIN_SCALE_STEP: f64 = 0.05;
pub const DEFAULT_SCALE_EPSILON: f64 = 1e-4;

/// Explicit easing state for the scale-in ramp
#[derive(Debug, Clone)]
pub struct ScaleAnimation {
    current: f64,
    target: f64,
    /// Fraction of the remaining distance covered per step
    pub rate: f64,
    /// Smallest step, guarantees termination
    pub min_step: f64,
    pub epsilon: f64,
    clock: FrameClock,
}

impl ScaleAnimation {
    /// Animation sitting at `target`, already finished
    pub fn settled(target: f64) -> Self {
        Self {
            current: target,
            target,
            rate: DEFAULT_SCALE_RATE,
            min_step: DEFAULT_MIN_SCALE_STEP,
            epsilon: DEFAULT_SCALE_EPSILON,
            clock: FrameClock::default(),
        }
    }

    /// Restart from zero towards `target`
    pub fn start(&mut self, target: f64) {
        self.target = target.max(0.0);
        self.current = 0.0;
        self.clock.reset();
    }

    /// Snap straight to the target
    pub fn finish(&mut self) {
        self.current = self.target;
    }

    /// One reference frame of easing
    pub fn step(&mut self) {
        if self.is_finished() {
            self.current = self.target;
            return;
        }
        let delta = self.target - self.current;
        let advance = (delta * self.rate).max(self.min_step);
        self.current = (self.current + advance).min(self.target);
        if self.is_finished() {
            self.current = self.target;
        }
    }

    /// Advance by `dt` seconds of host time, returns the visible scale
    pub fn tick(&mut self, dt: f64) -> f64 {
        for _ in 0..self.clock.advance(dt) {
            if self.is_finished() {
                break;
            }
            self.step();
        }
        self.current
    }

    pub fn is_finished(&self) -> bool {
        (self.target - self.current).abs() <= self.epsilon
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn target(&self) -> f64 {
        self.target
    }
}

impl Default for ScaleAnimation {
    fn default() -> Self {
        Self::settled(1.0)
    }
}
