//! Annealing schedules for the learning rate and neighborhood radius.

use crate::error::{Result, SomError};

/// A replaceable decay law: `(start, end, step, total_steps) -> value`.
pub type DecayFn = fn(f64, f64, usize, usize) -> f64;

/// Exponential decay from `start` to `end` over `total_steps` steps.
///
/// `value(i) = start * exp(-rate * i)` with
/// `rate = -ln(end / start) / total_steps`, so `value(0) = start` and
/// `value(total_steps) = end`.
pub fn exponential_decay(start: f64, end: f64, step: usize, total_steps: usize) -> f64 {
    if total_steps == 0 {
        return start;
    }
    let rate = -(end / start).ln() / total_steps as f64;
    start * (-rate * step as f64).exp()
}

/// A stateful annealing process.
///
/// The scheduler advances only when the cumulative number of consumed
/// samples is an exact multiple of `step_size`; between multiples, `step`
/// returns the previously computed value unchanged. This makes it a process
/// rather than a pure function: invoking it with every intermediate sample
/// count is the expected usage.
#[derive(Debug, Clone)]
pub struct Scheduler {
    start_val: f64,
    end_val: f64,
    step_size: usize,
    total_steps: usize,
    current_step: usize,
    current_value: f64,
    decay: DecayFn,
}

impl Scheduler {
    /// Creates a scheduler decaying from `start_val` to `end_val`, advancing
    /// every `step_size` samples over `n_samples * n_epochs` total samples.
    pub fn new(
        start_val: f64,
        end_val: f64,
        step_size: usize,
        n_samples: usize,
        n_epochs: usize,
    ) -> Result<Self> {
        if step_size == 0 {
            return Err(SomError::InvalidArgument(
                "Scheduler step size must be non-zero".to_string(),
            ));
        }
        if start_val <= 0.0 || end_val <= 0.0 {
            return Err(SomError::InvalidArgument(format!(
                "Exponential decay requires positive endpoints, got {} -> {}",
                start_val, end_val
            )));
        }

        Ok(Self {
            start_val,
            end_val,
            step_size,
            total_steps: n_samples * n_epochs / step_size,
            current_step: 0,
            current_value: start_val,
            decay: exponential_decay,
        })
    }

    /// Replaces the decay law.
    pub fn with_decay_fn(mut self, decay: DecayFn) -> Self {
        self.decay = decay;
        self
    }

    /// Advances the schedule for the given cumulative sample count and
    /// returns the value now in effect.
    pub fn step(&mut self, total_samples_consumed: usize) -> f64 {
        if total_samples_consumed % self.step_size == 0 {
            self.current_value = (self.decay)(
                self.start_val,
                self.end_val,
                self.current_step,
                self.total_steps,
            );
            self.current_step += 1;
        }
        self.current_value
    }

    /// The most recently computed value.
    #[inline]
    pub fn current_value(&self) -> f64 {
        self.current_value
    }

    /// Total number of scheduled decay steps.
    #[inline]
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }
}
