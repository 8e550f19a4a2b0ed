use nalgebra::Vector3;
use serde::Serialize;
use tracing::{debug, info};

use crate::control::Pid;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Step growth applied to a dimension whose perturbation improved the cost.
pub const DELTA_GROW: f64 = 1.1;
/// Step shrink applied when neither direction improved the cost.
pub const DELTA_SHRINK: f64 = 0.9;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Scalar inputs accepted when a tuning session is created.
#[derive(Debug, Clone, PartialEq)]
pub struct TwiddleConfig {
    /// Starting gains `[kp, ki, kd]`.
    pub initial_gain: Vector3<f64>,
    /// Starting step size for each gain.
    pub initial_delta: Vector3<f64>,
    /// Search stops once the deltas sum below this value.
    pub tolerance: f64,
    /// Samples per trial; consumed by the trial driver.
    pub steps_per_trial: usize,
}

impl Default for TwiddleConfig {
    fn default() -> Self {
        Self {
            initial_gain: Vector3::zeros(),
            initial_delta: Vector3::new(1.0, 1.0, 1.0),
            tolerance: 0.005,
            steps_per_trial: 50,
        }
    }
}

// ---------------------------------------------------------------------------
// State machine types
// ---------------------------------------------------------------------------

/// Direction of the perturbation currently under evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// The current gain was just increased by its delta.
    Ascent,
    /// The current gain was just decreased below its original value.
    Descent,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Ascent => "ascent",
            Phase::Descent => "descent",
        }
    }
}

/// Outcome of handing a trial cost to the tuner.
#[derive(Debug, Clone, PartialEq)]
pub enum TuneStatus {
    Continue,
    Converged {
        best_gain: Vector3<f64>,
        best_cost: f64,
    },
}

impl TuneStatus {
    pub fn is_converged(&self) -> bool {
        matches!(self, TuneStatus::Converged { .. })
    }
}

// ---------------------------------------------------------------------------
// Twiddle tuner
// ---------------------------------------------------------------------------

/// Coordinate ascent/descent over the three PID gains.
///
/// One gain is perturbed per trial. The cost of the trial just finished
/// decides the fate of that perturbation: keep it and grow the step, try the
/// opposite direction, or revert and shrink the step.
#[derive(Debug, Clone)]
pub struct Twiddle {
    gain: Vector3<f64>,
    best_gain: Vector3<f64>,
    delta: Vector3<f64>,
    gain_index: usize,
    best_cost: f64,
    /// `None` until the first perturbation has been applied.
    phase: Option<Phase>,
    iteration_count: usize,
    converged: bool,
    tolerance: f64,
    steps_per_trial: usize,
}

impl Twiddle {
    pub fn new(config: &TwiddleConfig) -> Self {
        Self {
            gain: config.initial_gain,
            best_gain: config.initial_gain,
            delta: config.initial_delta,
            gain_index: 0,
            best_cost: f64::MAX,
            phase: None,
            iteration_count: 0,
            converged: false,
            tolerance: config.tolerance,
            steps_per_trial: config.steps_per_trial,
        }
    }

    /// Consume the cost of the trial that just ended and reconfigure `pid`
    /// for the next one.
    ///
    /// Must be called exactly once per trial, never mid-trial.
    pub fn on_trial_end(&mut self, cost: f64, pid: &mut Pid) -> TuneStatus {
        let Some(phase) = self.phase else {
            self.best_cost = cost;
            self.best_gain = self.gain;
            self.gain[self.gain_index] += self.delta[self.gain_index];
            pid.set_gains(&self.gain);
            self.phase = Some(Phase::Ascent);
            info!(
                cost,
                gain = ?self.gain.as_slice(),
                delta = ?self.delta.as_slice(),
                "twiddle initialized"
            );
            return TuneStatus::Continue;
        };

        if self.delta.sum() < self.tolerance {
            if !self.converged {
                self.converged = true;
                info!(
                    best_cost = self.best_cost,
                    best_gain = ?self.best_gain.as_slice(),
                    iterations = self.iteration_count,
                    "twiddle converged"
                );
            }
            return TuneStatus::Converged {
                best_gain: self.best_gain,
                best_cost: self.best_cost,
            };
        }

        let i = self.gain_index;
        let improved = cost < self.best_cost;
        if improved {
            self.best_cost = cost;
            self.best_gain = self.gain;
            self.delta[i] *= DELTA_GROW;
        }

        match phase {
            Phase::Ascent if !improved => {
                self.gain[i] -= 2.0 * self.delta[i];
                pid.set_gains(&self.gain);
                self.phase = Some(Phase::Descent);
                debug!(gain_index = i, cost, "ascent rejected, trying descent");
                return TuneStatus::Continue;
            }
            Phase::Ascent => {
                debug!(gain_index = i, cost, "ascent accepted");
            }
            Phase::Descent if improved => {
                debug!(gain_index = i, cost, "descent accepted");
            }
            Phase::Descent => {
                self.gain[i] += self.delta[i];
                self.delta[i] *= DELTA_SHRINK;
                debug!(gain_index = i, cost, delta = self.delta[i], "descent rejected, shrinking step");
            }
        }

        self.advance(pid);
        TuneStatus::Continue
    }

    /// Move to the next gain and start its ascent.
    fn advance(&mut self, pid: &mut Pid) {
        self.gain_index = (self.gain_index + 1) % 3;
        self.gain[self.gain_index] += self.delta[self.gain_index];
        pid.set_gains(&self.gain);
        self.phase = Some(Phase::Ascent);
        self.iteration_count += 1;
    }

    pub fn gain(&self) -> Vector3<f64> {
        self.gain
    }

    pub fn best_gain(&self) -> Vector3<f64> {
        self.best_gain
    }

    pub fn delta(&self) -> Vector3<f64> {
        self.delta
    }

    pub fn gain_index(&self) -> usize {
        self.gain_index
    }

    /// Lowest cost seen so far; `f64::MAX` before the first trial.
    pub fn best_cost(&self) -> f64 {
        self.best_cost
    }

    pub fn phase(&self) -> Option<Phase> {
        self.phase
    }

    pub fn is_initialized(&self) -> bool {
        self.phase.is_some()
    }

    pub fn is_converged(&self) -> bool {
        self.converged
    }

    pub fn iteration_count(&self) -> usize {
        self.iteration_count
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn steps_per_trial(&self) -> usize {
        self.steps_per_trial
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
