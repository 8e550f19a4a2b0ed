use tracing::{debug, trace};

use super::telemetry::{CostModel, SteerCommand, Telemetry};
use crate::control::Pid;
use crate::tune::{TrialRecord, TuneStatus, Twiddle};

/// Throttle sent with every steering command unless overridden.
pub const DEFAULT_THROTTLE: f64 = 0.3;

// ---------------------------------------------------------------------------
// Driver outputs
// ---------------------------------------------------------------------------

/// A trial boundary reached while handling a sample.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialEnd {
    pub cost: f64,
    pub steps: usize,
    pub status: TuneStatus,
}

/// What the caller must do after handing a sample to the driver.
#[derive(Debug, Clone, PartialEq)]
pub struct DriveAction {
    pub command: SteerCommand,
    /// Set when the sample closed a trial. The caller must then reset the
    /// controlled process to its starting condition.
    pub trial_end: Option<TrialEnd>,
}

// ---------------------------------------------------------------------------
// Trial driver
// ---------------------------------------------------------------------------

/// Owns the controller and, when tuning, the tuner. All per-sample and
/// per-trial entry points go through here.
#[derive(Debug, Clone)]
pub struct TrialDriver {
    pid: Pid,
    tuner: Option<Twiddle>,
    cost_model: CostModel,
    throttle: f64,
    step: usize,
    trial_cost: f64,
    trials: usize,
    history: Vec<TrialRecord>,
}

impl TrialDriver {
    /// Fixed-gain driver: the controller runs, nothing is tuned.
    pub fn new(pid: Pid, cost_model: CostModel) -> Self {
        Self {
            pid,
            tuner: None,
            cost_model,
            throttle: DEFAULT_THROTTLE,
            step: 0,
            trial_cost: 0.0,
            trials: 0,
            history: Vec::new(),
        }
    }

    /// Enable tuning. The controller is re-initialized with the tuner's
    /// starting gains.
    pub fn with_tuner(mut self, tuner: Twiddle) -> Self {
        self.pid.set_gains(&tuner.gain());
        self.tuner = Some(tuner);
        self
    }

    pub fn with_throttle(mut self, throttle: f64) -> Self {
        self.throttle = throttle;
        self
    }

    /// Per-sample entry point: update the controller and return its raw output.
    pub fn on_sample(&mut self, error: f64) -> f64 {
        self.pid.update_error(error);
        self.pid.compute_output()
    }

    /// Per-trial entry point: hand the accumulated cost to the tuner.
    ///
    /// Resetting the step counter and cost accumulator is left to the caller;
    /// `handle_telemetry` does both. Without a tuner this always continues.
    pub fn on_trial_end(&mut self, cost: f64) -> TuneStatus {
        let Some(tuner) = self.tuner.as_mut() else {
            return TuneStatus::Continue;
        };
        let status = tuner.on_trial_end(cost, &mut self.pid);
        self.trials += 1;
        let record = TrialRecord::capture(self.trials, cost, self.step, tuner);
        debug!(
            trial = record.trial,
            cost,
            best_cost = record.best_cost,
            gain_index = record.gain_index,
            gain = ?record.gain,
            delta = ?record.delta,
            "trial finished"
        );
        self.history.push(record);
        status
    }

    /// Handle one telemetry sample end to end.
    ///
    /// When tuning, a trial ends once its step budget is exhausted or its
    /// running cost already exceeds the best known cost. The sample that
    /// closes a trial belongs to the old process state, so it is not fed to
    /// the freshly configured controller and a neutral command is returned.
    pub fn handle_telemetry(&mut self, t: &Telemetry) -> DriveAction {
        self.step += 1;
        self.trial_cost += self.cost_model.sample_cost(t);

        let trial_over = match &self.tuner {
            Some(tuner) => {
                self.step > tuner.steps_per_trial() || self.trial_cost > tuner.best_cost()
            }
            None => false,
        };

        if trial_over {
            let cost = self.trial_cost;
            let steps = self.step;
            let status = self.on_trial_end(cost);
            self.step = 0;
            self.trial_cost = 0.0;
            return DriveAction {
                command: SteerCommand { steering_angle: 0.0, throttle: self.throttle },
                trial_end: Some(TrialEnd { cost, steps, status }),
            };
        }

        let output = self.on_sample(t.cte);
        trace!(step = self.step, cte = t.cte, output, "sample");
        DriveAction {
            command: SteerCommand {
                steering_angle: output.clamp(-1.0, 1.0),
                throttle: self.throttle,
            },
            trial_end: None,
        }
    }

    pub fn pid(&self) -> &Pid {
        &self.pid
    }

    pub fn pid_mut(&mut self) -> &mut Pid {
        &mut self.pid
    }

    pub fn cost_model(&self) -> &CostModel {
        &self.cost_model
    }

    pub fn throttle(&self) -> f64 {
        self.throttle
    }

    pub fn tuner(&self) -> Option<&Twiddle> {
        self.tuner.as_ref()
    }

    pub fn is_tuning(&self) -> bool {
        self.tuner.is_some()
    }

    /// Samples seen in the current trial.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Cost accumulated in the current trial.
    pub fn trial_cost(&self) -> f64 {
        self.trial_cost
    }

    pub fn trials(&self) -> usize {
        self.trials
    }

    pub fn history(&self) -> &[TrialRecord] {
        &self.history
    }

    pub fn into_history(self) -> Vec<TrialRecord> {
        self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tune::TwiddleConfig;
    use nalgebra::Vector3;

    fn sample(cte: f64) -> Telemetry {
        Telemetry { cte, speed: 30.0, steering_angle: 0.0 }
    }

    fn tuning_driver(steps: usize) -> TrialDriver {
        let config = TwiddleConfig {
            initial_gain: Vector3::new(0.2, 0.0, 3.0),
            initial_delta: Vector3::new(0.1, 0.001, 1.0),
            tolerance: 0.005,
            steps_per_trial: steps,
        };
        TrialDriver::new(Pid::default(), CostModel::default()).with_tuner(Twiddle::new(&config))
    }

    #[test]
    fn fixed_gain_driver_never_ends_trials() {
        let mut driver = TrialDriver::new(Pid::new(0.1, 0.0, 0.0), CostModel::default());
        for _ in 0..500 {
            let action = driver.handle_telemetry(&sample(1.0));
            assert!(action.trial_end.is_none());
        }
        assert_eq!(driver.step(), 500);
        assert!((driver.trial_cost() - 500.0).abs() < 1e-9);
        assert_eq!(driver.on_trial_end(1.0), TuneStatus::Continue);
        assert!(driver.history().is_empty());
    }

    #[test]
    fn command_is_clamped_to_unit_range() {
        let mut driver = TrialDriver::new(Pid::new(10.0, 0.0, 0.0), CostModel::default())
            .with_throttle(0.5);
        let action = driver.handle_telemetry(&sample(2.0));
        assert_eq!(action.command.steering_angle, -1.0);
        assert_eq!(action.command.throttle, 0.5);

        let action = driver.handle_telemetry(&sample(-2.0));
        assert_eq!(action.command.steering_angle, 1.0);
    }

    #[test]
    fn trial_ends_after_step_budget() {
        let mut driver = tuning_driver(5);
        assert_eq!(driver.pid().gains(), Vector3::new(0.2, 0.0, 3.0));

        for _ in 0..5 {
            assert!(driver.handle_telemetry(&sample(0.1)).trial_end.is_none());
        }
        let action = driver.handle_telemetry(&sample(0.1));
        let end = action.trial_end.expect("sixth sample closes the trial");
        assert_eq!(end.steps, 6);
        assert!((end.cost - 6.0 * 0.01).abs() < 1e-12);
        assert_eq!(end.status, TuneStatus::Continue);
        assert_eq!(action.command.steering_angle, 0.0);

        assert_eq!(driver.step(), 0);
        assert_eq!(driver.trial_cost(), 0.0);
        assert_eq!(driver.trials(), 1);
        assert!((driver.pid().kp - 0.3).abs() < 1e-12, "first perturbation applied");
        assert_eq!(driver.pid().p_error(), 0.0);
    }

    #[test]
    fn trial_abandoned_once_cost_exceeds_best() {
        let mut driver = tuning_driver(5);
        for _ in 0..6 {
            driver.handle_telemetry(&sample(0.1));
        }
        // Best cost is 0.06; a single large error overshoots it.
        let end = driver
            .handle_telemetry(&sample(1.0))
            .trial_end
            .expect("early abandon");
        assert_eq!(end.steps, 1);
        assert!((end.cost - 1.0).abs() < 1e-12);
        assert_eq!(driver.history().len(), 2);
        assert_eq!(driver.history()[1].steps, 1);
    }
}
