use tracing::{debug, info};

use super::driver::TrialDriver;
use super::plant::Plant;
use super::telemetry::{CostModel, SteerCommand};
use crate::control::SteeringController;
use crate::tune::{TrialRecord, TuneStatus};

// ---------------------------------------------------------------------------
// Session limits and report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionLimits {
    /// Forced exit for a tuning session that has not converged.
    pub max_trials: usize,
    /// Samples to run when the driver is not tuning.
    pub samples: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self { max_trials: 500, samples: 1000 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Converged,
    TrialLimit,
    SampleLimit,
}

impl SessionOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionOutcome::Converged => "converged",
            SessionOutcome::TrialLimit => "trial_limit",
            SessionOutcome::SampleLimit => "sample_limit",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionReport {
    pub plant: String,
    pub outcome: SessionOutcome,
    pub trials: usize,
    pub samples: usize,
    /// Tuned best gains, or the fixed gains when not tuning.
    pub best_gain: [f64; 3],
    /// Lowest trial cost, or the whole run's cost when not tuning.
    pub best_cost: f64,
    pub history: Vec<TrialRecord>,
}

// ---------------------------------------------------------------------------
// Session loop
// ---------------------------------------------------------------------------

/// Drive `plant` with `driver` until the tuner converges or a limit is hit.
pub fn run_session(
    driver: &mut TrialDriver,
    plant: &mut dyn Plant,
    limits: &SessionLimits,
) -> SessionReport {
    plant.reset();
    let mut samples = 0usize;
    let mut fixed_cost = 0.0;

    let outcome = if driver.is_tuning() {
        loop {
            let action = driver.handle_telemetry(&plant.observe());
            samples += 1;
            match action.trial_end {
                Some(end) => {
                    plant.reset();
                    if end.status.is_converged() {
                        break SessionOutcome::Converged;
                    }
                    if driver.trials() >= limits.max_trials {
                        break SessionOutcome::TrialLimit;
                    }
                }
                None => plant.apply(&action.command),
            }
        }
    } else {
        let cost = *driver.cost_model();
        let throttle = driver.throttle();
        fixed_cost = drive_with(driver.pid_mut(), plant, &cost, throttle, limits.samples);
        samples = limits.samples;
        SessionOutcome::SampleLimit
    };

    let (best_gain, best_cost): ([f64; 3], f64) = match driver.tuner() {
        Some(tuner) => (tuner.best_gain().into(), tuner.best_cost()),
        None => (driver.pid().gains().into(), fixed_cost),
    };

    info!(
        plant = plant.name(),
        outcome = outcome.as_str(),
        trials = driver.trials(),
        samples,
        best_cost,
        best_gain = ?best_gain,
        "session finished"
    );

    SessionReport {
        plant: plant.name().to_string(),
        outcome,
        trials: driver.trials(),
        samples,
        best_gain,
        best_cost,
        history: driver.history().to_vec(),
    }
}

/// Drive `plant` for `samples` steps with any steering controller and
/// return the accumulated cost. No tuning, no trial boundaries.
pub fn drive_with(
    controller: &mut dyn SteeringController,
    plant: &mut dyn Plant,
    cost: &CostModel,
    throttle: f64,
    samples: usize,
) -> f64 {
    debug!(controller = controller.name(), samples, "fixed-gain drive");
    let mut total = 0.0;
    for _ in 0..samples {
        let t = plant.observe();
        total += cost.sample_cost(&t);
        let output = controller.control(t.cte);
        plant.apply(&SteerCommand {
            steering_angle: output.clamp(-1.0, 1.0),
            throttle,
        });
    }
    total
}

/// Convenience wrapper: tune until convergence on an offline cost function,
/// one evaluation per trial.
///
/// Stops after `max_trials` evaluations when the search has not converged.
pub fn tune_offline<F>(driver: &mut TrialDriver, max_trials: usize, mut cost: F) -> TuneStatus
where
    F: FnMut(&nalgebra::Vector3<f64>) -> f64,
{
    let mut status = TuneStatus::Continue;
    for _ in 0..max_trials {
        let c = cost(&driver.pid().gains());
        status = driver.on_trial_end(c);
        if status.is_converged() {
            break;
        }
    }
    status
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::Pid;
    use crate::sim::plant::LanePlant;
    use crate::sim::telemetry::CostModel;
    use crate::tune::{Twiddle, TwiddleConfig};
    use nalgebra::Vector3;

    fn lane_cost() -> CostModel {
        // The plant holds speed constant; only lateral error matters here.
        CostModel { speed_weight: 0.0, angle_weight: 0.0, ..CostModel::default() }
    }

    #[test]
    fn fixed_gains_run_requested_samples() {
        let mut driver = TrialDriver::new(Pid::new(0.2, 0.0, 3.0), lane_cost());
        let mut plant = LanePlant::default();
        let limits = SessionLimits { max_trials: 10, samples: 300 };

        let report = run_session(&mut driver, &mut plant, &limits);

        assert_eq!(report.outcome, SessionOutcome::SampleLimit);
        assert_eq!(report.samples, 300);
        assert_eq!(report.trials, 0);
        assert_eq!(report.best_gain, [0.2, 0.0, 3.0]);
        assert!(report.best_cost > 0.0);
        assert!(report.history.is_empty());
    }

    /// Full lock toward the path whenever the offset exceeds a dead band.
    struct BangBang {
        band: f64,
    }

    impl SteeringController for BangBang {
        fn control(&mut self, error: f64) -> f64 {
            if error > self.band {
                -1.0
            } else if error < -self.band {
                1.0
            } else {
                0.0
            }
        }

        fn name(&self) -> &str {
            "BangBang"
        }
    }

    #[test]
    fn drive_with_accepts_any_controller() {
        let mut plant = LanePlant::default();
        let mut pid = Pid::new(0.2, 0.0, 3.0);
        let pid_cost = drive_with(&mut pid, &mut plant, &lane_cost(), 0.3, 200);

        plant.reset();
        let mut bang = BangBang { band: 0.05 };
        let bang_cost = drive_with(&mut bang, &mut plant, &lane_cost(), 0.3, 200);
        assert!(bang_cost.is_finite() && bang_cost > 0.0);

        plant.reset();
        let mut idle = BangBang { band: f64::INFINITY };
        let idle_cost = drive_with(&mut idle, &mut plant, &lane_cost(), 0.3, 200);
        assert!(idle_cost > pid_cost, "uncorrected drift {idle_cost} vs PID {pid_cost}");
        assert!(idle_cost > bang_cost);
    }

    #[test]
    fn fixed_session_cost_matches_direct_drive() {
        let mut driver = TrialDriver::new(Pid::new(0.2, 0.0, 3.0), lane_cost());
        let mut plant = LanePlant::default();
        let limits = SessionLimits { max_trials: 1, samples: 150 };
        let report = run_session(&mut driver, &mut plant, &limits);

        plant.reset();
        let mut pid = Pid::new(0.2, 0.0, 3.0);
        let direct = drive_with(&mut pid, &mut plant, &lane_cost(), 0.3, 150);
        assert!((report.best_cost - direct).abs() < 1e-9);
    }

    #[test]
    fn tuning_session_respects_trial_limit() {
        let config = TwiddleConfig {
            initial_gain: Vector3::new(0.2, 0.0, 3.0),
            initial_delta: Vector3::new(0.05, 0.001, 0.5),
            tolerance: 1e-6,
            steps_per_trial: 100,
        };
        let mut driver = TrialDriver::new(Pid::default(), lane_cost())
            .with_tuner(Twiddle::new(&config));
        let mut plant = LanePlant::default();
        let limits = SessionLimits { max_trials: 30, samples: 0 };

        let report = run_session(&mut driver, &mut plant, &limits);

        assert_eq!(report.outcome, SessionOutcome::TrialLimit);
        assert_eq!(report.trials, 30);
        assert_eq!(report.history.len(), 30);
        let first = report.history[0].cost;
        assert!(report.best_cost <= first);
        assert!(report.history.iter().all(|r| r.best_cost >= report.best_cost));
    }

    #[test]
    fn offline_tuning_converges_on_quadratic() {
        let config = TwiddleConfig::default();
        let mut driver =
            TrialDriver::new(Pid::default(), CostModel::default()).with_tuner(Twiddle::new(&config));
        let status = tune_offline(&mut driver, 10_000, |g| {
            (g[0] - 0.5).powi(2) + (g[1] + 1.0).powi(2) + (g[2] - 3.0).powi(2)
        });

        match status {
            TuneStatus::Converged { best_gain, .. } => {
                assert!((best_gain[0] - 0.5).abs() < 0.01);
                assert!((best_gain[1] + 1.0).abs() < 0.01);
                assert!((best_gain[2] - 3.0).abs() < 0.01);
            }
            TuneStatus::Continue => panic!("expected convergence"),
        }
    }
}
