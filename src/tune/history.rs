use serde::Serialize;

use super::twiddle::{Phase, Twiddle};

/// Snapshot of the tuner taken right after a trial cost was consumed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialRecord {
    /// 1-based trial number.
    pub trial: usize,
    /// Cost reported for the trial that just ended.
    pub cost: f64,
    /// Samples the trial ran before it ended (early-abandoned trials are shorter).
    pub steps: usize,
    pub best_cost: f64,
    /// Gains the next trial will run with.
    pub gain: [f64; 3],
    pub best_gain: [f64; 3],
    pub delta: [f64; 3],
    pub gain_index: usize,
    pub phase: Option<Phase>,
    pub iteration: usize,
}

impl TrialRecord {
    pub fn capture(trial: usize, cost: f64, steps: usize, tuner: &Twiddle) -> Self {
        Self {
            trial,
            cost,
            steps,
            best_cost: tuner.best_cost(),
            gain: tuner.gain().into(),
            best_gain: tuner.best_gain().into(),
            delta: tuner.delta().into(),
            gain_index: tuner.gain_index(),
            phase: tuner.phase(),
            iteration: tuner.iteration_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::Pid;
    use crate::tune::TwiddleConfig;

    #[test]
    fn capture_reflects_tuner_after_update() {
        let config = TwiddleConfig::default();
        let mut pid = Pid::from_gains(&config.initial_gain);
        let mut tw = Twiddle::new(&config);
        tw.on_trial_end(7.5, &mut pid);

        let rec = TrialRecord::capture(1, 7.5, 51, &tw);
        assert_eq!(rec.trial, 1);
        assert_eq!(rec.best_cost, 7.5);
        assert_eq!(rec.gain, [1.0, 0.0, 0.0]);
        assert_eq!(rec.best_gain, [0.0, 0.0, 0.0]);
        assert_eq!(rec.phase, Some(Phase::Ascent));
    }
}
