use std::io::Write;

use serde::Serialize;

use crate::error::Result;
use crate::sim::SessionReport;
use crate::tune::TrialRecord;

/// Summary statistics computed from a finished session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub plant: String,
    pub outcome: &'static str,
    pub trials: usize,
    pub samples: usize,
    pub iterations: usize,
    pub best_cost: f64,
    pub best_gain: GainSummary,
    /// Step sizes when the session stopped; absent when not tuning.
    pub final_delta: Option<[f64; 3]>,
    /// Trials cut short because their running cost exceeded the best cost.
    pub abandoned_trials: usize,
    /// One entry per trial, in order.
    pub history: Vec<TrialRecord>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct GainSummary {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl SessionSummary {
    /// Compute summary from a session report.
    ///
    /// `steps_per_trial` identifies early-abandoned trials in the history.
    pub fn from_report(report: &SessionReport, steps_per_trial: usize) -> Self {
        let last = report.history.last();
        SessionSummary {
            plant: report.plant.clone(),
            outcome: report.outcome.as_str(),
            trials: report.trials,
            samples: report.samples,
            iterations: last.map_or(0, |r| r.iteration),
            best_cost: report.best_cost,
            best_gain: GainSummary {
                kp: report.best_gain[0],
                ki: report.best_gain[1],
                kd: report.best_gain[2],
            },
            final_delta: last.map(|r| r.delta),
            abandoned_trials: report
                .history
                .iter()
                .filter(|r| r.steps <= steps_per_trial)
                .count(),
            history: report.history.clone(),
        }
    }
}

/// Write session summary as pretty JSON to a writer.
pub fn write_summary<W: Write>(writer: &mut W, summary: &SessionSummary) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, summary)?;
    writeln!(writer)?;
    Ok(())
}

/// Write session summary JSON to a file.
pub fn write_summary_file(path: &str, summary: &SessionSummary) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_summary(&mut file, summary)
}
