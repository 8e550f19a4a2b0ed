use std::io::Write;

use crate::error::Result;
use crate::tune::TrialRecord;

/// Write tuning history to CSV format.
///
/// Columns: trial, steps, cost, best_cost, iteration, gain_index, phase,
///          kp, ki, kd, dp, di, dd, best_kp, best_ki, best_kd
pub fn write_history<W: Write>(writer: &mut W, history: &[TrialRecord]) -> Result<()> {
    writeln!(
        writer,
        "trial,steps,cost,best_cost,iteration,gain_index,phase,\
         kp,ki,kd,dp,di,dd,best_kp,best_ki,best_kd"
    )?;

    for r in history {
        let phase = r.phase.map_or("", |p| p.as_str());
        writeln!(
            writer,
            "{},{},{:.6},{:.6},{},{},{},\
             {:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6}",
            r.trial, r.steps, r.cost, r.best_cost, r.iteration, r.gain_index, phase,
            r.gain[0], r.gain[1], r.gain[2],
            r.delta[0], r.delta[1], r.delta[2],
            r.best_gain[0], r.best_gain[1], r.best_gain[2],
        )?;
    }

    Ok(())
}

/// Write tuning history to a CSV file at the given path.
pub fn write_history_file(path: &str, history: &[TrialRecord]) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_history(&mut file, history)
}
