use clap::Parser;
use nalgebra::Vector3;

use crate::error::ConfigError;
use crate::sim::{CostModel, SessionLimits, DEFAULT_THROTTLE};
use crate::tune::TwiddleConfig;

/// Gains used when none are given on the command line.
pub const PRETUNED_GAIN: [f64; 3] = [0.0547, 0.0014, 0.7];

/// PID steering controller for a lane-keeping vehicle, with optional twiddle
/// gain tuning over repeated trials.
///
/// Running without arguments drives with the pre-tuned gains.
#[derive(Debug, Clone, Parser)]
#[command(name = "pid-twiddle", version, about)]
pub struct Args {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Initial proportional gain (with --ki and --kd)
    #[arg(long, value_name = "FLOAT", allow_negative_numbers = true)]
    pub kp: Option<f64>,

    /// Initial integral gain (with --kp and --kd)
    #[arg(long, value_name = "FLOAT", allow_negative_numbers = true)]
    pub ki: Option<f64>,

    /// Initial derivative gain (with --kp and --ki)
    #[arg(long, value_name = "FLOAT", allow_negative_numbers = true)]
    pub kd: Option<f64>,

    /// Enable twiddle mode to tune the gains
    #[arg(short, long)]
    pub twiddle: bool,

    /// Samples per twiddle trial
    #[arg(long = "n-step", value_name = "INT")]
    pub n_step: Option<usize>,

    /// Initial kp step size (with --di and --dd)
    #[arg(long, value_name = "FLOAT")]
    pub dp: Option<f64>,

    /// Initial ki step size (with --dp and --dd)
    #[arg(long, value_name = "FLOAT")]
    pub di: Option<f64>,

    /// Initial kd step size (with --dp and --di)
    #[arg(long, value_name = "FLOAT")]
    pub dd: Option<f64>,

    /// Stop tuning once the step sizes sum below this value
    #[arg(long, default_value_t = 0.005)]
    pub tolerance: f64,

    /// Stop tuning after this many trials even without convergence
    #[arg(long, default_value_t = 500)]
    pub max_trials: usize,

    /// Samples to drive when not tuning
    #[arg(long, default_value_t = 1000)]
    pub samples: usize,

    /// Target speed used by the speed term of the cost
    #[arg(long, default_value_t = 30.0)]
    pub reference_speed: f64,

    /// Constant throttle sent with every steering command
    #[arg(long, default_value_t = DEFAULT_THROTTLE)]
    pub throttle: f64,

    /// Write per-trial tuning history as CSV
    #[arg(long, value_name = "PATH")]
    pub history: Option<String>,

    /// Write the session summary as JSON
    #[arg(long, value_name = "PATH")]
    pub summary: Option<String>,
}

/// Validated runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub gain: Vector3<f64>,
    /// `Some` when tuning is enabled.
    pub twiddle: Option<TwiddleConfig>,
    pub limits: SessionLimits,
    pub cost: CostModel,
    pub throttle: f64,
    pub history_path: Option<String>,
    pub summary_path: Option<String>,
}

impl AppConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let gain = match all_or_none("kp, ki, kd", [args.kp, args.ki, args.kd])? {
            Some(g) => finite_vec(["kp", "ki", "kd"], g)?,
            None => Vector3::from(PRETUNED_GAIN),
        };

        let delta = all_or_none("dp, di, dd", [args.dp, args.di, args.dd])?
            .map(|d| positive_vec(["dp", "di", "dd"], d))
            .transpose()?;

        if !args.twiddle {
            if args.n_step.is_some() {
                return Err(ConfigError::RequiresTwiddle { option: "n-step" });
            }
            if delta.is_some() {
                return Err(ConfigError::RequiresTwiddle { option: "dp, di, dd" });
            }
        }

        if !(args.tolerance.is_finite() && args.tolerance > 0.0) {
            return Err(ConfigError::Tolerance(args.tolerance));
        }
        finite("reference-speed", args.reference_speed)?;
        finite("throttle", args.throttle)?;
        if args.max_trials == 0 {
            return Err(ConfigError::ZeroCount { name: "max-trials" });
        }

        let twiddle = if args.twiddle {
            let defaults = TwiddleConfig::default();
            let steps_per_trial = args.n_step.unwrap_or(defaults.steps_per_trial);
            if steps_per_trial == 0 {
                return Err(ConfigError::ZeroCount { name: "n-step" });
            }
            Some(TwiddleConfig {
                initial_gain: gain,
                initial_delta: delta.unwrap_or(defaults.initial_delta),
                tolerance: args.tolerance,
                steps_per_trial,
            })
        } else {
            None
        };

        Ok(AppConfig {
            gain,
            twiddle,
            limits: SessionLimits { max_trials: args.max_trials, samples: args.samples },
            cost: CostModel { reference_speed: args.reference_speed, ..CostModel::default() },
            throttle: args.throttle,
            history_path: args.history.clone(),
            summary_path: args.summary.clone(),
        })
    }
}

fn all_or_none(
    group: &'static str,
    values: [Option<f64>; 3],
) -> Result<Option<[f64; 3]>, ConfigError> {
    match values {
        [Some(a), Some(b), Some(c)] => Ok(Some([a, b, c])),
        [None, None, None] => Ok(None),
        _ => Err(ConfigError::PartialGroup { group }),
    }
}

fn finite(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NotFinite { name, value })
    }
}

fn positive_vec(names: [&'static str; 3], v: [f64; 3]) -> Result<Vector3<f64>, ConfigError> {
    let v = finite_vec(names, v)?;
    for (name, value) in names.into_iter().zip(v.iter().copied()) {
        if value <= 0.0 {
            return Err(ConfigError::NonPositive { name, value });
        }
    }
    Ok(v)
}

fn finite_vec(names: [&'static str; 3], v: [f64; 3]) -> Result<Vector3<f64>, ConfigError> {
    Ok(Vector3::new(
        finite(names[0], v[0])?,
        finite(names[1], v[1])?,
        finite(names[2], v[2])?,
    ))
}
