use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use pid_twiddle::config::{AppConfig, Args};
use pid_twiddle::io::{self, SessionSummary};
use pid_twiddle::sim::{self, LanePlant, SessionOutcome, SessionReport, TrialDriver};
use pid_twiddle::{Pid, Twiddle};

fn main() {
    let args = Args::parse();

    let filter = match args.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match run(&args) {
        Ok(()) => 0,
        Err(e) => {
            error!("{e}");
            eprintln!("[Error] {e}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(args: &Args) -> pid_twiddle::error::Result<()> {
    let config = AppConfig::from_args(args)?;

    info!(
        kp = config.gain[0],
        ki = config.gain[1],
        kd = config.gain[2],
        "initializing steering PID"
    );

    let mut driver = TrialDriver::new(Pid::from_gains(&config.gain), config.cost)
        .with_throttle(config.throttle);
    if let Some(tw) = &config.twiddle {
        info!(
            dp = tw.initial_delta[0],
            di = tw.initial_delta[1],
            dd = tw.initial_delta[2],
            n_step = tw.steps_per_trial,
            "twiddle tuning enabled"
        );
        driver = driver.with_tuner(Twiddle::new(tw));
    }

    let mut plant = LanePlant::new(1.0, config.cost.reference_speed);
    let report = sim::run_session(&mut driver, &mut plant, &config.limits);

    let steps_per_trial = config.twiddle.as_ref().map_or(0, |tw| tw.steps_per_trial);
    let summary = SessionSummary::from_report(&report, steps_per_trial);
    print_report(&report, &summary);

    if let Some(path) = &config.history_path {
        io::write_history_file(path, &report.history)?;
        info!(path = %path, "history written");
    }
    if let Some(path) = &config.summary_path {
        io::write_summary_file(path, &summary)?;
        info!(path = %path, "summary written");
    }
    Ok(())
}

fn print_report(report: &SessionReport, summary: &SessionSummary) {
    println!();
    println!("====================================================================");
    println!("  PID STEERING SESSION — {}", report.plant);
    println!("====================================================================");
    println!();

    if !report.history.is_empty() {
        println!(
            "  {:>6}  {:>5}  {:>12}  {:>12}  {:>3}  {:>7}  {:>8}  {:>8}  {:>8}",
            "trial", "steps", "cost", "best", "idx", "phase", "kp", "ki", "kd"
        );
        println!("  {}", "─".repeat(86));
        let sample_interval = (report.history.len() / 30).max(1);
        for (i, r) in report.history.iter().enumerate() {
            if i % sample_interval != 0 && i != report.history.len() - 1 {
                continue;
            }
            println!(
                "  {:>6}  {:>5}  {:>12.4}  {:>12.4}  {:>3}  {:>7}  {:>8.4}  {:>8.4}  {:>8.4}",
                r.trial,
                r.steps,
                r.cost,
                r.best_cost,
                r.gain_index,
                r.phase.map_or("-", |p| p.as_str()),
                r.gain[0],
                r.gain[1],
                r.gain[2],
            );
        }
        println!();
    }

    let verdict = match report.outcome {
        SessionOutcome::Converged => "CONVERGED",
        SessionOutcome::TrialLimit => "TRIAL LIMIT",
        SessionOutcome::SampleLimit => "FIXED GAINS",
    };
    println!("  Result:        {verdict}");
    println!(
        "  Best gains:    kp {:.6}   ki {:.6}   kd {:.6}",
        summary.best_gain.kp, summary.best_gain.ki, summary.best_gain.kd
    );
    println!("  Best cost:     {:.4}", summary.best_cost);
    println!(
        "  Trials:        {} ({} abandoned early)",
        summary.trials, summary.abandoned_trials
    );
    println!("  Samples:       {}", summary.samples);
    if let Some(d) = summary.final_delta {
        println!("  Final deltas:  dp {:.6}   di {:.6}   dd {:.6}", d[0], d[1], d[2]);
    }
    println!("====================================================================");
    println!();
}
