pub mod driver;
pub mod plant;
pub mod runner;
pub mod telemetry;

pub use driver::{DriveAction, TrialDriver, TrialEnd, DEFAULT_THROTTLE};
pub use plant::{LanePlant, Plant};
pub use runner::{drive_with, run_session, tune_offline, SessionLimits, SessionOutcome, SessionReport};
pub use telemetry::{CostModel, SteerCommand, Telemetry};
