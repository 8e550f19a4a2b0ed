pub mod config;
pub mod control;
pub mod error;
pub mod io;
pub mod sim;
pub mod tune;

pub use control::{Pid, SteeringController};
pub use error::{ConfigError, Error};
pub use sim::{run_session, LanePlant, Plant, TrialDriver};
pub use tune::{Phase, TuneStatus, Twiddle, TwiddleConfig};
