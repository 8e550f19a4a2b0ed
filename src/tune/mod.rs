pub mod history;
pub mod twiddle;

pub use history::TrialRecord;
pub use twiddle::{Phase, TuneStatus, Twiddle, TwiddleConfig, DELTA_GROW, DELTA_SHRINK};
