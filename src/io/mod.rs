pub mod csv;
pub mod json;

pub use json::{SessionSummary, write_summary, write_summary_file};
pub use csv::{write_history, write_history_file};
