use thiserror::Error;

/// Invalid command-line configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{group} must be given together or not at all")]
    PartialGroup { group: &'static str },

    #[error("{option} only works when twiddle tuning is enabled")]
    RequiresTwiddle { option: &'static str },

    #[error("{name} must be a finite number, got {value}")]
    NotFinite { name: &'static str, value: f64 },

    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("tolerance must be positive, got {0}")]
    Tolerance(f64),

    #[error("{name} must be at least 1")]
    ZeroCount { name: &'static str },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
