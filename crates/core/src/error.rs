use thiserror::Error;

/// Top-level error type used across the workspace.
#[derive(Debug, Error)]
pub enum PulseError {
    #[error("config error: {0}")]
    Config(String),

    #[error("device error: {0}")]
    Device(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

pub type Result<T, E = PulseError> = std::result::Result<T, E>;
