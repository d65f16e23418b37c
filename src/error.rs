use std::io;
use thiserror::Error;

/// Custom error type for the poolwatch dashboard
#[derive(Error, Debug)]
pub enum PoolwatchError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid pool name: {0:?}")]
    InvalidPoolName(String),

    #[error("Unknown pool: {0}")]
    UnknownPool(String),

    #[error("Invalid device: {0:?}")]
    InvalidDevice(String),

    #[error("Invalid locate state: {0:?} (expected \"on\" or \"off\")")]
    InvalidLocateState(String),

    #[error("Usage command failed: {0}")]
    UsageCommand(String),

    #[error("Usage listing parse error: {0}")]
    UsageParse(String),

    #[error("Locate backend error: {0}")]
    Locate(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for poolwatch
pub type Result<T> = std::result::Result<T, PoolwatchError>;

impl PoolwatchError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        PoolwatchError::Config(msg.into())
    }

    pub fn usage_command<S: Into<String>>(msg: S) -> Self {
        PoolwatchError::UsageCommand(msg.into())
    }

    pub fn usage_parse<S: Into<String>>(msg: S) -> Self {
        PoolwatchError::UsageParse(msg.into())
    }

    pub fn locate<S: Into<String>>(msg: S) -> Self {
        PoolwatchError::Locate(msg.into())
    }

    pub fn render<S: Into<String>>(msg: S) -> Self {
        PoolwatchError::Render(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        PoolwatchError::Other(msg.into())
    }

    /// Whether the error was caused by client input rather than the backend.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PoolwatchError::InvalidPoolName(_)
                | PoolwatchError::UnknownPool(_)
                | PoolwatchError::InvalidDevice(_)
                | PoolwatchError::InvalidLocateState(_)
        )
    }

    /// HTTP status code used when the error reaches the request boundary.
    pub fn status_code(&self) -> u16 {
        if self.is_validation() {
            400
        } else {
            500
        }
    }
}
