use thiserror::Error;

/// Typed errors surfaced by the axle core.
///
/// "Still running" is never an error; in-progress work is reported
/// through status enums (`TaskStatus::Running`, `OperationStatus::Again`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AxleError {
    #[error("operation timed out")]
    Timeout,
    #[error("resource is busy with another task")]
    Busy,
    #[error("no device")]
    NoDevice,
    #[error("invalid argument: {0}")]
    InvalidArg(&'static str),
    #[error("cancelled")]
    Cancelled,
    #[error("protocol error")]
    Protocol,
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("io error: {0}")]
    Io(String),
}

impl From<axle_traits::OperationError> for AxleError {
    fn from(e: axle_traits::OperationError) -> Self {
        use axle_traits::OperationError;
        match e {
            OperationError::Timeout => Self::Timeout,
            OperationError::NoDevice => Self::NoDevice,
            OperationError::Protocol => Self::Protocol,
            OperationError::Cancelled => Self::Cancelled,
        }
    }
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
