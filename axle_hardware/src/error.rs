use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("encoder timeout")]
    Timeout,
    #[error("device not attached")]
    NotAttached,
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
