//! The driver-side contract of a cancellable hardware operation.
//!
//! Subsystems that own a peripheral (radio link, sensor port, motor
//! channel) expose each long-running sequence as an [`Operation`]: a
//! non-blocking end check plus a cancel hook. The core wraps one of
//! these in a task and polls it from the event loop.

/// Result of one non-blocking end check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationStatus {
    /// Not finished yet; poll again on a later loop iteration.
    Again,
    /// Finished successfully.
    Complete,
    /// Finished with an error (including a completed cancellation).
    Failed(OperationError),
}

/// Terminal failure reasons a driver can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationError {
    /// The peripheral did not respond in time.
    Timeout,
    /// No such device is present or it went away mid-operation.
    NoDevice,
    /// The peripheral answered with something unexpected.
    Protocol,
    /// The operation was torn down after a cancel request.
    Cancelled,
}

impl std::fmt::Display for OperationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "device timeout"),
            Self::NoDevice => write!(f, "no device"),
            Self::Protocol => write!(f, "protocol error"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::error::Error for OperationError {}

/// One outstanding asynchronous hardware sequence.
///
/// `status` must be non-blocking and safe to call repeatedly; progress
/// is made by the underlying driver (interrupts, timers), not by the
/// check itself. `cancel` requests early termination; the operation may
/// need further `status` calls to unwind (e.g. sending a disconnect
/// command and waiting for its acknowledgment) before it reports
/// `Failed(Cancelled)`.
pub trait Operation {
    fn status(&mut self) -> OperationStatus;
    fn cancel(&mut self);
}
