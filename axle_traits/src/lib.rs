//! Hardware seam traits for the axle stack.
//!
//! Everything that touches a real peripheral goes through one of these
//! traits so the core stays hardware-agnostic and fully testable on a
//! host machine.

pub mod clock;
pub mod operation;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use operation::{Operation, OperationError, OperationStatus};

/// Source of periodic absolute angle samples for one motor shaft.
///
/// Implementations return the absolute shaft position in millidegrees
/// as an `i64` so that many rotations never overflow at the seam; the
/// core folds this into its own overflow-safe angle representation.
pub trait AngleSensor {
    fn read(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<i64, Box<dyn std::error::Error + Send + Sync>>;
}

/// Low-level DC motor output.
pub trait MotorDriver {
    /// Apply a fixed voltage in millivolts (sign selects direction).
    fn set_voltage(&mut self, millivolts: i32)
    -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    /// Let the motor spin freely.
    fn coast(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    /// Short the windings to brake passively.
    fn brake(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
