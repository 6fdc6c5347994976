//! Test and helper mocks for axle_core

use std::time::Duration;

use axle_traits::{Operation, OperationError, OperationStatus};

/// An angle sensor that always errors on read; useful when driving the
/// observer with externally supplied counts.
pub struct NoopSensor;

impl axle_traits::AngleSensor for NoopSensor {
    fn read(
        &mut self,
        _timeout: Duration,
    ) -> Result<i64, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("noop sensor")))
    }
}

/// Replays a scripted sequence of absolute angles in millidegrees,
/// holding the last value once the script runs out.
pub struct ScriptedAngles {
    script: Vec<i64>,
    index: usize,
}

impl ScriptedAngles {
    pub fn new(script: Vec<i64>) -> Self {
        Self { script, index: 0 }
    }
}

impl axle_traits::AngleSensor for ScriptedAngles {
    fn read(
        &mut self,
        _timeout: Duration,
    ) -> Result<i64, Box<dyn std::error::Error + Send + Sync>> {
        let value = match self.script.get(self.index) {
            Some(v) => *v,
            None => *self.script.last().ok_or_else(|| {
                Box::new(std::io::Error::other("empty angle script"))
                    as Box<dyn std::error::Error + Send + Sync>
            })?,
        };
        self.index += 1;
        Ok(value)
    }
}

/// Motor command as recorded by [`RecordingMotor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorCommand {
    Voltage(i32),
    Coast,
    Brake,
}

/// Records every command for later assertions.
#[derive(Default)]
pub struct RecordingMotor {
    pub commands: Vec<MotorCommand>,
}

impl axle_traits::MotorDriver for RecordingMotor {
    fn set_voltage(
        &mut self,
        millivolts: i32,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.commands.push(MotorCommand::Voltage(millivolts));
        Ok(())
    }

    fn coast(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.commands.push(MotorCommand::Coast);
        Ok(())
    }

    fn brake(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.commands.push(MotorCommand::Brake);
        Ok(())
    }
}

/// Scripted [`Operation`] that reports `Again` a fixed number of times
/// before finishing, with an optional teardown phase after a cancel.
pub struct ScriptedOperation {
    polls_left: u32,
    outcome: OperationStatus,
    teardown_polls: u32,
    cancelled: bool,
    pub polls: u32,
    pub cancel_calls: u32,
}

impl ScriptedOperation {
    /// Completes successfully after `polls` status calls.
    pub fn succeeding_after(polls: u32) -> Self {
        Self::with_outcome(polls, OperationStatus::Complete)
    }

    /// Fails with `error` after `polls` status calls.
    pub fn failing_after(polls: u32, error: OperationError) -> Self {
        Self::with_outcome(polls, OperationStatus::Failed(error))
    }

    fn with_outcome(polls: u32, outcome: OperationStatus) -> Self {
        Self {
            polls_left: polls,
            outcome,
            teardown_polls: 0,
            cancelled: false,
            polls: 0,
            cancel_calls: 0,
        }
    }

    /// After a cancel, keep reporting `Again` for `polls` more status
    /// calls before settling on `Failed(Cancelled)`.
    pub fn with_teardown(mut self, polls: u32) -> Self {
        self.teardown_polls = polls;
        self
    }
}

impl Operation for ScriptedOperation {
    fn status(&mut self) -> OperationStatus {
        self.polls += 1;
        if self.cancelled {
            if self.teardown_polls > 0 {
                self.teardown_polls -= 1;
                return OperationStatus::Again;
            }
            return OperationStatus::Failed(OperationError::Cancelled);
        }
        if self.polls_left > 0 {
            self.polls_left -= 1;
            return OperationStatus::Again;
        }
        self.outcome
    }

    fn cancel(&mut self) {
        self.cancel_calls += 1;
        self.cancelled = true;
    }
}
