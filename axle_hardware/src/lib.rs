//! Host-side simulated peripherals for the axle stack.
//!
//! Real hubs drive PWM channels and read quadrature counters in an
//! interrupt context; on a host machine those seams are filled by a
//! small integer DC-motor plant and a scripted radio link, good enough
//! to exercise the observer, stall detection and task machinery
//! end to end.

pub mod error;

use std::time::Duration;

use axle_traits::{AngleSensor, MotorDriver, Operation, OperationError, OperationStatus};

use crate::error::HwError;

/// Free speed per millivolt, mdeg/s (about 540 deg/s at 6 V).
const SPEED_PER_MV: i64 = 90;
/// Mechanical time constant in milliseconds.
const TAU_MS: i64 = 160;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DriveMode {
    Coast,
    Brake,
    Voltage(i32),
}

/// Simulated DC motor: a first-order speed lag toward the voltage's
/// free speed, with an optional hard block of the shaft. Implements
/// both hardware seams so one instance is the sensor and the driver
/// of the same shaft.
pub struct SimMotor {
    mode: DriveMode,
    /// Shaft position in millidegrees.
    angle_mdeg: i64,
    /// Shaft speed in mdeg/s.
    speed: i64,
    blocked: bool,
    attached: bool,
}

impl Default for SimMotor {
    fn default() -> Self {
        Self::new()
    }
}

impl SimMotor {
    pub fn new() -> Self {
        Self {
            mode: DriveMode::Coast,
            angle_mdeg: 0,
            speed: 0,
            blocked: false,
            attached: true,
        }
    }

    /// Clamp the shaft, as if the output ran into a hard stop.
    pub fn set_blocked(&mut self, blocked: bool) {
        self.blocked = blocked;
        if blocked {
            self.speed = 0;
        }
    }

    /// Simulate unplugging the motor; reads fail until re-attached.
    pub fn set_attached(&mut self, attached: bool) {
        self.attached = attached;
    }

    pub fn speed(&self) -> i64 {
        self.speed
    }

    /// Advance the plant by `dt_ms` of simulated time.
    pub fn tick(&mut self, dt_ms: u32) {
        let dt = dt_ms as i64;
        if self.blocked {
            self.speed = 0;
            return;
        }
        let target = match self.mode {
            DriveMode::Voltage(mv) => mv as i64 * SPEED_PER_MV,
            // Braking shorts the windings and pulls toward zero like a
            // drive at 0 V; coasting only loses speed slowly.
            DriveMode::Brake => 0,
            DriveMode::Coast => self.speed - self.speed * dt / (TAU_MS * 8),
        };
        self.speed += (target - self.speed) * dt / TAU_MS;
        self.angle_mdeg += self.speed * dt / 1000;
    }
}

impl AngleSensor for SimMotor {
    fn read(
        &mut self,
        _timeout: Duration,
    ) -> Result<i64, Box<dyn std::error::Error + Send + Sync>> {
        if !self.attached {
            return Err(Box::new(HwError::NotAttached));
        }
        Ok(self.angle_mdeg)
    }
}

impl MotorDriver for SimMotor {
    fn set_voltage(
        &mut self,
        millivolts: i32,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::trace!(millivolts, "sim motor voltage");
        self.mode = DriveMode::Voltage(millivolts);
        Ok(())
    }

    fn coast(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.mode = DriveMode::Coast;
        Ok(())
    }

    fn brake(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.mode = DriveMode::Brake;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkPhase {
    Handshaking,
    Disconnecting,
    Done(OperationStatus),
}

/// Simulated radio link establishment.
///
/// Connecting takes a fixed number of polls, standing in for the
/// advertise/scan/pair exchange of a real radio. Cancelling does not
/// stop it dead: a disconnect request goes out first and the teardown
/// takes a few more polls, exactly like a real link-layer goodbye.
pub struct SimLink {
    phase: LinkPhase,
    polls_left: u32,
    teardown_polls: u32,
    outcome: OperationStatus,
}

impl SimLink {
    /// A link that connects after `handshake_polls` status checks.
    pub fn connecting(handshake_polls: u32, teardown_polls: u32) -> Self {
        Self {
            phase: LinkPhase::Handshaking,
            polls_left: handshake_polls,
            teardown_polls,
            outcome: OperationStatus::Complete,
        }
    }

    /// A link whose peer never answers; fails after `polls` checks.
    pub fn unreachable(polls: u32) -> Self {
        Self {
            phase: LinkPhase::Handshaking,
            polls_left: polls,
            teardown_polls: 0,
            outcome: OperationStatus::Failed(OperationError::NoDevice),
        }
    }
}

impl Operation for SimLink {
    fn status(&mut self) -> OperationStatus {
        match self.phase {
            LinkPhase::Done(status) => status,
            LinkPhase::Disconnecting => {
                if self.teardown_polls > 0 {
                    self.teardown_polls -= 1;
                    OperationStatus::Again
                } else {
                    tracing::debug!("sim link disconnected");
                    self.phase = LinkPhase::Done(OperationStatus::Failed(OperationError::Cancelled));
                    OperationStatus::Failed(OperationError::Cancelled)
                }
            }
            LinkPhase::Handshaking => {
                if self.polls_left > 0 {
                    self.polls_left -= 1;
                    OperationStatus::Again
                } else {
                    tracing::debug!(outcome = ?self.outcome, "sim link handshake finished");
                    self.phase = LinkPhase::Done(self.outcome);
                    self.outcome
                }
            }
        }
    }

    fn cancel(&mut self) {
        if self.phase == LinkPhase::Handshaking {
            tracing::debug!("sim link disconnect requested");
            self.phase = LinkPhase::Disconnecting;
        }
    }
}
