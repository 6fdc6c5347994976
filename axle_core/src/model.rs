//! Calibration-derived motor model.
//!
//! An [`ObserverModel`] holds the discretized linear plant coefficients
//! for one motor type, produced offline by system identification. Each
//! coefficient is a divisor paired with a fixed prescale multiplier so
//! the per-tick state update stays in integer arithmetic and remains
//! bit-compatible with existing calibration data.

use crate::error::AxleError;
use crate::fixed_point::{clamp, prescale_div, sign};
use axle_config::ModelCfg;

// Numeric ranges enforced by clamping throughout the stack.
pub const MAX_SPEED: i32 = 2_500_000; // mdeg/s
pub const MAX_ACCELERATION: i32 = 2_500_000; // mdeg/s^2
pub const MAX_CURRENT: i32 = 30_000; // mA
pub const MAX_VOLTAGE: i32 = 12_000; // mV
pub const MAX_TORQUE: i32 = 1_000_000; // uNm

// Integer prescale factors matching the calibration tooling.
pub const PRESCALE_SPEED: i32 = 858;
pub const PRESCALE_ACCELERATION: i32 = 858;
pub const PRESCALE_CURRENT: i32 = 71_582;
pub const PRESCALE_VOLTAGE: i32 = 178_956;
pub const PRESCALE_TORQUE: i32 = 2_147;

/// Immutable plant coefficients for one motor type; shared read-only
/// by every observer instance for that type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserverModel {
    pub d_angle_d_speed: i32,
    pub d_angle_d_current: i32,
    pub d_angle_d_voltage: i32,
    pub d_angle_d_torque: i32,
    pub d_speed_d_speed: i32,
    pub d_speed_d_current: i32,
    pub d_speed_d_voltage: i32,
    pub d_speed_d_torque: i32,
    pub d_current_d_speed: i32,
    pub d_current_d_current: i32,
    pub d_current_d_voltage: i32,
    pub d_current_d_torque: i32,
    pub d_torque_d_speed: i32,
    pub d_torque_d_acceleration: i32,
    pub d_voltage_d_torque: i32,
    pub d_torque_d_voltage: i32,
    pub torque_friction: i32,
}

impl ObserverModel {
    /// Build from a parsed config section, re-checking the divisors so
    /// a model constructed without going through `axle_config::load_*`
    /// still cannot smuggle a zero denominator into the tick path.
    pub fn from_config(cfg: &ModelCfg) -> Result<Self, AxleError> {
        cfg.validate()
            .map_err(|_| AxleError::InvalidArg("model coefficients failed validation"))?;
        Ok(Self {
            d_angle_d_speed: cfg.d_angle_d_speed,
            d_angle_d_current: cfg.d_angle_d_current,
            d_angle_d_voltage: cfg.d_angle_d_voltage,
            d_angle_d_torque: cfg.d_angle_d_torque,
            d_speed_d_speed: cfg.d_speed_d_speed,
            d_speed_d_current: cfg.d_speed_d_current,
            d_speed_d_voltage: cfg.d_speed_d_voltage,
            d_speed_d_torque: cfg.d_speed_d_torque,
            d_current_d_speed: cfg.d_current_d_speed,
            d_current_d_current: cfg.d_current_d_current,
            d_current_d_voltage: cfg.d_current_d_voltage,
            d_current_d_torque: cfg.d_current_d_torque,
            d_torque_d_speed: cfg.d_torque_d_speed,
            d_torque_d_acceleration: cfg.d_torque_d_acceleration,
            d_voltage_d_torque: cfg.d_voltage_d_torque,
            d_torque_d_voltage: cfg.d_torque_d_voltage,
            torque_friction: cfg.torque_friction,
        })
    }

    /// Sample calibration for a medium hub motor at a 5 ms tick.
    ///
    /// Free speed ~545 deg/s at 6 V, stall current ~1.2 A, mechanical
    /// time constant ~0.5 s. Used by the simulator, benches and tests.
    pub fn sample() -> Self {
        Self {
            d_angle_d_speed: 171_600,
            d_angle_d_current: 715_820_000,
            d_angle_d_voltage: 1_789_560_000,
            d_angle_d_torque: -2_147_000,
            d_speed_d_speed: 867,
            d_speed_d_current: 1_432,
            d_speed_d_voltage: 17_895_600,
            d_speed_d_torque: -42_940,
            d_current_d_speed: -858_000,
            d_current_d_current: 143_164,
            d_current_d_voltage: 1_789_560,
            d_current_d_torque: 2_147_000_000,
            d_torque_d_speed: 5_720,
            d_torque_d_acceleration: 42_900,
            d_voltage_d_torque: 85_880,
            d_torque_d_voltage: 4_474,
            torque_friction: 30_000,
        }
    }

    /// Voltage in mV needed to produce `desired_torque`.
    pub fn torque_to_voltage(&self, desired_torque: i32) -> i32 {
        let t = clamp(desired_torque as i64, MAX_TORQUE);
        prescale_div(t, PRESCALE_TORQUE, self.d_voltage_d_torque) as i32
    }

    /// Torque in uNm produced by `voltage` mV at stall.
    pub fn voltage_to_torque(&self, voltage: i32) -> i32 {
        let v = clamp(voltage as i64, MAX_VOLTAGE);
        prescale_div(v, PRESCALE_VOLTAGE, self.d_torque_d_voltage) as i32
    }

    /// Open-loop torque for a desired trajectory point: friction
    /// compensation following the sign of the rate reference, back-emf
    /// compensation proportional to it, and acceleration torque.
    pub fn feedforward_torque(&self, rate_ref: i32, acceleration_ref: i32) -> i32 {
        let friction = (self.torque_friction / 2) * sign(rate_ref);
        let back_emf = prescale_div(
            clamp(rate_ref as i64, MAX_SPEED),
            PRESCALE_SPEED,
            self.d_torque_d_speed,
        );
        let acceleration = prescale_div(
            clamp(acceleration_ref as i64, MAX_ACCELERATION),
            PRESCALE_ACCELERATION,
            self.d_torque_d_acceleration,
        );
        clamp(friction as i64 + back_emf + acceleration, MAX_TORQUE)
    }
}
