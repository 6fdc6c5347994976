#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas for the axle motor stack.
//!
//! Motor model coefficients and observer settings are deserialized
//! from TOML and validated here, once, at load time. A model file that
//! passes [`Config::validate`] is safe to run unchecked in the control
//! loop: the per-tick math never re-checks denominators.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

/// Discretized motor model coefficients, produced offline by system
/// identification for one motor type.
///
/// Each `d_y_d_x` entry is a divisor: the per-tick contribution of
/// state `x` to state `y` is `PRESCALE_X * x / d_y_d_x`. Divisors may
/// be negative (decelerating terms) but never zero.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ModelCfg {
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
    /// Static friction torque in uNm-equivalent units.
    pub torque_friction: i32,
}

impl ModelCfg {
    /// All denominators the per-tick math divides by.
    fn denominators(&self) -> [i32; 16] {
        [
            self.d_angle_d_speed,
            self.d_angle_d_current,
            self.d_angle_d_voltage,
            self.d_angle_d_torque,
            self.d_speed_d_speed,
            self.d_speed_d_current,
            self.d_speed_d_voltage,
            self.d_speed_d_torque,
            self.d_current_d_speed,
            self.d_current_d_current,
            self.d_current_d_voltage,
            self.d_current_d_torque,
            self.d_torque_d_speed,
            self.d_torque_d_acceleration,
            self.d_voltage_d_torque,
            self.d_torque_d_voltage,
        ]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.denominators().contains(&0) {
            return Err(ConfigError::Invalid("model coefficient must not be zero"));
        }
        if self.torque_friction < 0 {
            return Err(ConfigError::Invalid("torque_friction must be >= 0"));
        }
        Ok(())
    }
}

/// Per-servo observer settings.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ObserverCfg {
    /// Below this estimated speed (mdeg/s) the motor counts as stopped.
    pub stall_speed_limit: i32,
    /// Raw stall condition must hold this many ticks before reporting.
    pub stall_time: u32,
    /// Model correction gain in mV per degree of angle error.
    pub feedback_gain: i32,
}

impl ObserverCfg {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stall_speed_limit <= 0 {
            return Err(ConfigError::Invalid("stall_speed_limit must be > 0"));
        }
        if self.stall_time == 0 {
            return Err(ConfigError::Invalid("stall_time must be > 0"));
        }
        if self.feedback_gain <= 0 {
            return Err(ConfigError::Invalid("feedback_gain must be > 0"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Config {
    pub model: ModelCfg,
    pub observer: ObserverCfg,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.model.validate()?;
        self.observer.validate()
    }
}

/// Parse and validate a config from TOML text.
pub fn load_str(text: &str) -> Result<Config, ConfigError> {
    let cfg: Config = toml::from_str(text)?;
    cfg.validate()?;
    Ok(cfg)
}

/// Parse and validate a config file.
pub fn load_path(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    load_str(&text)
}
