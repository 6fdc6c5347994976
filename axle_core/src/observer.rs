//! Model-based motor state observer.
//!
//! Between sparse angle measurements the observer advances a
//! discretized linear plant model one tick at a time, and a small
//! proportional feedback voltage pulls the model back toward the
//! measured angle. When that corrective term is large, negative, and
//! sustained while the motor barely moves under significant drive
//! voltage, the motor is pushing against an unmodeled load: a stall.

use std::sync::Arc;

use crate::angle::Angle;
use crate::differentiator::Differentiator;
use crate::fixed_point::{clamp, mul_by_gain, prescale_div};
use crate::model::{
    MAX_CURRENT, MAX_SPEED, MAX_VOLTAGE, ObserverModel, PRESCALE_CURRENT, PRESCALE_SPEED,
    PRESCALE_TORQUE, PRESCALE_VOLTAGE,
};

/// How a motor is currently being driven. Only fixed-voltage actuation
/// participates in the stall model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actuation {
    Coast,
    Brake,
    Voltage,
    Torque,
}

/// Per-servo observer settings, immutable during operation.
#[derive(Debug, Clone, Copy)]
pub struct ObserverSettings {
    /// Below this estimated speed (mdeg/s) the motor counts as stopped.
    pub stall_speed_limit: i32,
    /// The raw stall condition must hold this many ticks before
    /// `is_stalled` reports it.
    pub stall_time: u32,
    /// Feedback gain in mV per degree of angle error.
    pub feedback_gain: i32,
}

impl From<axle_config::ObserverCfg> for ObserverSettings {
    fn from(cfg: axle_config::ObserverCfg) -> Self {
        Self {
            stall_speed_limit: cfg.stall_speed_limit,
            stall_time: cfg.stall_time,
            feedback_gain: cfg.feedback_gain,
        }
    }
}

/// Snapshot of the estimated motor state.
#[derive(Debug, Clone, Copy)]
pub struct EstimatedState {
    /// Model estimate of the angle.
    pub angle: Angle,
    /// Model estimate of the speed in mdeg/s.
    pub speed: i32,
    /// Numeric derivative of the measured angle, as a sanity check.
    pub speed_numeric: i32,
}

/// Per-motor state estimator. One instance per motor channel, owned by
/// the control loop driving that channel; never shared across motors.
#[derive(Debug, Clone)]
pub struct Observer {
    model: Arc<ObserverModel>,
    settings: ObserverSettings,
    angle: Angle,
    speed: i32,
    current: i32,
    speed_numeric: i32,
    stalled: bool,
    stall_start: u32,
    differentiator: Differentiator,
}

impl Observer {
    pub fn new(
        model: Arc<ObserverModel>,
        settings: ObserverSettings,
        tick_ms: u32,
        start: Angle,
    ) -> Self {
        Self {
            model,
            settings,
            angle: start,
            speed: 0,
            current: 0,
            speed_numeric: 0,
            stalled: false,
            stall_start: 0,
            differentiator: Differentiator::new(tick_ms, start),
        }
    }

    /// Reset to a new angle; speed and current drop to zero and all
    /// estimation history is erased. Must be called whenever physical
    /// continuity breaks (motor re-attached, counter re-zeroed).
    pub fn reset(&mut self, angle: Angle) {
        self.angle = angle;
        self.speed = 0;
        self.current = 0;
        self.speed_numeric = 0;
        self.stalled = false;
        self.differentiator.reset(angle);
    }

    /// Current best estimate of the real system state.
    pub fn estimated_state(&self) -> EstimatedState {
        EstimatedState {
            angle: self.angle,
            speed: self.speed,
            speed_numeric: self.speed_numeric,
        }
    }

    /// Model estimate of the motor current in mA.
    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn model(&self) -> &ObserverModel {
        &self.model
    }

    /// Voltage that nudges the model toward the measured angle,
    /// clamped to the drive range. Proportional only; trajectory
    /// tracking is the control layer's job, not the observer's.
    pub fn feedback_voltage(&self, measured: Angle) -> i32 {
        let error = measured.diff_mdeg(&self.angle);
        clamp(mul_by_gain(error, self.settings.feedback_gain), MAX_VOLTAGE)
    }

    fn update_stall_state(
        &mut self,
        time: u32,
        actuation: Actuation,
        voltage: i32,
        feedback_voltage: i32,
    ) {
        // Anything other than voltage actuation is outside the stall
        // model and must never raise the flag.
        if actuation != Actuation::Voltage {
            self.stalled = false;
            return;
        }

        // Convert to forward motion to simplify the checks; widen so
        // extreme caller-supplied voltages cannot overflow.
        let mut speed = self.speed as i64;
        let mut voltage = voltage as i64;
        let mut feedback_voltage = feedback_voltage as i64;
        if voltage < 0 {
            speed = -speed;
            voltage = -voltage;
            feedback_voltage = -feedback_voltage;
        }

        let friction_voltage = self.model.torque_to_voltage(self.model.torque_friction / 2) as i64;

        // Motor is going slow or even backward, the model is ahead of
        // reality and pushing back hard relative to the drive voltage,
        // and the drive voltage itself is well above mere friction.
        let condition = speed < self.settings.stall_speed_limit as i64
            && feedback_voltage < 0
            && -feedback_voltage > voltage * 3 / 4
            && voltage > 5 * friction_voltage;

        if condition {
            if !self.stalled {
                // Rising edge; debounce timing starts here.
                self.stall_start = time;
                tracing::trace!(time, "stall condition raised");
            }
            self.stalled = true;
        } else {
            self.stalled = false;
        }
    }

    /// One estimator tick: predict the next state from the model and
    /// the applied actuation, corrected by the measured angle.
    pub fn update(&mut self, time: u32, measured: Angle, actuation: Actuation, voltage: i32) {
        let m = *self.model;

        // Numeric derivative as a speed sanity check (diagnostic only).
        self.speed_numeric = self.differentiator.update(measured);

        let feedback_voltage = self.feedback_voltage(measured);

        // Stall evaluation uses the pre-correction drive voltage.
        self.update_stall_state(time, actuation, voltage, feedback_voltage);

        // The model sees the applied voltage plus the feedback voltage
        // that keeps it in sync with the real system. Coast and brake
        // apply no drive voltage of their own.
        let applied = match actuation {
            Actuation::Voltage => voltage,
            _ => 0,
        };
        let voltage = applied.saturating_add(feedback_voltage);

        // The only modeled torque is static friction, signed by the
        // current speed estimate.
        let torque = if self.speed > 0 {
            m.torque_friction / 2
        } else {
            -m.torque_friction / 2
        };

        // x(k+1) = Ax(k) + Bu(k), all in prescaled integer arithmetic.
        let angle_delta = prescale_div(self.speed, PRESCALE_SPEED, m.d_angle_d_speed)
            + prescale_div(self.current, PRESCALE_CURRENT, m.d_angle_d_current)
            + prescale_div(voltage, PRESCALE_VOLTAGE, m.d_angle_d_voltage)
            + prescale_div(torque, PRESCALE_TORQUE, m.d_angle_d_torque);
        let mut speed_next = clamp(
            prescale_div(self.speed, PRESCALE_SPEED, m.d_speed_d_speed)
                + prescale_div(self.current, PRESCALE_CURRENT, m.d_speed_d_current)
                + prescale_div(voltage, PRESCALE_VOLTAGE, m.d_speed_d_voltage)
                + prescale_div(torque, PRESCALE_TORQUE, m.d_speed_d_torque),
            MAX_SPEED,
        );
        let current_next = clamp(
            prescale_div(self.speed, PRESCALE_SPEED, m.d_current_d_speed)
                + prescale_div(self.current, PRESCALE_CURRENT, m.d_current_d_current)
                + prescale_div(voltage, PRESCALE_VOLTAGE, m.d_current_d_voltage)
                + prescale_div(torque, PRESCALE_TORQUE, m.d_current_d_torque),
            MAX_CURRENT,
        );

        // If the friction term alone flipped the sign of the new
        // speed, the crude friction model overshot; hold at zero so it
        // cannot oscillate the sign every tick near standstill.
        let without_friction =
            speed_next as i64 - prescale_div(torque, PRESCALE_TORQUE, m.d_speed_d_torque);
        if (speed_next < 0) != (without_friction < 0) {
            speed_next = 0;
        }

        self.angle
            .add_mdeg(angle_delta.clamp(i32::MIN as i64, i32::MAX as i64) as i32);
        self.speed = speed_next;
        self.current = current_next;
    }

    /// Debounced stall check: the raw condition must have held for at
    /// least `stall_time` ticks. Returns how long it has been stalled.
    pub fn is_stalled(&self, time: u32) -> Option<u32> {
        if !self.stalled {
            return None;
        }
        let duration = time.wrapping_sub(self.stall_start);
        (duration >= self.settings.stall_time).then_some(duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observer() -> Observer {
        Observer::new(
            Arc::new(ObserverModel::sample()),
            ObserverSettings {
                stall_speed_limit: 20_000,
                stall_time: 200,
                feedback_gain: 1_500,
            },
            5,
            Angle::default(),
        )
    }

    #[test]
    fn reset_clears_all_state() {
        let mut obs = observer();
        let mut a = Angle::default();
        for t in 0..50 {
            a.add_mdeg(100);
            obs.update(t, a, Actuation::Voltage, 6_000);
        }
        let target = Angle::from_mdeg(42);
        obs.reset(target);
        let est = obs.estimated_state();
        assert_eq!(est.angle, target);
        assert_eq!(est.speed, 0);
        assert_eq!(est.speed_numeric, 0);
        assert_eq!(obs.current(), 0);
        assert!(obs.is_stalled(1_000).is_none());
    }

    #[test]
    fn feedback_voltage_is_proportional_and_clamped() {
        let obs = observer();
        // 1500 mV per degree: 2 deg error -> 3000 mV.
        assert_eq!(obs.feedback_voltage(Angle::from_mdeg(2_000)), 3_000);
        assert_eq!(obs.feedback_voltage(Angle::from_mdeg(-2_000)), -3_000);
        // A huge error clamps at the drive range.
        assert_eq!(obs.feedback_voltage(Angle::from_mdeg(100_000)), MAX_VOLTAGE);
    }
}
