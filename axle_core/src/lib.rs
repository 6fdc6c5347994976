#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core motor-observer and task logic (hardware-agnostic).
//!
//! This crate provides the hardware-independent estimation and task engine
//! of the hub. All hardware interactions go through `axle_traits::AngleSensor`,
//! `axle_traits::MotorDriver` and `axle_traits::Operation` traits.
//!
//! ## Architecture
//!
//! - **Angles**: Split rotations/millidegrees representation (`angle` module)
//! - **Estimation**: Luenberger-style motor observer with stall detection
//!   (`observer` module, plant coefficients in `model`)
//! - **Speed**: Windowed numerical differentiation (`differentiator` module)
//! - **Position**: Encoder count to angle conversion (`tacho` module)
//! - **Tasks**: Poll-driven cancellable operations (`task` module)
//! - **Loop**: Tick scheduler and work queue (`scheduler`, `event_loop`)
//!
//! ## Fixed-Point Arithmetic
//!
//! Internals operate on integer control units (millidegrees, mdeg/s, mV,
//! micro-Nm) using `i32` state with `i64` intermediates for deterministic
//! behavior. See the `fixed_point` module for the shared helpers.

pub mod angle;
pub mod differentiator;
pub mod error;
pub mod event_loop;
pub mod fixed_point;
pub mod hw_error;
pub mod mocks;
pub mod model;
pub mod observer;
pub mod scheduler;
pub mod tacho;
pub mod task;

pub use crate::angle::Angle;
pub use crate::differentiator::Differentiator;
pub use crate::error::{AxleError, Result};
pub use crate::event_loop::{EventLoop, WorkHandle};
pub use crate::model::ObserverModel;
pub use crate::observer::{Actuation, EstimatedState, Observer, ObserverSettings};
pub use crate::scheduler::{Handle, Scheduler, Tickable};
pub use crate::tacho::{Direction, Tacho};
pub use crate::task::{Task, TaskSlot, TaskStatus, wait};
