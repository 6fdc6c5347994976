//! Encoder-count to angle conversion for one motor shaft.
//!
//! Wraps a raw counter with a mounting direction and a resettable
//! offset, so "angle zero" can be re-established at any time without
//! touching the counter hardware.

use crate::angle::Angle;
use crate::error::AxleError;

/// Positive-rotation convention for the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Clockwise,
    Counterclockwise,
}

#[derive(Debug, Clone)]
pub struct Tacho {
    direction: Direction,
    /// Encoder counts per degree, in thousandths (a 1:1 encoder with
    /// a 3:1 gear train is 3000).
    millicounts_per_degree: i32,
    /// Offset in millidegrees subtracted from the converted count.
    offset_mdeg: i64,
}

impl Tacho {
    /// Scale factors are fixed per motor build; a non-positive factor
    /// is a configuration error, rejected here rather than per sample.
    pub fn new(direction: Direction, millicounts_per_degree: i32) -> Result<Self, AxleError> {
        if millicounts_per_degree <= 0 {
            return Err(AxleError::InvalidArg("millicounts_per_degree must be > 0"));
        }
        Ok(Self {
            direction,
            millicounts_per_degree,
            offset_mdeg: 0,
        })
    }

    fn raw_mdeg(&self, count: i32) -> i64 {
        let signed = match self.direction {
            Direction::Clockwise => count as i64,
            Direction::Counterclockwise => -(count as i64),
        };
        signed * 1_000_000 / self.millicounts_per_degree as i64
    }

    /// Convert a raw encoder count to the output angle.
    pub fn angle(&self, count: i32) -> Angle {
        Angle::from_mdeg(self.raw_mdeg(count) - self.offset_mdeg)
    }

    /// Re-zero: after this call, converting `count` yields `to`.
    pub fn reset(&mut self, count: i32, to: Angle) {
        self.offset_mdeg = self.raw_mdeg(count) - to.to_mdeg();
    }
}
