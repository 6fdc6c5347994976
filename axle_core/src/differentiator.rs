//! Numeric angle derivative.
//!
//! Keeps a small ring buffer of recent angle samples and reports the
//! average speed across the window. This is a diagnostic cross-check
//! for the model-based estimate; it is never fed back into the model.

use crate::angle::Angle;

const WINDOW: usize = 8;

#[derive(Debug, Clone)]
pub struct Differentiator {
    /// Tick period of the sample stream in milliseconds.
    period_ms: u32,
    buf: [Angle; WINDOW],
    idx: usize,
}

impl Differentiator {
    pub fn new(period_ms: u32, start: Angle) -> Self {
        Self {
            period_ms: period_ms.max(1),
            buf: [start; WINDOW],
            idx: 0,
        }
    }

    /// Forget all history, as if the motor had always been at `angle`.
    pub fn reset(&mut self, angle: Angle) {
        self.buf = [angle; WINDOW];
        self.idx = 0;
    }

    /// Push the newest sample and return the speed in mdeg/s averaged
    /// over the window.
    pub fn update(&mut self, angle: Angle) -> i32 {
        // The slot at idx holds the oldest sample, WINDOW ticks ago.
        let oldest = self.buf[self.idx];
        self.buf[self.idx] = angle;
        self.idx = (self.idx + 1) % WINDOW;

        let delta = angle.diff_mdeg(&oldest) as i64;
        let span_ms = (WINDOW as i64) * (self.period_ms as i64);
        (delta * 1000 / span_ms).clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }
}
