//! Overflow-safe absolute rotation counter.
//!
//! A 32-bit millidegree counter overflows after ~5965 rotations, which
//! a motor can reach in minutes. `Angle` therefore keeps whole
//! rotations separately and carries exactly one full turn per 360 000
//! millidegrees on every increment.

/// Millidegrees in one full rotation.
pub const MDEG_PER_ROTATION: i32 = 360_000;

/// Absolute shaft position: whole rotations plus a sub-rotation
/// remainder, with `0 <= millidegrees < 360_000`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Angle {
    pub rotations: i32,
    pub millidegrees: i32,
}

impl Angle {
    /// Build from a total millidegree count, normalizing the remainder.
    pub fn from_mdeg(total: i64) -> Self {
        let per = MDEG_PER_ROTATION as i64;
        Self {
            rotations: total.div_euclid(per) as i32,
            millidegrees: total.rem_euclid(per) as i32,
        }
    }

    /// Add a signed millidegree delta, carrying whole turns into the
    /// rotation count so the remainder invariant holds.
    pub fn add_mdeg(&mut self, delta: i32) {
        let total = self.millidegrees as i64 + delta as i64;
        let per = MDEG_PER_ROTATION as i64;
        self.rotations = self
            .rotations
            .wrapping_add(total.div_euclid(per) as i32);
        self.millidegrees = total.rem_euclid(per) as i32;
    }

    /// Signed millidegree difference `self - other`, saturated to the
    /// `i32` range. Used as the control and observer correction error.
    pub fn diff_mdeg(&self, other: &Angle) -> i32 {
        let rot = (self.rotations as i64 - other.rotations as i64) * MDEG_PER_ROTATION as i64;
        let full = rot + (self.millidegrees as i64 - other.millidegrees as i64);
        full.clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }

    /// Total position in millidegrees, without the i32 restriction.
    pub fn to_mdeg(&self) -> i64 {
        self.rotations as i64 * MDEG_PER_ROTATION as i64 + self.millidegrees as i64
    }
}
