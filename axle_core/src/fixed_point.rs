//! Fixed-point millidegree/millivolt arithmetic helpers.
//!
//! The whole control path works in scaled `i32` units (mdeg, mdeg/s,
//! mA, mV, uNm) with `i64` intermediates, so there is no floating
//! point anywhere in the hot path and exactly one rounding policy:
//! truncation toward zero, the same as the calibration tooling assumes.

/// Symmetric inclusive clamp to `[-abs_max, abs_max]`.
#[inline]
pub fn clamp(value: i64, abs_max: i32) -> i32 {
    let max = abs_max as i64;
    value.clamp(-max, max) as i32
}

/// `prescale * value / coeff` with a 64-bit intermediate.
///
/// This is the single place where a model coefficient divides a state
/// term; `coeff` is guaranteed nonzero by config validation.
#[inline]
pub fn prescale_div(value: i32, prescale: i32, coeff: i32) -> i64 {
    (prescale as i64) * (value as i64) / (coeff as i64)
}

/// Sign of a value as -1, 0 or 1.
#[inline]
pub fn sign(value: i32) -> i32 {
    value.signum()
}

/// `value * gain / 1000` with a 64-bit intermediate; used for gains
/// expressed per whole unit (e.g. mV per degree applied to mdeg).
#[inline]
pub fn mul_by_gain(value: i32, gain: i32) -> i64 {
    (value as i64) * (gain as i64) / 1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_is_inclusive_and_symmetric() {
        assert_eq!(clamp(12_000, 12_000), 12_000);
        assert_eq!(clamp(12_001, 12_000), 12_000);
        assert_eq!(clamp(-12_001, 12_000), -12_000);
        assert_eq!(clamp(-11_999, 12_000), -11_999);
        assert_eq!(clamp(i64::MAX, 1_000_000), 1_000_000);
        assert_eq!(clamp(i64::MIN, 1_000_000), -1_000_000);
    }

    #[test]
    fn prescale_div_truncates_toward_zero() {
        assert_eq!(prescale_div(7, 10, 3), 23); // 70/3
        assert_eq!(prescale_div(-7, 10, 3), -23);
        assert_eq!(prescale_div(7, 10, -3), -23);
    }

    #[test]
    fn prescale_div_survives_extreme_products() {
        // 858 * 2_500_000 overflows i32; must be exact in i64.
        assert_eq!(prescale_div(2_500_000, 858, 1), 2_145_000_000);
        assert_eq!(prescale_div(i32::MAX, 178_956, 1) / 178_956, i32::MAX as i64);
    }

    #[test]
    fn gain_scales_per_thousand() {
        // 1500 mV per degree on a 2000 mdeg error -> 3000 mV.
        assert_eq!(mul_by_gain(2000, 1500), 3000);
        assert_eq!(mul_by_gain(-2000, 1500), -3000);
    }
}
