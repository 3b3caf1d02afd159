//! rounding.rs — Fixed-decimal rounding and tolerance compare.
//!
//! Reported concentrations are rounded half away from zero to a fixed number of
//! decimals (2 for the flower path, 3 for edible Δ9-THC). Totals are never
//! rounded here; presentation rounding belongs to the renderer.

/// Decimal places for reported concentrations on the flower path.
pub const FLOWER_DECIMALS: u32 = 2;

/// Decimal places for edible Δ9-THC (sub-percent values).
pub const EDIBLE_D9_DECIMALS: u32 = 3;

/// Round `value` to `places` decimals. Non-finite input yields `0.0`.
#[inline]
pub fn round_to(value: f64, places: u32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let scale = 10f64.powi(places as i32);
    (value * scale).round() / scale
}

/// mg/g equivalent of a % w/w concentration.
#[inline]
pub fn percent_to_mg_per_g(percent: f64) -> f64 {
    percent * 10.0
}

/// `|a - b| <= tolerance`.
#[inline]
pub fn within(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_to(1.005_000_1, 2), 1.01);
        assert_eq!(round_to(0.12345, 3), 0.123);
        assert_eq!(round_to(22.0, 2), 22.0);
        assert_eq!(round_to(f64::NAN, 2), 0.0);
    }

    #[test]
    fn mg_per_g_is_ten_times_percent() {
        assert_eq!(percent_to_mg_per_g(1.5), 15.0);
        assert_eq!(percent_to_mg_per_g(0.0), 0.0);
    }

    #[test]
    fn within_is_inclusive() {
        assert!(within(1.0, 1.1, 0.1 + 1e-12));
        assert!(!within(1.0, 1.2, 0.1));
    }
}
