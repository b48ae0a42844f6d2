//! Shared constants for quoting
//!
//! This module centralizes tolerances, default configuration values and
//! the small numeric helpers used throughout the engine.

// =============================================================================
// Numeric Tolerance
// =============================================================================

/// Tolerance for length comparisons and floor/ceil of derived counts (cm or sheets)
pub const EPSILON: f64 = 1e-9;

/// Floor that forgives floating noise just below an integer
#[inline]
pub fn floor_count(value: f64) -> u32 {
    if value <= 0.0 {
        0
    } else {
        (value + EPSILON).floor() as u32
    }
}

/// Ceil that forgives floating noise just above an integer
#[inline]
pub fn ceil_count(value: f64) -> u32 {
    if value <= 0.0 {
        0
    } else {
        (value - EPSILON).ceil() as u32
    }
}

/// Integer ceiling division
#[inline]
pub fn div_ceil(numerator: u32, denominator: u32) -> u32 {
    numerator.div_ceil(denominator.max(1))
}

/// Round a currency amount to 2 decimal places
#[inline]
pub fn round_money(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Round a percentage or length for output
#[inline]
pub fn round_2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// =============================================================================
// Press Defaults
// =============================================================================

/// Default gripper strip on the leading edge (cm)
pub const DEFAULT_GRIPPER_MARGIN_CM: f64 = 1.0;

/// Default gap between adjacent tiles (cm)
pub const DEFAULT_ITEM_GAP_CM: f64 = 0.2;

/// Default press bed (cm), a common B2 offset press
pub const DEFAULT_MACHINE_MAX_WIDTH_CM: f64 = 72.0;
pub const DEFAULT_MACHINE_MAX_HEIGHT_CM: f64 = 52.0;

/// Largest even division tried when cutting a parent into machine sheets
pub const MAX_CUTS_PER_AXIS: u32 = 8;

/// Densest grid accepted on one machine sheet
pub const MAX_ITEMS_PER_SHEET: u32 = 100_000;

// =============================================================================
// Job Defaults
// =============================================================================

pub const DEFAULT_BLEED_CM: f64 = 0.3;
pub const DEFAULT_MARGIN_PERCENTAGE: f64 = 30.0;
pub const DEFAULT_WASTE_PERCENTAGE: f64 = 2.0;
pub const DEFAULT_RUN_WASTE_PERCENTAGE: f64 = 3.0;
pub const DEFAULT_MAKEREADY_WASTE_SHEETS: u32 = 50;

// =============================================================================
// Quality Thresholds
// =============================================================================

pub const DEFAULT_MIN_TEXT_SIZE_PT: f64 = 6.0;
pub const DEFAULT_MIN_IMAGE_DPI: u32 = 300;
pub const DEFAULT_MAX_SHRINK_CM: f64 = 0.5;
pub const DEFAULT_SHRINK_STEP_CM: f64 = 0.1;
pub const DEFAULT_SHRINK_WARNING_FRACTION: f64 = 0.5;
pub const DEFAULT_LOW_UTILIZATION_PERCENT: f64 = 50.0;
pub const DEFAULT_DANGER_UTILIZATION_PERCENT: f64 = 30.0;
pub const DEFAULT_OFFSET_MARGINAL_FACTOR: f64 = 1.2;

// =============================================================================
// Ranking
// =============================================================================

/// Relative cost difference under which digital and offset count as a tie
pub const DEFAULT_NEAR_TIE_TOLERANCE_PERCENT: f64 = 3.0;

/// Number of top options whose warnings are lifted into the result
pub const DEFAULT_SUMMARY_OPTION_COUNT: usize = 3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_count_forgives_noise() {
        assert_eq!(floor_count(0.9999999999999), 1);
        assert_eq!(floor_count(2.5), 2);
        assert_eq!(floor_count(-1.0), 0);
    }

    #[test]
    fn test_ceil_count_forgives_noise() {
        assert_eq!(ceil_count(30.000000000004), 30);
        assert_eq!(ceil_count(30.2), 31);
        assert_eq!(ceil_count(0.0), 0);
    }

    #[test]
    fn test_round_money() {
        assert_eq!(round_money(1.005_1), 1.01);
        assert_eq!(round_money(12.344), 12.34);
    }

    #[test]
    fn test_div_ceil() {
        assert_eq!(div_ceil(9, 2), 5);
        assert_eq!(div_ceil(8, 2), 4);
        assert_eq!(div_ceil(3, 0), 3);
    }
}
