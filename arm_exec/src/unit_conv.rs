//! # Unit conversion
//!
//! Conversions between the servo's native integer units and physical units.
//!
//! Conversions into native units round to the nearest integer, with ties rounded away from zero.
//! Values beyond the range of an `i32` saturate.

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Position resolution of the servo.
///
/// Units: degrees/tick
pub const DEG_PER_TICK: f64 = 0.088;

/// Velocity resolution of the servo.
///
/// Units: rpm/unit
pub const RPM_PER_UNIT: f64 = 0.229;

/// PWM resolution of the servo.
///
/// Units: percent/unit
pub const PERCENT_PER_PWM_UNIT: f64 = 0.113;

/// Current resolution of the servo.
///
/// Units: mA/unit
pub const MA_PER_CURRENT_UNIT: f64 = 1.0;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

pub fn ticks_to_deg(ticks: i32) -> f64 {
    ticks as f64 * DEG_PER_TICK
}

pub fn deg_to_ticks(deg: f64) -> i32 {
    to_native(deg, DEG_PER_TICK)
}

pub fn units_to_rpm(units: i32) -> f64 {
    units as f64 * RPM_PER_UNIT
}

pub fn rpm_to_units(rpm: f64) -> i32 {
    to_native(rpm, RPM_PER_UNIT)
}

pub fn units_to_ma(units: i32) -> f64 {
    units as f64 * MA_PER_CURRENT_UNIT
}

pub fn ma_to_units(ma: f64) -> i32 {
    to_native(ma, MA_PER_CURRENT_UNIT)
}

pub fn units_to_percent(units: i32) -> f64 {
    units as f64 * PERCENT_PER_PWM_UNIT
}

pub fn percent_to_units(percent: f64) -> i32 {
    to_native(percent, PERCENT_PER_PWM_UNIT)
}

/// Scale a physical value into native units.
///
/// `f64::round` rounds half away from zero, and the `as` cast saturates (NaN maps to 0).
fn to_native(value: f64, resolution: f64) -> i32 {
    (value / resolution).round() as i32
}

#[cfg(test)]
mod test {
    use super::*;

    /// A spread of raw values covering the register ranges, including the extremes.
    fn raw_values() -> Vec<i32> {
        let mut v: Vec<i32> = (-5000..=5000).collect();
        v.extend_from_slice(&[
            i32::MIN,
            i32::MIN + 1,
            -1_048_575,
            1_048_575,
            4095,
            i32::MAX - 1,
            i32::MAX,
        ]);
        v
    }

    #[test]
    fn test_position_scenario() {
        assert!((ticks_to_deg(1000) - 88.0).abs() < 1e-9);
        assert_eq!(deg_to_ticks(88.0), 1000);
        assert_eq!(deg_to_ticks(180.0), 2045);
    }

    #[test]
    fn test_round_trips() {
        for t in raw_values() {
            assert_eq!(deg_to_ticks(ticks_to_deg(t)), t, "position {}", t);
            assert_eq!(rpm_to_units(units_to_rpm(t)), t, "velocity {}", t);
            assert_eq!(ma_to_units(units_to_ma(t)), t, "current {}", t);
            assert_eq!(percent_to_units(units_to_percent(t)), t, "pwm {}", t);
        }
    }

    #[test]
    fn test_ties_round_away_from_zero() {
        assert_eq!(ma_to_units(2.5), 3);
        assert_eq!(ma_to_units(-2.5), -3);
        assert_eq!(ma_to_units(0.5), 1);
        assert_eq!(ma_to_units(-0.5), -1);
        assert_eq!(ma_to_units(2.49), 2);
    }

    #[test]
    fn test_saturation() {
        assert_eq!(deg_to_ticks(1e12), i32::MAX);
        assert_eq!(deg_to_ticks(-1e12), i32::MIN);
        assert_eq!(rpm_to_units(f64::NAN), 0);
    }
}
