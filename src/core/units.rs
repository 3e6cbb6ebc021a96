pub const KILOWATTS_PER_HORSEPOWER: f64 = 0.746;
pub const PERCENT_PER_UNIT: f64 = 100.;

/// Number of decimal places used when presenting powers in reports.
pub const DISPLAY_DECIMAL_PLACES: u32 = 2;

pub fn horsepower_to_kilowatts(power_hp: f64) -> f64 {
    power_hp * KILOWATTS_PER_HORSEPOWER
}

pub fn fraction_to_percent(fraction: f64) -> f64 {
    fraction * PERCENT_PER_UNIT
}

/// Round half away from zero to the given number of decimal places.
///
/// Only used at the presentation edge - aggregation always works at full precision.
pub fn round_to_decimal_places(value: f64, decimal_places: u32) -> f64 {
    let factor = 10f64.powi(decimal_places as i32);
    (value * factor).round() / factor
}

pub(crate) fn round_for_display(value: f64) -> f64 {
    round_to_decimal_places(value, DISPLAY_DECIMAL_PLACES)
}

/// Reactive-to-active power ratio implied by a power factor, i.e. tan(acos(pf)).
///
/// Tends to infinity as the power factor approaches zero, so callers must only pass values in (0, 1].
pub fn reactive_ratio_for_power_factor(power_factor: f64) -> f64 {
    power_factor.acos().tan()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_horsepower_to_kilowatts() {
        assert_relative_eq!(horsepower_to_kilowatts(100.), 74.6);
        assert_eq!(horsepower_to_kilowatts(0.), 0.);
    }

    #[rstest]
    #[case(78.52631578947368, 78.53)]
    #[case(42.38401529631716, 42.38)]
    #[case(0.005, 0.01)]
    #[case(-1.235, -1.24)]
    #[case(112.5, 112.5)]
    fn test_round_for_display(#[case] value: f64, #[case] expected: f64) {
        assert_eq!(round_for_display(value), expected);
    }

    #[rstest]
    fn test_round_to_zero_decimal_places() {
        assert_eq!(round_to_decimal_places(2.5, 0), 3.);
    }

    #[rstest]
    #[case(1.0, 0.0)]
    #[case(0.88, 0.5397428221380871)]
    #[case(0.9, 0.48432210483785254)]
    fn test_reactive_ratio_for_power_factor(#[case] power_factor: f64, #[case] expected: f64) {
        assert_relative_eq!(
            reactive_ratio_for_power_factor(power_factor),
            expected,
            epsilon = 1e-12
        );
    }

    #[rstest]
    fn test_fraction_to_percent() {
        assert_relative_eq!(fraction_to_percent(0.9874), 98.74, epsilon = 1e-12);
    }
}
