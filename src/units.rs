//! Display formatting for measurements in the caller's unit system.

use crate::correction::round_tenth;
use crate::types::UnitSystem;

/// Format a length given in centimeters.
///
/// Metric values print with one decimal. Imperial values are converted to
/// inches, rounded to the nearest quarter inch, then shown to one decimal
/// with ties rounded up (15.25 in prints as `15.3"`).
///
/// ```
/// use bodyfit::{format_measurement, UnitSystem};
///
/// assert_eq!(format_measurement(91.24, UnitSystem::Metric), "91.2 cm");
/// assert_eq!(format_measurement(91.44, UnitSystem::Imperial), "36.0\"");
/// ```
pub fn format_measurement(cm: f64, system: UnitSystem) -> String {
    match system {
        UnitSystem::Metric => format!("{:.1} cm", cm),
        UnitSystem::Imperial => {
            let inches = (cm / UnitSystem::CM_PER_INCH * 4.0).round() / 4.0;
            // `{:.1}` alone rounds 15.25 to even
            format!("{:.1}\"", round_tenth(inches))
        }
    }
}

/// Format a height given in centimeters, as feet and inches for imperial.
pub fn format_height(cm: f64, system: UnitSystem) -> String {
    match system {
        UnitSystem::Metric => format!("{:.1} cm", cm),
        UnitSystem::Imperial => {
            let total = cm / UnitSystem::CM_PER_INCH;
            let mut feet = (total / 12.0).floor() as i64;
            let mut inches = (total % 12.0).round() as i64;
            if inches == 12 {
                feet += 1;
                inches = 0;
            }
            format!("{}'{}\"", feet, inches)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_uses_one_decimal() {
        assert_eq!(format_measurement(85.44, UnitSystem::Metric), "85.4 cm");
        assert_eq!(format_measurement(100.0, UnitSystem::Metric), "100.0 cm");
    }

    #[test]
    fn imperial_rounds_to_quarter_inch() {
        // 38.1 cm = 15.0 in
        assert_eq!(format_measurement(38.1, UnitSystem::Imperial), "15.0\"");
        // 39.116 cm = 15.4 in -> 15.5
        assert_eq!(format_measurement(39.116, UnitSystem::Imperial), "15.5\"");
        // 38.354 cm = 15.1 in -> 15.0
        assert_eq!(format_measurement(38.354, UnitSystem::Imperial), "15.0\"");
    }

    #[test]
    fn imperial_quarter_ties_round_up() {
        // 38.735 cm = 15.25 in
        assert_eq!(format_measurement(38.735, UnitSystem::Imperial), "15.3\"");
        // 39.3065 cm = 15.475 in -> 15.5
        assert_eq!(format_measurement(39.3065, UnitSystem::Imperial), "15.5\"");
        // 40.005 cm = 15.75 in
        assert_eq!(format_measurement(40.005, UnitSystem::Imperial), "15.8\"");
    }

    #[test]
    fn height_in_feet_and_inches() {
        assert_eq!(format_height(180.0, UnitSystem::Imperial), "5'11\"");
        assert_eq!(format_height(182.88, UnitSystem::Imperial), "6'0\"");
        assert_eq!(format_height(165.1, UnitSystem::Imperial), "5'5\"");
        assert_eq!(format_height(170.0, UnitSystem::Metric), "170.0 cm");
    }

    #[test]
    fn height_rounding_carries_into_feet() {
        // 71.7 in rounds to 72 in, shown as 6'0" rather than 5'12"
        assert_eq!(format_height(182.1, UnitSystem::Imperial), "6'0\"");
    }
}
