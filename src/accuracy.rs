//! Accuracy of estimates against manually taken measurements.
//!
//! Height is never compared since it is an input, not an estimate.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::correction::round_tenth;
use crate::types::{Measurement, MeasurementSet};

/// Upper bound on the weighted overall percentage deviation.
pub const MAX_OVERALL_DEVIATION: f64 = 60.0;

/// How many of the worst measurements an [`AccuracyReport`] lists.
pub const PROBLEM_MEASUREMENT_COUNT: usize = 3;

/// Per-measurement errors and their aggregate.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorSummary {
    pub overall: f64,
    pub by_measurement: BTreeMap<Measurement, f64>,
}

/// A measurement with one of the largest percentage deviations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProblemMeasurement {
    pub measurement: Measurement,
    /// Unweighted percentage deviation.
    pub deviation: f64,
}

/// Summary comparing estimated measurements with manual ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccuracyReport {
    /// 0-100, higher is better.
    pub precision_score: f64,
    /// Worst measurements first.
    pub problem_measurements: Vec<ProblemMeasurement>,
    /// One line of advice per problem measurement.
    pub recommendations: Vec<String>,
    #[serde(rename = "overallMAE")]
    pub overall_mae: f64,
    pub overall_deviation: f64,
}

fn compared<'a>(
    actual: &'a MeasurementSet,
    predicted: &'a MeasurementSet,
) -> impl Iterator<Item = (Measurement, f64, f64)> + 'a {
    actual
        .iter()
        .filter(|(m, _)| *m != Measurement::Height)
        .filter_map(move |(m, a)| predicted.get(m).map(|p| (m, a, p)))
}

/// Mean absolute error in centimeters over measurements present in both sets.
///
/// ```
/// use bodyfit::{mean_absolute_error, Measurement, MeasurementSet};
///
/// let actual = MeasurementSet::new().with(Measurement::Chest, 100.0).with(Measurement::Waist, 80.0);
/// let predicted = MeasurementSet::new().with(Measurement::Chest, 96.0).with(Measurement::Waist, 82.0);
/// assert_eq!(mean_absolute_error(&actual, &predicted).overall, 3.0);
/// ```
pub fn mean_absolute_error(actual: &MeasurementSet, predicted: &MeasurementSet) -> ErrorSummary {
    let by_measurement: BTreeMap<_, _> = compared(actual, predicted)
        .map(|(m, a, p)| (m, (a - p).abs()))
        .collect();
    ErrorSummary {
        overall: mean(by_measurement.values().copied()),
        by_measurement,
    }
}

/// Relative weight of a measurement in the overall deviation.
pub fn importance_weight(measurement: Measurement) -> f64 {
    use Measurement::*;

    match measurement {
        Chest | Waist | Hips => 1.2,
        Shoulder | Thigh => 1.1,
        Forearm | UpperArm | Calf => 0.9,
        _ => 1.0,
    }
}

/// Percentage deviation, measured against the smaller of the two values.
///
/// Per-measurement figures are unweighted. The overall figure is the mean
/// of the weighted figures, capped at [`MAX_OVERALL_DEVIATION`]. Pairs where
/// either value is not positive are skipped.
pub fn percentage_deviation(actual: &MeasurementSet, predicted: &MeasurementSet) -> ErrorSummary {
    let by_measurement: BTreeMap<_, _> = compared(actual, predicted)
        .filter(|&(_, a, p)| a > 0.0 && p > 0.0)
        .map(|(m, a, p)| (m, (a - p).abs() / a.min(p) * 100.0))
        .collect();
    let weighted = by_measurement.iter().map(|(m, pct)| pct * importance_weight(*m));
    ErrorSummary {
        overall: mean(weighted).min(MAX_OVERALL_DEVIATION),
        by_measurement,
    }
}

/// Compare estimates with manual measurements.
///
/// ```
/// use bodyfit::{analyze_accuracy, Measurement, MeasurementSet};
///
/// let manual = MeasurementSet::new().with(Measurement::Chest, 100.0);
/// let estimate = MeasurementSet::new().with(Measurement::Chest, 90.0);
/// let report = analyze_accuracy(&manual, &estimate);
///
/// assert_eq!(report.problem_measurements[0].measurement, Measurement::Chest);
/// assert_eq!(report.recommendations[0], "chest: Consider refinement (11.1%)");
/// ```
pub fn analyze_accuracy(actual: &MeasurementSet, predicted: &MeasurementSet) -> AccuracyReport {
    let mae = mean_absolute_error(actual, predicted);
    let deviation = percentage_deviation(actual, predicted);

    let mut problems: Vec<ProblemMeasurement> = deviation
        .by_measurement
        .iter()
        .map(|(&measurement, &deviation)| ProblemMeasurement {
            measurement,
            deviation,
        })
        .collect();
    problems.sort_by(|a, b| b.deviation.total_cmp(&a.deviation));
    problems.truncate(PROBLEM_MEASUREMENT_COUNT);

    let recommendations = problems.iter().map(recommendation).collect();

    AccuracyReport {
        precision_score: (100.0 - deviation.overall * 2.0).max(0.0),
        problem_measurements: problems,
        recommendations,
        overall_mae: mae.overall,
        overall_deviation: deviation.overall,
    }
}

fn recommendation(problem: &ProblemMeasurement) -> String {
    let pct = round_tenth(problem.deviation);
    let m = problem.measurement;
    if problem.deviation > 15.0 {
        format!("{m}: Significant deviation ({pct:.1}%) requires calibration")
    } else if problem.deviation > 8.0 {
        format!("{m}: Consider refinement ({pct:.1}%)")
    } else {
        format!("{m}: Acceptable accuracy ({pct:.1}%)")
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
