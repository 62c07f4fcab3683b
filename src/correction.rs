//! Ordered correction steps applied to raw measurements.
//!
//! Every step takes the full measurement set and returns it, so steps can be
//! run and tested in isolation. Order matters: each step reads the current
//! values written by the steps before it. Steps whose inputs are missing
//! leave the set untouched.

use tracing::debug;

use crate::proportions::{Proportions, ReferenceRatios};
use crate::types::{Measurement, MeasurementSet};

pub const CHEST_TO_WAIST_TOLERANCE: f64 = 0.04;
pub const WAIST_TO_HIP_TOLERANCE: f64 = 0.04;
pub const SHOULDER_TO_CHEST_TOLERANCE: f64 = 0.03;
pub const THIGH_TO_HIP_TOLERANCE: f64 = 0.04;

/// Multiplier applied to depth girths when a side view is available.
pub const DEPTH_BONUS: f64 = 1.03;

pub const BMI_MIN: f64 = 18.5;
pub const BMI_MAX: f64 = 35.0;

/// Smallest length the height-band pass will emit.
pub const MIN_LENGTH_CM: f64 = 0.1;

/// Everything a correction step may read besides the measurements.
#[derive(Debug, Clone, Copy)]
pub struct CorrectionContext<'a> {
    pub proportions: &'a Proportions,
    pub height_cm: f64,
    pub waist_prominence: f64,
    pub references: ReferenceRatios,
    pub has_side_image: bool,
}

impl<'a> CorrectionContext<'a> {
    pub fn new(
        proportions: &'a Proportions,
        height_cm: f64,
        body_type_factor: f64,
        waist_prominence: f64,
        has_side_image: bool,
    ) -> Self {
        Self {
            proportions,
            height_cm,
            waist_prominence,
            references: proportions.reference_ratios(body_type_factor, waist_prominence),
            has_side_image,
        }
    }
}

/// A named step of the correction pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Correction {
    WaistProminenceBoost,
    CorrelatedNudge,
    ChestToWaist,
    WaistToHip,
    ShoulderToChest,
    ThighToHip,
    DepthBonus,
    DerivedGirths,
    BmiEstimate,
    RecordHeight,
    HeightBands,
}

impl Correction {
    /// Shape adjustments applied to the raw values.
    pub const PRE_RECONCILIATION: [Correction; 2] =
        [Correction::WaistProminenceBoost, Correction::CorrelatedNudge];

    /// Ratio corrections, in the order they must run.
    pub const RECONCILIATION: [Correction; 4] = [
        Correction::ChestToWaist,
        Correction::WaistToHip,
        Correction::ShoulderToChest,
        Correction::ThighToHip,
    ];

    pub const POST_RECONCILIATION: [Correction; 5] = [
        Correction::DepthBonus,
        Correction::DerivedGirths,
        Correction::BmiEstimate,
        Correction::RecordHeight,
        Correction::HeightBands,
    ];

    pub const fn name(&self) -> &'static str {
        match self {
            Correction::WaistProminenceBoost => "waist-prominence-boost",
            Correction::CorrelatedNudge => "correlated-nudge",
            Correction::ChestToWaist => "chest-to-waist",
            Correction::WaistToHip => "waist-to-hip",
            Correction::ShoulderToChest => "shoulder-to-chest",
            Correction::ThighToHip => "thigh-to-hip",
            Correction::DepthBonus => "depth-bonus",
            Correction::DerivedGirths => "derived-girths",
            Correction::BmiEstimate => "bmi-estimate",
            Correction::RecordHeight => "record-height",
            Correction::HeightBands => "height-bands",
        }
    }

    /// The ratio this step enforces: (numerator, denominator, target, tolerance).
    fn ratio_constraint(&self, ctx: &CorrectionContext<'_>) -> Option<(Measurement, Measurement, f64, f64)> {
        let refs = &ctx.references;
        match self {
            Correction::ChestToWaist => Some((
                Measurement::Chest,
                Measurement::Waist,
                refs.chest_to_waist,
                CHEST_TO_WAIST_TOLERANCE,
            )),
            Correction::WaistToHip => Some((
                Measurement::Waist,
                Measurement::Hips,
                refs.waist_to_hip,
                WAIST_TO_HIP_TOLERANCE,
            )),
            Correction::ShoulderToChest => Some((
                Measurement::Shoulder,
                Measurement::Chest,
                refs.shoulder_to_chest,
                SHOULDER_TO_CHEST_TOLERANCE,
            )),
            Correction::ThighToHip => Some((
                Measurement::Thigh,
                Measurement::Hips,
                refs.thigh_to_hip,
                THIGH_TO_HIP_TOLERANCE,
            )),
            _ => None,
        }
    }

    /// Whether this step would leave the set unchanged. Only ratio
    /// corrections can be unsatisfied.
    pub fn is_satisfied(&self, set: &MeasurementSet, ctx: &CorrectionContext<'_>) -> bool {
        match self.ratio_constraint(ctx) {
            Some((num, den, target, tolerance)) => match set.ratio(num, den) {
                Some(actual) => (actual - target).abs() <= tolerance,
                None => true,
            },
            None => true,
        }
    }

    pub fn apply(&self, mut set: MeasurementSet, ctx: &CorrectionContext<'_>) -> MeasurementSet {
        use Measurement::*;

        let wp = ctx.waist_prominence;
        match self {
            Correction::WaistProminenceBoost => {
                if wp > 0.6 {
                    scale(&mut set, Waist, 1.0 + (wp - 0.5) * 0.1);
                }
            }
            Correction::CorrelatedNudge => {
                if wp > 0.55 {
                    scale(&mut set, Chest, 1.0 + (wp - 0.55) * 0.07);
                    scale(&mut set, Hips, 1.0 + (wp - 0.55) * 0.05);
                }
            }
            Correction::ChestToWaist | Correction::WaistToHip | Correction::ShoulderToChest => {
                if self.is_satisfied(&set, ctx) {
                    return set;
                }
                let Some((num, den, target, _)) = self.ratio_constraint(ctx) else {
                    return set;
                };
                let keep = if *self == Correction::ShoulderToChest { 0.8 } else { 0.85 };
                let current = set[num];
                let blended = round_tenth(keep * current + (1.0 - keep) * set[den] * target);
                debug!(step = self.name(), from = current, to = blended, "ratio blend");
                set.set(num, blended);
            }
            Correction::ThighToHip => {
                if self.is_satisfied(&set, ctx) {
                    return set;
                }
                if let Some(hips) = set.get(Hips) {
                    let replaced = round_tenth(hips * ctx.references.thigh_to_hip);
                    debug!(step = self.name(), to = replaced, "thigh replaced");
                    set.set(Thigh, replaced);
                }
            }
            Correction::DepthBonus => {
                if ctx.has_side_image {
                    for girth in Measurement::DEPTH_GIRTHS {
                        scale(&mut set, girth, DEPTH_BONUS);
                    }
                }
            }
            Correction::DerivedGirths => {
                let p = ctx.proportions;
                if let Some(chest) = set.get(Chest) {
                    set.set(UpperArm, round_tenth(chest * p.upper_arm_to_chest));
                    set.set(Forearm, round_tenth(chest * p.forearm_to_chest));
                }
                if let Some(thigh) = set.get(Thigh) {
                    set.set(Calf, round_tenth(thigh * p.calf_to_thigh));
                }
            }
            Correction::BmiEstimate => {
                if let (Some(chest), Some(waist), Some(hips)) =
                    (set.get(Chest), set.get(Waist), set.get(Hips))
                {
                    set.set(EstimatedBmi, estimate_bmi(chest, waist, hips, ctx.height_cm));
                }
            }
            Correction::RecordHeight => set.set(Height, ctx.height_cm),
            Correction::HeightBands => {
                let height = ctx.height_cm;
                for (measurement, band) in ctx.proportions.bands.iter() {
                    let Some(value) = set.get(*measurement) else {
                        continue;
                    };
                    let ratio = value / height;
                    // Round inward so the clamped value stays inside the band.
                    // Bands narrower than 0.1 cm (toy heights) give way to positivity.
                    let clamped = if ratio < band.min {
                        ceil_tenth(height * band.min).max(MIN_LENGTH_CM)
                    } else if ratio > band.max {
                        floor_tenth(height * band.max).max(MIN_LENGTH_CM)
                    } else {
                        continue;
                    };
                    debug!(measurement = measurement.name(), from = value, to = clamped, "height band clamp");
                    set.set(*measurement, clamped);
                }
            }
        }
        set
    }
}

/// Run the ratio corrections once, in order. Each step reads the values
/// left by the steps before it and fires at most once, so a blend that
/// only closes part of the gap may leave its ratio outside tolerance.
pub fn reconcile(mut set: MeasurementSet, ctx: &CorrectionContext<'_>) -> MeasurementSet {
    for step in Correction::RECONCILIATION {
        set = step.apply(set, ctx);
    }
    set
}

/// Volume-proxy BMI, clamped to [18.5, 35]. Not a clinical BMI.
///
/// Degenerate inputs (zero volume over a vanishing height) report the
/// lower bound.
pub fn estimate_bmi(chest: f64, waist: f64, hips: f64, height_cm: f64) -> f64 {
    let volume_proxy = chest * waist * hips / 1000.0;
    let height_m = height_cm / 100.0;
    // Dividing twice keeps height_m² from overflowing
    let bmi = round_tenth(volume_proxy / height_m / height_m);
    if bmi.is_nan() {
        return BMI_MIN;
    }
    bmi.clamp(BMI_MIN, BMI_MAX)
}

fn scale(set: &mut MeasurementSet, measurement: Measurement, factor: f64) {
    if let Some(value) = set.get(measurement) {
        set.set(measurement, round_tenth(value * factor));
    }
}

/// Round to one decimal place.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// The epsilon absorbs representation error such as 72.6 -> 72.5999...
fn ceil_tenth(value: f64) -> f64 {
    (value * 10.0 - 1e-9).ceil() / 10.0
}

fn floor_tenth(value: f64) -> f64 {
    (value * 10.0 + 1e-9).floor() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proportions::{FEMALE, MALE};
    use Measurement::*;

    fn male_ctx(height: f64, wp: f64, side: bool) -> CorrectionContext<'static> {
        CorrectionContext::new(&MALE, height, 0.0, wp, side)
    }

    #[test]
    fn rounding_helpers() {
        assert_eq!(round_tenth(91.84), 91.8);
        assert_eq!(round_tenth(91.86), 91.9);
        assert_eq!(ceil_tenth(84.61), 84.7);
        assert_eq!(floor_tenth(99.09), 99.0);
        assert_eq!(floor_tenth(165.0 * 0.44), 72.6);
    }

    #[test]
    fn waist_boost_only_above_threshold() {
        let set = MeasurementSet::new().with(Waist, 80.0);

        let ctx = male_ctx(180.0, 0.6, false);
        let out = Correction::WaistProminenceBoost.apply(set.clone(), &ctx);
        assert_eq!(out[Waist], 80.0);

        let ctx = male_ctx(180.0, 0.8, false);
        let out = Correction::WaistProminenceBoost.apply(set, &ctx);
        // 80 * (1 + 0.3 * 0.1) = 82.4
        assert!((out[Waist] - 82.4).abs() < 1e-9);
    }

    #[test]
    fn correlated_nudge_scales_chest_and_hips() {
        let set = MeasurementSet::new().with(Chest, 100.0).with(Hips, 100.0);
        let ctx = male_ctx(180.0, 0.75, false);
        let out = Correction::CorrelatedNudge.apply(set, &ctx);
        // chest * (1 + 0.2 * 0.07), hips * (1 + 0.2 * 0.05)
        assert!((out[Chest] - 101.4).abs() < 1e-9);
        assert!((out[Hips] - 101.0).abs() < 1e-9);
    }

    #[test]
    fn chest_to_waist_blends_toward_reference() {
        // Reference at wp 0.5 is 1.18 - 0.1 = 1.08
        let ctx = male_ctx(180.0, 0.5, false);
        let set = MeasurementSet::new().with(Chest, 100.0).with(Waist, 80.0);
        assert!(!Correction::ChestToWaist.is_satisfied(&set, &ctx));

        let out = Correction::ChestToWaist.apply(set, &ctx);
        // 0.85 * 100 + 0.15 * 80 * 1.08 = 97.96 -> 98.0
        assert!((out[Chest] - 98.0).abs() < 1e-9);
        assert_eq!(out[Waist], 80.0);
    }

    #[test]
    fn ratio_within_tolerance_is_left_alone() {
        let ctx = male_ctx(180.0, 0.5, false);
        let set = MeasurementSet::new().with(Chest, 87.0).with(Waist, 80.0);
        let out = Correction::ChestToWaist.apply(set.clone(), &ctx);
        assert_eq!(out, set);
    }

    #[test]
    fn shoulder_uses_wider_blend() {
        // Reference 0.465 at zero body type factor
        let ctx = male_ctx(180.0, 0.5, false);
        let set = MeasurementSet::new().with(Shoulder, 50.0).with(Chest, 90.0);
        let out = Correction::ShoulderToChest.apply(set, &ctx);
        // 0.8 * 50 + 0.2 * 90 * 0.465 = 48.37 -> 48.4
        assert!((out[Shoulder] - 48.4).abs() < 1e-9);
    }

    #[test]
    fn thigh_is_replaced_not_blended() {
        let ctx = CorrectionContext::new(&FEMALE, 165.0, 0.0, 0.5, false);
        let set = MeasurementSet::new().with(Thigh, 40.0).with(Hips, 90.0);
        let out = Correction::ThighToHip.apply(set, &ctx);
        // 90 * 0.62
        assert!((out[Thigh] - 55.8).abs() < 1e-9);
    }

    #[test]
    fn missing_inputs_are_skipped() {
        let ctx = male_ctx(180.0, 0.9, true);
        let set = MeasurementSet::new().with(Neck, 35.0);
        for step in Correction::PRE_RECONCILIATION
            .into_iter()
            .chain(Correction::RECONCILIATION)
            .chain([Correction::DepthBonus, Correction::DerivedGirths, Correction::BmiEstimate])
        {
            assert_eq!(step.apply(set.clone(), &ctx), set, "{}", step.name());
        }
    }

    #[test]
    fn reconcile_is_a_single_ordered_pass() {
        let ctx = CorrectionContext::new(&FEMALE, 165.0, 0.0, 0.8, false);
        let set = MeasurementSet::new()
            .with(Chest, 84.8)
            .with(Waist, 71.4)
            .with(Hips, 92.7)
            .with(Shoulder, 37.1)
            .with(Thigh, 54.5);
        assert!(!Correction::ChestToWaist.is_satisfied(&set, &ctx));
        assert!(!Correction::WaistToHip.is_satisfied(&set, &ctx));

        let mut by_hand = set.clone();
        for step in Correction::RECONCILIATION {
            by_hand = step.apply(by_hand, &ctx);
        }
        let out = reconcile(set.clone(), &ctx);
        assert_eq!(out, by_hand);

        // c2w reference 1.02: 0.85 * 84.8 + 0.15 * 71.4 * 1.02 = 83.00 -> 83.0
        assert!((out[Chest] - 83.0).abs() < 1e-9);
        // w2h reference 0.916: 0.85 * 71.4 + 0.15 * 92.7 * 0.916 = 73.43 -> 73.4
        assert!((out[Waist] - 73.4).abs() < 1e-9);
        // One blend closes only part of the gap
        assert!(!Correction::WaistToHip.is_satisfied(&out, &ctx));
        // Hips anchor the chain and are never touched
        assert_eq!(out[Hips], 92.7);
    }

    #[test]
    fn fired_steps_move_toward_reference() {
        let ctx = CorrectionContext::new(&FEMALE, 165.0, 0.0, 0.8, false);
        let mut set = MeasurementSet::new()
            .with(Chest, 84.8)
            .with(Waist, 71.4)
            .with(Hips, 92.7)
            .with(Shoulder, 30.0)
            .with(Thigh, 54.5);
        let refs = ctx.references;
        let constraints = [
            (Chest, Waist, refs.chest_to_waist),
            (Waist, Hips, refs.waist_to_hip),
            (Shoulder, Chest, refs.shoulder_to_chest),
            (Thigh, Hips, refs.thigh_to_hip),
        ];
        for (step, (num, den, target)) in Correction::RECONCILIATION.into_iter().zip(constraints) {
            let before = (set.ratio(num, den).unwrap() - target).abs();
            let fired = !step.is_satisfied(&set, &ctx);
            set = step.apply(set, &ctx);
            let after = (set.ratio(num, den).unwrap() - target).abs();
            if fired {
                assert!(after < before, "{}: {before} -> {after}", step.name());
            } else {
                assert_eq!(after, before);
            }
        }
    }

    #[test]
    fn depth_bonus_requires_side_image() {
        let set = MeasurementSet::new()
            .with(Chest, 100.0)
            .with(Waist, 80.0)
            .with(Hips, 100.0)
            .with(Thigh, 60.0);

        let out = Correction::DepthBonus.apply(set.clone(), &male_ctx(180.0, 0.5, false));
        assert_eq!(out, set);

        let out = Correction::DepthBonus.apply(set, &male_ctx(180.0, 0.5, true));
        assert!((out[Chest] - 103.0).abs() < 1e-9);
        assert!((out[Waist] - 82.4).abs() < 1e-9);
        assert!((out[Hips] - 103.0).abs() < 1e-9);
        assert_eq!(out[Thigh], 60.0);
    }

    #[test]
    fn derived_girths_use_gender_ratios() {
        let set = MeasurementSet::new().with(Chest, 100.0).with(Thigh, 60.0);

        let male = Correction::DerivedGirths.apply(set.clone(), &male_ctx(180.0, 0.5, false));
        assert!((male[UpperArm] - 32.0).abs() < 1e-9);
        assert!((male[Forearm] - 26.0).abs() < 1e-9);
        assert!((male[Calf] - 43.2).abs() < 1e-9);

        let ctx = CorrectionContext::new(&FEMALE, 165.0, 0.0, 0.5, false);
        let female = Correction::DerivedGirths.apply(set, &ctx);
        assert!((female[UpperArm] - 30.0).abs() < 1e-9);
        assert!((female[Forearm] - 24.0).abs() < 1e-9);
        assert!((female[Calf] - 42.0).abs() < 1e-9);
    }

    #[test]
    fn bmi_is_clamped() {
        assert_eq!(estimate_bmi(100.0, 90.0, 100.0, 180.0), BMI_MAX);
        assert_eq!(estimate_bmi(10.0, 10.0, 10.0, 180.0), BMI_MIN);
        // 60 * 50 * 60 / 1000 = 180; / 3.24 = 55.6 -> clamped
        assert_eq!(estimate_bmi(60.0, 50.0, 60.0, 180.0), BMI_MAX);
        // 40 * 35 * 40 / 1000 = 56; / 3.24 = 17.3 -> clamped
        assert_eq!(estimate_bmi(40.0, 35.0, 40.0, 180.0), BMI_MIN);
        // 50 * 40 * 50 / 1000 = 100; / 4.0 = 25.0
        assert!((estimate_bmi(50.0, 40.0, 50.0, 200.0) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn bmi_survives_extreme_heights() {
        // The volume proxy is infinite at these scales
        assert_eq!(estimate_bmi(0.51e200, 0.45e200, 0.52e200, 1e200), BMI_MAX);
        assert_eq!(estimate_bmi(0.51e307, 0.45e307, 0.52e307, 1e307), BMI_MAX);
        // 0 / 0
        assert_eq!(estimate_bmi(0.0, 0.0, 0.0, 0.0), BMI_MIN);
    }

    #[test]
    fn height_bands_clamp_both_ways() {
        let ctx = male_ctx(180.0, 0.5, false);
        let set = MeasurementSet::new()
            .with(Chest, 120.0)
            .with(Neck, 20.0)
            .with(Sleeve, 61.2)
            .with(Height, 180.0)
            .with(EstimatedBmi, 35.0);
        let out = Correction::HeightBands.apply(set, &ctx);

        assert!((out[Chest] - 99.0).abs() < 1e-9);
        assert!((out[Neck] - 32.4).abs() < 1e-9);
        assert_eq!(out[Sleeve], 61.2);
        assert_eq!(out[Height], 180.0);
        assert_eq!(out[EstimatedBmi], 35.0);
    }

    #[test]
    fn clamped_lengths_stay_positive_for_toy_heights() {
        // 0.3 cm tall: the neck band tops out at 0.063 cm, which floors to 0.0
        let ctx = male_ctx(0.3, 0.5, false);
        let set = MeasurementSet::new().with(Neck, 0.1).with(Chest, 0.0);
        let out = Correction::HeightBands.apply(set, &ctx);
        assert_eq!(out[Neck], MIN_LENGTH_CM);
        // 0.3 * 0.47 = 0.141 rounds up to 0.2
        assert!((out[Chest] - 0.2).abs() < 1e-9);
    }

    #[test]
    fn pipeline_order_is_fixed() {
        let names: Vec<_> = Correction::PRE_RECONCILIATION
            .iter()
            .chain(Correction::RECONCILIATION.iter())
            .chain(Correction::POST_RECONCILIATION.iter())
            .map(|c| c.name())
            .collect();
        assert_eq!(
            names,
            [
                "waist-prominence-boost",
                "correlated-nudge",
                "chest-to-waist",
                "waist-to-hip",
                "shoulder-to-chest",
                "thigh-to-hip",
                "depth-bonus",
                "derived-girths",
                "bmi-estimate",
                "record-height",
                "height-bands",
            ]
        );
    }
}
