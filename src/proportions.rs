//! Anthropometric proportion tables.
//!
//! Each gender carries height ratios for the eight primary measurements,
//! reference ratios between girths, ratios for the derived limb girths, and
//! the per-measurement height bands used by the final validation pass.
//! The `Other` table is a blend of the male and female tables.

use crate::types::{Gender, Measurement};

/// Height ratio for one primary measurement: `base + factor * slope`, where
/// `factor` is the clamped body-type factor (additionally multiplied by the
/// waist prominence when `prominence_weighted` is set).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioTerm {
    pub measurement: Measurement,
    pub base: f64,
    pub body_type_slope: f64,
    pub prominence_weighted: bool,
}

impl RatioTerm {
    const fn new(measurement: Measurement, base: f64, body_type_slope: f64) -> Self {
        Self {
            measurement,
            base,
            body_type_slope,
            prominence_weighted: false,
        }
    }

    const fn weighted(measurement: Measurement, base: f64, body_type_slope: f64) -> Self {
        Self {
            measurement,
            base,
            body_type_slope,
            prominence_weighted: true,
        }
    }

    pub fn evaluate(&self, body_type_factor: f64, waist_prominence: f64) -> f64 {
        let mut delta = body_type_factor * self.body_type_slope;
        if self.prominence_weighted {
            delta *= waist_prominence;
        }
        self.base + delta
    }
}

/// Linear reference ratio `base + slope * driver`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LinearRatio {
    base: f64,
    slope: f64,
}

impl LinearRatio {
    const fn new(base: f64, slope: f64) -> Self {
        Self { base, slope }
    }

    fn at(&self, driver: f64) -> f64 {
        self.base + self.slope * driver
    }
}

/// Allowed range of `measurement / height`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightBand {
    pub min: f64,
    pub max: f64,
}

impl HeightBand {
    const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, ratio: f64) -> bool {
        ratio >= self.min && ratio <= self.max
    }
}

/// Target ratios that the reconciliation stage pulls measurements toward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceRatios {
    pub chest_to_waist: f64,
    pub waist_to_hip: f64,
    pub shoulder_to_chest: f64,
    pub thigh_to_hip: f64,
}

/// Complete proportion table for one gender.
#[derive(Debug, Clone, PartialEq)]
pub struct Proportions {
    pub gender: Gender,
    pub ratios: [RatioTerm; 8],
    /// Driven by waist prominence (decreasing).
    chest_to_waist: LinearRatio,
    /// Driven by waist prominence (increasing).
    waist_to_hip: LinearRatio,
    /// Driven by body-type factor (decreasing).
    shoulder_to_chest: LinearRatio,
    pub ideal_thigh_to_hip: f64,
    pub upper_arm_to_chest: f64,
    pub forearm_to_chest: f64,
    pub calf_to_thigh: f64,
    pub bands: [(Measurement, HeightBand); 11],
}

impl Proportions {
    pub fn for_gender(gender: Gender) -> &'static Proportions {
        match gender {
            Gender::Male => &MALE,
            Gender::Female => &FEMALE,
            Gender::Other => &OTHER,
        }
    }

    /// Height ratio for a primary measurement; `None` for derived ones.
    pub fn base_ratio(
        &self,
        measurement: Measurement,
        body_type_factor: f64,
        waist_prominence: f64,
    ) -> Option<f64> {
        self.ratios
            .iter()
            .find(|term| term.measurement == measurement)
            .map(|term| term.evaluate(body_type_factor, waist_prominence))
    }

    pub fn reference_ratios(&self, body_type_factor: f64, waist_prominence: f64) -> ReferenceRatios {
        ReferenceRatios {
            chest_to_waist: self.chest_to_waist.at(waist_prominence),
            waist_to_hip: self.waist_to_hip.at(waist_prominence),
            shoulder_to_chest: self.shoulder_to_chest.at(body_type_factor),
            thigh_to_hip: self.ideal_thigh_to_hip,
        }
    }

    pub fn band(&self, measurement: Measurement) -> Option<HeightBand> {
        self.bands
            .iter()
            .find(|(m, _)| *m == measurement)
            .map(|(_, band)| *band)
    }
}

use Measurement::*;

pub static MALE: Proportions = Proportions {
    gender: Gender::Male,
    ratios: [
        RatioTerm::new(Chest, 0.51, 0.04),
        RatioTerm::weighted(Waist, 0.45, 0.06),
        RatioTerm::new(Hips, 0.52, 0.04),
        RatioTerm::new(Inseam, 0.47, -0.02),
        RatioTerm::new(Shoulder, 0.245, 0.02),
        RatioTerm::new(Sleeve, 0.34, 0.0),
        RatioTerm::new(Neck, 0.195, 0.01),
        RatioTerm::new(Thigh, 0.31, 0.03),
    ],
    chest_to_waist: LinearRatio::new(1.18, -0.2),
    waist_to_hip: LinearRatio::new(0.86, 0.18),
    shoulder_to_chest: LinearRatio::new(0.465, -0.02),
    ideal_thigh_to_hip: 0.59,
    upper_arm_to_chest: 0.32,
    forearm_to_chest: 0.26,
    calf_to_thigh: 0.72,
    bands: [
        (Chest, HeightBand::new(0.47, 0.55)),
        (Waist, HeightBand::new(0.39, 0.50)),
        (Hips, HeightBand::new(0.48, 0.57)),
        (Inseam, HeightBand::new(0.44, 0.50)),
        (Shoulder, HeightBand::new(0.22, 0.27)),
        (Sleeve, HeightBand::new(0.32, 0.36)),
        (Neck, HeightBand::new(0.18, 0.21)),
        (Thigh, HeightBand::new(0.27, 0.35)),
        (UpperArm, HeightBand::new(0.15, 0.19)),
        (Forearm, HeightBand::new(0.12, 0.15)),
        (Calf, HeightBand::new(0.19, 0.25)),
    ],
};

pub static FEMALE: Proportions = Proportions {
    gender: Gender::Female,
    ratios: [
        RatioTerm::new(Chest, 0.505, 0.035),
        RatioTerm::weighted(Waist, 0.42, 0.06),
        RatioTerm::new(Hips, 0.555, 0.03),
        RatioTerm::new(Inseam, 0.45, -0.02),
        RatioTerm::new(Shoulder, 0.225, 0.01),
        RatioTerm::new(Sleeve, 0.31, 0.0),
        RatioTerm::new(Neck, 0.165, 0.005),
        RatioTerm::new(Thigh, 0.33, 0.04),
    ],
    chest_to_waist: LinearRatio::new(1.22, -0.25),
    waist_to_hip: LinearRatio::new(0.74, 0.22),
    shoulder_to_chest: LinearRatio::new(0.44, -0.01),
    ideal_thigh_to_hip: 0.62,
    upper_arm_to_chest: 0.30,
    forearm_to_chest: 0.24,
    calf_to_thigh: 0.70,
    bands: [
        (Chest, HeightBand::new(0.46, 0.54)),
        (Waist, HeightBand::new(0.38, 0.44)),
        (Hips, HeightBand::new(0.51, 0.60)),
        (Inseam, HeightBand::new(0.42, 0.48)),
        (Shoulder, HeightBand::new(0.20, 0.25)),
        (Sleeve, HeightBand::new(0.29, 0.33)),
        (Neck, HeightBand::new(0.15, 0.18)),
        (Thigh, HeightBand::new(0.29, 0.37)),
        (UpperArm, HeightBand::new(0.14, 0.18)),
        (Forearm, HeightBand::new(0.11, 0.14)),
        (Calf, HeightBand::new(0.21, 0.26)),
    ],
};

pub static OTHER: Proportions = Proportions {
    gender: Gender::Other,
    ratios: [
        RatioTerm::new(Chest, 0.5075, 0.0375),
        RatioTerm::weighted(Waist, 0.435, 0.06),
        RatioTerm::new(Hips, 0.5375, 0.035),
        RatioTerm::new(Inseam, 0.46, -0.02),
        RatioTerm::new(Shoulder, 0.235, 0.015),
        RatioTerm::new(Sleeve, 0.325, 0.0),
        RatioTerm::new(Neck, 0.18, 0.0075),
        RatioTerm::new(Thigh, 0.32, 0.035),
    ],
    chest_to_waist: LinearRatio::new(1.20, -0.225),
    waist_to_hip: LinearRatio::new(0.80, 0.20),
    shoulder_to_chest: LinearRatio::new(0.4525, -0.015),
    ideal_thigh_to_hip: 0.62,
    upper_arm_to_chest: 0.30,
    forearm_to_chest: 0.24,
    calf_to_thigh: 0.70,
    bands: [
        (Chest, HeightBand::new(0.465, 0.545)),
        (Waist, HeightBand::new(0.385, 0.47)),
        (Hips, HeightBand::new(0.495, 0.585)),
        (Inseam, HeightBand::new(0.43, 0.49)),
        (Shoulder, HeightBand::new(0.21, 0.26)),
        (Sleeve, HeightBand::new(0.305, 0.345)),
        (Neck, HeightBand::new(0.165, 0.195)),
        (Thigh, HeightBand::new(0.28, 0.36)),
        (UpperArm, HeightBand::new(0.145, 0.185)),
        (Forearm, HeightBand::new(0.115, 0.145)),
        (Calf, HeightBand::new(0.20, 0.255)),
    ],
};
