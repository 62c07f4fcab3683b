//! Clothing size recommendations from estimated measurements.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Gender, Measurement, MeasurementSet};

/// Standard letter sizes, smallest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClothingSize {
    XS,
    S,
    M,
    L,
    XL,
    XXL,
}

impl ClothingSize {
    pub const ALL: [ClothingSize; 6] = [
        ClothingSize::XS,
        ClothingSize::S,
        ClothingSize::M,
        ClothingSize::L,
        ClothingSize::XL,
        ClothingSize::XXL,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// One size up, saturating at XXL.
    pub fn larger(self) -> Self {
        Self::ALL[(self.index() + 1).min(Self::ALL.len() - 1)]
    }

    /// One size down, saturating at XS.
    pub fn smaller(self) -> Self {
        Self::ALL[self.index().saturating_sub(1)]
    }

    pub fn fit_description(self) -> &'static str {
        match self {
            ClothingSize::XS | ClothingSize::S => "Slim fit",
            ClothingSize::M => "Regular fit",
            ClothingSize::L => "Relaxed fit",
            ClothingSize::XL | ClothingSize::XXL => "Loose fit",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ClothingSize::XS => "XS",
            ClothingSize::S => "S",
            ClothingSize::M => "M",
            ClothingSize::L => "L",
            ClothingSize::XL => "XL",
            ClothingSize::XXL => "XXL",
        }
    }
}

impl fmt::Display for ClothingSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recommended size per garment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeRecommendation {
    pub tshirt: ClothingSize,
    pub shirt: ClothingSize,
    pub pants: ClothingSize,
    pub jacket: ClothingSize,
}

/// Upper (exclusive) bounds in cm for XS through XL; anything above is XXL.
type SizeChart = [f64; 5];

const MALE_CHEST: SizeChart = [86.0, 94.0, 102.0, 110.0, 118.0];
const FEMALE_CHEST: SizeChart = [82.0, 88.0, 94.0, 100.0, 108.0];
const NEUTRAL_CHEST: SizeChart = [84.0, 92.0, 100.0, 108.0, 116.0];

const MALE_WAIST: SizeChart = [74.0, 82.0, 90.0, 98.0, 108.0];
const FEMALE_WAIST: SizeChart = [64.0, 70.0, 78.0, 88.0, 98.0];
const NEUTRAL_WAIST: SizeChart = [70.0, 78.0, 86.0, 96.0, 106.0];

/// Shoulder difference from the average that shifts shirt and jacket sizes.
const SHOULDER_SHIFT_CM: f64 = 4.0;

fn average_shoulder(gender: Gender) -> f64 {
    match gender {
        Gender::Male => 45.0,
        Gender::Female => 39.0,
        Gender::Other => 42.0,
    }
}

fn lookup(chart: &SizeChart, value: Option<f64>) -> ClothingSize {
    let Some(value) = value else {
        return ClothingSize::M;
    };
    chart
        .iter()
        .position(|&upper| value < upper)
        .map_or(ClothingSize::XXL, |i| ClothingSize::ALL[i])
}

/// Recommend sizes from chest, waist and shoulder.
///
/// Missing chest or waist values fall back to M.
pub fn recommend_sizes(measurements: &MeasurementSet, gender: Gender) -> SizeRecommendation {
    let (chest_chart, waist_chart) = match gender {
        Gender::Male => (&MALE_CHEST, &MALE_WAIST),
        Gender::Female => (&FEMALE_CHEST, &FEMALE_WAIST),
        Gender::Other => (&NEUTRAL_CHEST, &NEUTRAL_WAIST),
    };

    let upper = lookup(chest_chart, measurements.get(Measurement::Chest));
    let pants = lookup(waist_chart, measurements.get(Measurement::Waist));

    let shirt = match measurements.get(Measurement::Shoulder) {
        Some(shoulder) => {
            let diff = shoulder - average_shoulder(gender);
            if diff > SHOULDER_SHIFT_CM {
                upper.larger()
            } else if diff < -SHOULDER_SHIFT_CM {
                upper.smaller()
            } else {
                upper
            }
        }
        None => upper,
    };

    SizeRecommendation {
        tshirt: upper,
        shirt,
        pants,
        jacket: shirt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(chest: f64, waist: f64, shoulder: f64) -> MeasurementSet {
        MeasurementSet::new()
            .with(Measurement::Chest, chest)
            .with(Measurement::Waist, waist)
            .with(Measurement::Shoulder, shoulder)
    }

    #[test]
    fn chart_bounds_are_half_open() {
        assert_eq!(lookup(&MALE_CHEST, Some(85.9)), ClothingSize::XS);
        assert_eq!(lookup(&MALE_CHEST, Some(86.0)), ClothingSize::S);
        assert_eq!(lookup(&MALE_CHEST, Some(117.9)), ClothingSize::XL);
        assert_eq!(lookup(&MALE_CHEST, Some(118.0)), ClothingSize::XXL);
        assert_eq!(lookup(&MALE_CHEST, None), ClothingSize::M);
    }

    #[test]
    fn average_male_gets_medium() {
        let sizes = recommend_sizes(&set(98.0, 85.0, 45.0), Gender::Male);
        assert_eq!(sizes.tshirt, ClothingSize::M);
        assert_eq!(sizes.shirt, ClothingSize::M);
        assert_eq!(sizes.jacket, ClothingSize::M);
        assert_eq!(sizes.pants, ClothingSize::M);
    }

    #[test]
    fn broad_shoulders_size_up_shirts_only() {
        let sizes = recommend_sizes(&set(98.0, 85.0, 50.0), Gender::Male);
        assert_eq!(sizes.tshirt, ClothingSize::M);
        assert_eq!(sizes.shirt, ClothingSize::L);
        assert_eq!(sizes.jacket, ClothingSize::L);
    }

    #[test]
    fn narrow_shoulders_size_down_and_saturate() {
        let sizes = recommend_sizes(&set(80.0, 60.0, 30.0), Gender::Female);
        assert_eq!(sizes.tshirt, ClothingSize::XS);
        assert_eq!(sizes.shirt, ClothingSize::XS);
        assert_eq!(sizes.pants, ClothingSize::XS);
    }

    #[test]
    fn gender_selects_chart() {
        // 90 cm chest: male S, female M, neutral S
        let m = set(90.0, 80.0, 42.0);
        assert_eq!(recommend_sizes(&m, Gender::Male).tshirt, ClothingSize::S);
        assert_eq!(recommend_sizes(&m, Gender::Female).tshirt, ClothingSize::M);
        assert_eq!(recommend_sizes(&m, Gender::Other).tshirt, ClothingSize::S);
    }

    #[test]
    fn size_steps_saturate() {
        assert_eq!(ClothingSize::XXL.larger(), ClothingSize::XXL);
        assert_eq!(ClothingSize::XS.smaller(), ClothingSize::XS);
        assert_eq!(ClothingSize::M.larger(), ClothingSize::L);
    }

    #[test]
    fn fit_descriptions() {
        assert_eq!(ClothingSize::S.fit_description(), "Slim fit");
        assert_eq!(ClothingSize::M.fit_description(), "Regular fit");
        assert_eq!(ClothingSize::L.fit_description(), "Relaxed fit");
        assert_eq!(ClothingSize::XXL.fit_description(), "Loose fit");
    }
}
