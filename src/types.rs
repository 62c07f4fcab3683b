use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Gender category selecting the proportion tables.
///
/// Parsing from free text is case-insensitive and lenient: anything that is
/// not `male` or `female` selects the blended [`Gender::Other`] tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Other,
}

impl Gender {
    /// Lenient mapping used by the generator and request decoding.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "male" => Gender::Male,
            "female" => Gender::Female,
            _ => Gender::Other,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl From<String> for Gender {
    fn from(label: String) -> Self {
        Gender::from_label(&label)
    }
}

/// Strict parsing, for surfaces that should reject typos instead of
/// silently blending.
impl FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(Error::InvalidGender(s.to_string())),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit system the caller supplied the height in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub const CM_PER_INCH: f64 = 2.54;

    /// Convert a length in this unit system (cm or inches) to centimeters.
    pub fn to_centimeters(&self, value: f64) -> f64 {
        match self {
            UnitSystem::Metric => value,
            UnitSystem::Imperial => value * Self::CM_PER_INCH,
        }
    }
}

impl FromStr for UnitSystem {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            _ => Err(Error::InvalidUnitSystem(s.to_string())),
        }
    }
}

/// The fixed vocabulary of output measurements.
///
/// Serialized names match the JSON contract (`upperArm`, `estimatedBMI`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Measurement {
    Chest,
    Waist,
    Hips,
    Inseam,
    Shoulder,
    Sleeve,
    Neck,
    Thigh,
    UpperArm,
    Forearm,
    Calf,
    Height,
    #[serde(rename = "estimatedBMI")]
    EstimatedBmi,
}

impl Measurement {
    /// Measurements generated directly from height ratios.
    pub const PRIMARY: [Measurement; 8] = [
        Measurement::Chest,
        Measurement::Waist,
        Measurement::Hips,
        Measurement::Inseam,
        Measurement::Shoulder,
        Measurement::Sleeve,
        Measurement::Neck,
        Measurement::Thigh,
    ];

    /// Girths that benefit from a second (side) view.
    pub const DEPTH_GIRTHS: [Measurement; 3] =
        [Measurement::Chest, Measurement::Waist, Measurement::Hips];

    pub const ALL: [Measurement; 13] = [
        Measurement::Chest,
        Measurement::Waist,
        Measurement::Hips,
        Measurement::Inseam,
        Measurement::Shoulder,
        Measurement::Sleeve,
        Measurement::Neck,
        Measurement::Thigh,
        Measurement::UpperArm,
        Measurement::Forearm,
        Measurement::Calf,
        Measurement::Height,
        Measurement::EstimatedBmi,
    ];

    pub const fn name(&self) -> &'static str {
        match self {
            Measurement::Chest => "chest",
            Measurement::Waist => "waist",
            Measurement::Hips => "hips",
            Measurement::Inseam => "inseam",
            Measurement::Shoulder => "shoulder",
            Measurement::Sleeve => "sleeve",
            Measurement::Neck => "neck",
            Measurement::Thigh => "thigh",
            Measurement::UpperArm => "upperArm",
            Measurement::Forearm => "forearm",
            Measurement::Calf => "calf",
            Measurement::Height => "height",
            Measurement::EstimatedBmi => "estimatedBMI",
        }
    }

    /// Whether the value is a length in centimeters (everything except BMI).
    pub const fn is_length(&self) -> bool {
        !matches!(self, Measurement::EstimatedBmi)
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Mapping from measurement to value (cm, BMI unitless).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeasurementSet {
    values: BTreeMap<Measurement, f64>,
}

impl MeasurementSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, measurement: Measurement) -> Option<f64> {
        self.values.get(&measurement).copied()
    }

    pub fn set(&mut self, measurement: Measurement, value: f64) {
        self.values.insert(measurement, value);
    }

    /// Builder-style insert, handy for constructing sets in tests.
    pub fn with(mut self, measurement: Measurement, value: f64) -> Self {
        self.set(measurement, value);
        self
    }

    pub fn contains(&self, measurement: Measurement) -> bool {
        self.values.contains_key(&measurement)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Measurement, f64)> + '_ {
        self.values.iter().map(|(m, v)| (*m, *v))
    }

    /// Ratio between two measurements, if both are present and the
    /// denominator is positive.
    pub fn ratio(&self, numerator: Measurement, denominator: Measurement) -> Option<f64> {
        let n = self.get(numerator)?;
        let d = self.get(denominator)?;
        (d > 0.0).then(|| n / d)
    }
}

impl std::ops::Index<Measurement> for MeasurementSet {
    type Output = f64;

    fn index(&self, measurement: Measurement) -> &Self::Output {
        &self.values[&measurement]
    }
}

impl FromIterator<(Measurement, f64)> for MeasurementSet {
    fn from_iter<T: IntoIterator<Item = (Measurement, f64)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Coarse body-shape indicators derived from image brightness bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyShapeSignal {
    /// Deviation of the outer bands from the middle band.
    pub body_type_factor: f64,
    /// 0.5 is neutral; lower means a narrower waist, higher a fuller one.
    pub waist_prominence: f64,
    /// Image width over height. Diagnostic only.
    pub width_to_height_ratio: f64,
}

impl BodyShapeSignal {
    pub const NEUTRAL: Self = Self {
        body_type_factor: 0.0,
        waist_prominence: 0.5,
        width_to_height_ratio: 0.5,
    };

    pub const fn new(body_type_factor: f64, waist_prominence: f64) -> Self {
        Self {
            body_type_factor,
            waist_prominence,
            width_to_height_ratio: 0.5,
        }
    }
}

impl Default for BodyShapeSignal {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Measurements plus a confidence figure in [0, 0.98].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementResult {
    pub measurements: MeasurementSet,
    pub confidence: f64,
}
