//! Measurement generation from height, gender and body-shape signal.
//!
//! The generator is a pure function of its inputs apart from the jitter
//! source, which is injected so callers can pick a seeded, thread-local or
//! disabled source.

use std::f64::consts::FRAC_PI_2;

use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::correction::{reconcile, round_tenth, Correction, CorrectionContext};
use crate::error::{Error, Result};
use crate::proportions::Proportions;
use crate::types::{BodyShapeSignal, Gender, Measurement, MeasurementSet};

/// Body-type factor range accepted by the proportion tables.
pub const BODY_TYPE_FACTOR_LIMIT: f64 = 0.2;

/// Tallest accepted height. Anything above is a unit mix-up or garbage input.
pub const MAX_HEIGHT_CM: f64 = 300.0;

/// Default half-width of the multiplicative jitter.
pub const DEFAULT_JITTER_EPSILON: f64 = 0.001;

/// Scale of the sine-shaped waist adjustment.
const WAIST_SHAPE_SCALE: f64 = 0.025;

/// Source of the multiplicative jitter applied to each raw measurement.
pub trait JitterSource {
    /// A factor close to 1.0.
    fn factor(&mut self) -> f64;
}

/// Disables jitter; every factor is exactly 1.0.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl JitterSource for NoJitter {
    fn factor(&mut self) -> f64 {
        1.0
    }
}

/// Factors drawn uniformly from `[1 - epsilon, 1 + epsilon]`.
#[derive(Debug, Clone)]
pub struct UniformJitter<R> {
    rng: R,
    epsilon: f64,
}

impl<R: Rng> UniformJitter<R> {
    pub fn new(rng: R, epsilon: f64) -> Self {
        Self {
            rng,
            epsilon: epsilon.abs(),
        }
    }
}

impl UniformJitter<StdRng> {
    /// Reproducible jitter for a given seed.
    pub fn seeded(seed: u64, epsilon: f64) -> Self {
        Self::new(StdRng::seed_from_u64(seed), epsilon)
    }
}

impl UniformJitter<ThreadRng> {
    pub fn from_entropy(epsilon: f64) -> Self {
        Self::new(rand::thread_rng(), epsilon)
    }
}

impl<R: Rng> JitterSource for UniformJitter<R> {
    fn factor(&mut self) -> f64 {
        if self.epsilon == 0.0 || !self.epsilon.is_finite() {
            return 1.0;
        }
        self.rng.gen_range(1.0 - self.epsilon..=1.0 + self.epsilon)
    }
}

impl<J: JitterSource + ?Sized> JitterSource for Box<J> {
    fn factor(&mut self) -> f64 {
        (**self).factor()
    }
}

/// Accept heights in (0, 300] cm.
pub fn validate_height(height_cm: f64) -> Result<f64> {
    if !height_cm.is_finite() || height_cm <= 0.0 {
        return Err(Error::InvalidHeight(format!(
            "{height_cm} cm (must be a positive number)"
        )));
    }
    if height_cm > MAX_HEIGHT_CM {
        return Err(Error::InvalidHeight(format!(
            "{height_cm} cm (must not exceed {MAX_HEIGHT_CM} cm)"
        )));
    }
    Ok(height_cm)
}

/// Signal values as consumed by the tables: body-type factor clamped to
/// [-0.2, 0.2], non-finite inputs replaced by the neutral values.
pub fn normalize_signal(signal: &BodyShapeSignal) -> (f64, f64) {
    let neutral = BodyShapeSignal::NEUTRAL;
    let factor = if signal.body_type_factor.is_finite() {
        signal.body_type_factor
    } else {
        warn!(value = signal.body_type_factor, "non-finite body type factor, using neutral");
        neutral.body_type_factor
    };
    let prominence = if signal.waist_prominence.is_finite() {
        signal.waist_prominence
    } else {
        warn!(value = signal.waist_prominence, "non-finite waist prominence, using neutral");
        neutral.waist_prominence
    };
    (
        factor.clamp(-BODY_TYPE_FACTOR_LIMIT, BODY_TYPE_FACTOR_LIMIT),
        prominence,
    )
}

/// Raw primary measurements: height times the (shape-adjusted) table ratio
/// times jitter, rounded to one decimal.
pub fn raw_measurements<J: JitterSource + ?Sized>(
    proportions: &Proportions,
    height_cm: f64,
    body_type_factor: f64,
    waist_prominence: f64,
    jitter: &mut J,
) -> MeasurementSet {
    let waist_shape =
        (waist_prominence - 0.5) * (body_type_factor * FRAC_PI_2).sin() * WAIST_SHAPE_SCALE;

    proportions
        .ratios
        .iter()
        .map(|term| {
            let ratio = term.evaluate(body_type_factor, waist_prominence);
            let adjustment = if term.measurement == Measurement::Waist {
                waist_shape
            } else {
                0.0
            };
            let value = round_tenth(height_cm * ratio * (1.0 + adjustment) * jitter.factor());
            (term.measurement, value)
        })
        .collect()
}

/// Generate a complete, self-consistent measurement set.
///
/// # Arguments
///
/// * `gender` - Selects the proportion table
/// * `height_cm` - Body height in centimeters, must be positive and finite
/// * `has_side_image` - Applies the depth bonus to chest, waist and hips
/// * `signal` - Body-shape signal from the front image
/// * `jitter` - Source of per-measurement variance
///
/// # Errors
///
/// Returns [`Error::InvalidHeight`] for non-finite, non-positive or
/// implausibly large (over 300 cm) heights.
pub fn generate_measurements<J: JitterSource + ?Sized>(
    gender: Gender,
    height_cm: f64,
    has_side_image: bool,
    signal: &BodyShapeSignal,
    jitter: &mut J,
) -> Result<MeasurementSet> {
    validate_height(height_cm)?;

    let proportions = Proportions::for_gender(gender);
    let (factor, prominence) = normalize_signal(signal);
    debug!(%gender, height_cm, factor, prominence, has_side_image, "generating measurements");

    let ctx = CorrectionContext::new(proportions, height_cm, factor, prominence, has_side_image);

    let mut set = raw_measurements(proportions, height_cm, factor, prominence, jitter);
    for step in Correction::PRE_RECONCILIATION {
        set = step.apply(set, &ctx);
    }
    set = reconcile(set, &ctx);
    for step in Correction::POST_RECONCILIATION {
        set = step.apply(set, &ctx);
    }

    Ok(set)
}
