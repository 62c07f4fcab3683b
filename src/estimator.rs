use image::DynamicImage;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::features::extract_body_shape;
use crate::generator::{
    generate_measurements, validate_height, JitterSource, NoJitter, UniformJitter,
    DEFAULT_JITTER_EPSILON,
};
use crate::quality::assess_quality;
use crate::request::MeasurementRequest;
use crate::types::{Gender, MeasurementResult};

/// Tunable parameters for [`BodyEstimator`].
///
/// # Example
///
/// ```
/// use bodyfit::EstimatorParams;
///
/// let params = EstimatorParams::default();
/// assert!((params.jitter_epsilon - 0.001).abs() < 1e-12);
///
/// // No jitter: identical inputs give identical outputs
/// let fixed = EstimatorParams::deterministic();
/// assert_eq!(fixed.jitter_epsilon, 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorParams {
    /// Half-width of the multiplicative jitter on raw measurements.
    pub jitter_epsilon: f64,

    /// Seed for the jitter source. `None` draws from thread-local entropy.
    pub seed: Option<u64>,

    /// Confidence before the image quality contribution.
    pub confidence_base: f64,

    /// Weight of the image quality score in the confidence.
    pub confidence_scale: f64,

    /// Upper bound of the reported confidence.
    pub confidence_cap: f64,
}

impl Default for EstimatorParams {
    fn default() -> Self {
        Self {
            jitter_epsilon: DEFAULT_JITTER_EPSILON,
            seed: None,
            confidence_base: 0.88,
            confidence_scale: 0.15,
            confidence_cap: 0.98,
        }
    }
}

impl EstimatorParams {
    /// Defaults with jitter disabled.
    #[must_use]
    pub fn deterministic() -> Self {
        Self {
            jitter_epsilon: 0.0,
            ..Self::default()
        }
    }

    /// Map an image quality score to the reported confidence.
    pub fn confidence(&self, quality: f64) -> f64 {
        (self.confidence_base + quality * self.confidence_scale).clamp(0.0, self.confidence_cap)
    }
}

/// Runs the full estimate: quality scoring, body-shape extraction and
/// measurement generation.
///
/// # Usage
///
/// ```no_run
/// use bodyfit::{BodyEstimator, MeasurementRequest};
///
/// let body = std::fs::read_to_string("request.json").unwrap();
/// let request: MeasurementRequest = serde_json::from_str(&body).unwrap();
/// let result = BodyEstimator::new().seed(42).estimate(&request).unwrap();
/// println!("confidence {:.2}", result.confidence);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BodyEstimator {
    params: EstimatorParams,
}

impl BodyEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: EstimatorParams) -> Self {
        Self { params }
    }

    /// Set the jitter half-width (0 disables jitter).
    pub fn jitter(mut self, epsilon: f64) -> Self {
        self.params.jitter_epsilon = epsilon;
        self
    }

    /// Seed the jitter source for reproducible output.
    pub fn seed(mut self, seed: u64) -> Self {
        self.params.seed = Some(seed);
        self
    }

    pub fn params(&self) -> &EstimatorParams {
        &self.params
    }

    fn jitter_source(&self) -> Box<dyn JitterSource> {
        let epsilon = self.params.jitter_epsilon;
        if epsilon == 0.0 {
            return Box::new(NoJitter);
        }
        match self.params.seed {
            Some(seed) => Box::new(UniformJitter::seeded(seed, epsilon)),
            None => Box::new(UniformJitter::from_entropy(epsilon)),
        }
    }

    /// Validate and decode a client request, then estimate.
    pub fn estimate(&self, request: &MeasurementRequest) -> Result<MeasurementResult> {
        let gender = request.gender;
        info!(%gender, "processing measurement request");

        let height_cm = logged(gender, "height", request.height_cm())?;
        let front = logged(gender, "decode-front", request.decode_front())?;
        let side = logged(gender, "decode-side", request.decode_side())?;

        self.estimate_images(gender, height_cm, &front, side.as_ref())
    }

    /// Estimate from already-decoded images.
    pub fn estimate_images(
        &self,
        gender: Gender,
        height_cm: f64,
        front: &DynamicImage,
        side: Option<&DynamicImage>,
    ) -> Result<MeasurementResult> {
        logged(gender, "height", validate_height(height_cm))?;

        let quality = assess_quality(front, side);
        let confidence = self.params.confidence(quality.score);
        let signal = extract_body_shape(front);

        let mut jitter = self.jitter_source();
        let measurements = logged(
            gender,
            "generate",
            generate_measurements(gender, height_cm, side.is_some(), &signal, &mut jitter),
        )?;

        info!(
            %gender,
            height_cm,
            has_side_image = side.is_some(),
            quality = quality.score,
            confidence,
            "measurements estimated"
        );

        Ok(MeasurementResult {
            measurements,
            confidence,
        })
    }
}

/// Log a failed stage with its context, passing the result through.
fn logged<T>(gender: Gender, stage: &str, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        if e.is_client_error() {
            warn!(%gender, stage, "rejected request: {}", e);
        } else {
            error!(%gender, stage, "measurement estimate failed: {}", e);
        }
    }
    result
}
