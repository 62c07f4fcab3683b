//! # bodyfit
//!
//! Heuristic body measurement estimation from full-body photos.
//!
//! This crate provides:
//! - **Image Quality**: Resolution, framing and brightness scoring that feeds the confidence figure
//! - **Body Shape Signal**: A coarse shape proxy from horizontal brightness bands
//! - **Measurement Generation**: Gender-keyed anthropometric ratios, reconciled against
//!   reference proportions and clamped to plausible height bands
//! - **Sizing**: Letter-size recommendations and unit formatting for display
//! - **Accuracy**: Error summaries against manually taken measurements
//!
//! Measurements are anthropometric estimates driven by height and gender. The image
//! signal only nudges them; no pose or silhouette detection is performed.
//!
//! ## Algorithm Overview
//!
//! 1. Normalize the gender label and clamp the body-shape signal
//! 2. Multiply height by each base ratio, with a small multiplicative jitter
//! 3. Adjust the waist for prominence and nudge correlated girths together
//! 4. Reconcile chest/waist, waist/hip, shoulder/chest and thigh/hip ratios
//!    toward the reference ratios in one ordered pass
//! 5. Apply the side-image depth bonus, derive limb girths and BMI
//! 6. Clamp every length to its height band, rounded to 0.1 cm
//!
//! ## Quick Start
//!
//! ```rust
//! use bodyfit::{generate_measurements, BodyShapeSignal, Gender, Measurement, NoJitter};
//!
//! let signal = BodyShapeSignal::NEUTRAL;
//! let measurements =
//!     generate_measurements(Gender::Male, 180.0, false, &signal, &mut NoJitter).unwrap();
//!
//! let chest = measurements[Measurement::Chest];
//! assert!(chest > 80.0 && chest < 100.0);
//! assert_eq!(measurements[Measurement::Height], 180.0);
//! ```
//!
//! ## From Images
//!
//! ```rust
//! use bodyfit::{BodyEstimator, EstimatorParams, Gender, Measurement};
//! use image::{DynamicImage, GrayImage, Luma};
//!
//! let front = DynamicImage::ImageLuma8(GrayImage::from_pixel(500, 1000, Luma([128])));
//! let result = BodyEstimator::with_params(EstimatorParams::deterministic())
//!     .estimate_images(Gender::Female, 165.0, &front, None)
//!     .unwrap();
//!
//! assert!(result.confidence >= 0.88);
//! assert!(result.measurements[Measurement::Waist] > 0.0);
//! ```

mod accuracy;
mod correction;
mod error;
mod estimator;
mod features;
mod generator;
mod proportions;
mod quality;
mod request;
mod sizing;
mod types;
mod units;

pub use accuracy::{
    analyze_accuracy, importance_weight, mean_absolute_error, percentage_deviation,
    AccuracyReport, ErrorSummary, ProblemMeasurement,
};
pub use correction::{
    estimate_bmi, reconcile, round_tenth, Correction, CorrectionContext, BMI_MAX, BMI_MIN,
    DEPTH_BONUS, MIN_LENGTH_CM,
};
pub use error::{Error, Result};
pub use estimator::{BodyEstimator, EstimatorParams};
pub use features::{band_means, extract_body_shape, signal_from_bands, BandMeans};
pub use generator::{
    generate_measurements, normalize_signal, raw_measurements, JitterSource, NoJitter,
    validate_height, UniformJitter, BODY_TYPE_FACTOR_LIMIT, DEFAULT_JITTER_EPSILON, MAX_HEIGHT_CM,
};
pub use proportions::{HeightBand, Proportions, RatioTerm, ReferenceRatios};
pub use quality::{
    assess_quality, brightness_quality, image_quality, luminance_histogram, mean_luminance,
    QualityBreakdown,
};
pub use request::{decode_image, decode_image_payload, parse_height, MeasurementRequest};
pub use sizing::{recommend_sizes, ClothingSize, SizeRecommendation};
pub use types::{BodyShapeSignal, Gender, Measurement, MeasurementResult, MeasurementSet, UnitSystem};
pub use units::{format_height, format_measurement};
