//! Body-shape signal extraction from image brightness bands.
//!
//! The front image is split into upper, middle and lower horizontal bands.
//! How much the outer bands differ from the middle one is used as a crude,
//! reproducible proxy for torso-width variation. No body-shape inference is
//! claimed.

use std::borrow::Cow;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::types::BodyShapeSignal;

/// Row fractions separating the three bands.
pub const UPPER_BAND_END: f64 = 0.33;
pub const MIDDLE_BAND_END: f64 = 0.66;

/// Mean pixel intensity of each horizontal band (all channels).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandMeans {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

impl BandMeans {
    /// Upper and lower band means relative to the middle band.
    /// Both ratios are 1.0 when the middle band is black.
    pub fn ratios_to_middle(&self) -> (f64, f64) {
        if self.middle > 0.0 {
            (self.upper / self.middle, self.lower / self.middle)
        } else {
            (1.0, 1.0)
        }
    }
}

/// 8-bit samples of the image in its native channel layout.
///
/// Higher bit depths and float images are converted to RGBA8.
fn samples(image: &DynamicImage) -> (Cow<'_, [u8]>, usize) {
    match image {
        DynamicImage::ImageLuma8(_)
        | DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageRgb8(_)
        | DynamicImage::ImageRgba8(_) => (
            Cow::Borrowed(image.as_bytes()),
            image.color().channel_count() as usize,
        ),
        _ => (Cow::Owned(image.to_rgba8().into_raw()), 4),
    }
}

fn mean(bytes: &[u8]) -> Option<f64> {
    if bytes.is_empty() {
        return None;
    }
    let sum: u64 = bytes.iter().map(|&b| b as u64).sum();
    Some(sum as f64 / bytes.len() as f64)
}

/// Compute the mean intensity of the three horizontal bands.
///
/// Fails with [`Error::DegenerateImage`] when any band has no pixels.
pub fn band_means(image: &DynamicImage) -> Result<BandMeans> {
    let (width, height) = image.dimensions();
    let degenerate = || Error::DegenerateImage { width, height };

    let (data, channels) = samples(image);
    let row_len = width as usize * channels;
    let upper_end = (height as f64 * UPPER_BAND_END) as usize;
    let middle_end = (height as f64 * MIDDLE_BAND_END) as usize;
    let rows = height as usize;

    let band = |start: usize, end: usize| -> Option<f64> {
        data.get(start * row_len..end * row_len).and_then(mean)
    };

    Ok(BandMeans {
        upper: band(0, upper_end).ok_or_else(degenerate)?,
        middle: band(upper_end, middle_end).ok_or_else(degenerate)?,
        lower: band(middle_end, rows).ok_or_else(degenerate)?,
    })
}

/// Turn band statistics into a body-shape signal.
pub fn signal_from_bands(bands: &BandMeans, width_to_height_ratio: f64) -> BodyShapeSignal {
    let (upper_to_middle, lower_to_middle) = bands.ratios_to_middle();

    let body_type_factor =
        (0.5 * (upper_to_middle - 1.0).abs() + 0.5 * (lower_to_middle - 1.0).abs()).min(1.0);

    // Darker middle band suggests a narrower waist, lighter a fuller one
    let waist_prominence = if upper_to_middle > 1.1 && lower_to_middle > 1.1 {
        0.3
    } else if upper_to_middle < 0.9 && lower_to_middle < 0.9 {
        0.7
    } else {
        0.5
    };

    BodyShapeSignal {
        body_type_factor,
        waist_prominence,
        width_to_height_ratio,
    }
}

/// Extract the body-shape signal from the front image.
///
/// Never fails: if band statistics cannot be computed the neutral signal
/// is returned.
pub fn extract_body_shape(image: &DynamicImage) -> BodyShapeSignal {
    let (width, height) = image.dimensions();
    let width_to_height_ratio = if height > 0 {
        width as f64 / height as f64
    } else {
        0.0
    };

    match band_means(image) {
        Ok(bands) => {
            let signal = signal_from_bands(&bands, width_to_height_ratio);
            debug!(
                upper = bands.upper,
                middle = bands.middle,
                lower = bands.lower,
                factor = signal.body_type_factor,
                waist = signal.waist_prominence,
                ratio = signal.width_to_height_ratio,
                "body shape analysis"
            );
            signal
        }
        Err(e) => {
            warn!("body shape analysis failed, using neutral signal: {}", e);
            BodyShapeSignal::NEUTRAL
        }
    }
}
