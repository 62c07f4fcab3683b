//! Image quality scoring.
//!
//! The score rewards resolution up to a 1000x2000 reference frame, portrait
//! framing near 1:2 width:height, mid-range brightness, and the presence of
//! a side view. It only feeds the confidence figure, never the measurements.

use image::{DynamicImage, GenericImageView};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Pixel count of the reference full-body frame.
pub const REFERENCE_PIXELS: f64 = 1000.0 * 2000.0;

/// Width over height of a typical full-body photo.
pub const OPTIMAL_ASPECT: f64 = 0.5;

const RESOLUTION_WEIGHT: f64 = 0.35;
const ASPECT_WEIGHT: f64 = 0.30;
const BRIGHTNESS_WEIGHT: f64 = 0.15;
const SIDE_IMAGE_BONUS: f64 = 0.25;

/// Brightness score used when the histogram cannot be computed.
pub const NEUTRAL_BRIGHTNESS_QUALITY: f64 = 0.5;

/// Individual components of the quality score, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityBreakdown {
    pub resolution: f64,
    pub aspect: f64,
    pub brightness: f64,
    pub has_side_image: bool,
    /// Weighted, re-normalized score clamped to [0, 1].
    pub score: f64,
}

/// Score the front image, plus a bonus when a side image is supplied.
pub fn assess_quality(front: &DynamicImage, side: Option<&DynamicImage>) -> QualityBreakdown {
    let (width, height) = front.dimensions();

    let resolution = (width as f64 * height as f64 / REFERENCE_PIXELS).min(1.0);

    let aspect_ratio = if height > 0 {
        width as f64 / height as f64
    } else {
        0.0
    };
    let aspect = 1.0 - (aspect_ratio - OPTIMAL_ASPECT).abs().min(0.5);

    let brightness = brightness_quality(front).unwrap_or_else(|e| {
        warn!("brightness analysis failed, using neutral score: {}", e);
        NEUTRAL_BRIGHTNESS_QUALITY
    });

    let has_side_image = side.is_some();
    let (bonus, normalizer) = if has_side_image {
        (SIDE_IMAGE_BONUS, 1.0)
    } else {
        (0.0, 0.8)
    };

    let weighted = RESOLUTION_WEIGHT * resolution
        + ASPECT_WEIGHT * aspect
        + BRIGHTNESS_WEIGHT * brightness
        + bonus;
    let score = (weighted / normalizer).clamp(0.0, 1.0);

    debug!(resolution, aspect, brightness, has_side_image, score, "image quality");

    QualityBreakdown {
        resolution,
        aspect,
        brightness,
        has_side_image,
        score,
    }
}

/// Convenience wrapper returning only the score.
pub fn image_quality(front: &DynamicImage, side: Option<&DynamicImage>) -> f64 {
    assess_quality(front, side).score
}

/// 256-bin luminance histogram.
pub fn luminance_histogram(image: &DynamicImage) -> [u64; 256] {
    let mut histogram = [0u64; 256];
    for pixel in image.to_luma8().pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }
    histogram
}

/// Mean luminance in [0, 255], computed from the histogram.
pub fn mean_luminance(histogram: &[u64; 256]) -> Option<f64> {
    let pixels: u64 = histogram.iter().sum();
    if pixels == 0 {
        return None;
    }
    let weighted: u64 = histogram
        .iter()
        .enumerate()
        .map(|(level, &count)| level as u64 * count)
        .sum();
    Some(weighted as f64 / pixels as f64)
}

/// Brightness score: 1.0 at mid gray, 0.0 at pure black or white.
pub fn brightness_quality(image: &DynamicImage) -> Result<f64> {
    let histogram = luminance_histogram(image);
    let mean = mean_luminance(&histogram).ok_or(Error::DegenerateImage {
        width: image.width(),
        height: image.height(),
    })?;
    let normalized = mean / 255.0;
    Ok(1.0 - 2.0 * (normalized - 0.5).abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn gray(width: u32, height: u32, level: u8) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([level])))
    }

    #[test]
    fn histogram_counts_every_pixel() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_fn(4, 4, |x, _| Luma([x as u8 * 10])));
        let histogram = luminance_histogram(&img);
        assert_eq!(histogram.iter().sum::<u64>(), 16);
        assert_eq!(histogram[0], 4);
        assert_eq!(histogram[30], 4);
        assert!((mean_luminance(&histogram).unwrap() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn brightness_peaks_at_mid_gray() {
        assert_eq!(brightness_quality(&gray(10, 10, 0)).unwrap(), 0.0);
        assert_eq!(brightness_quality(&gray(10, 10, 255)).unwrap(), 0.0);
        assert!((brightness_quality(&gray(10, 10, 51)).unwrap() - 0.4).abs() < 1e-9);

        let mid = brightness_quality(&gray(10, 10, 128)).unwrap();
        assert!(mid > 0.99);
    }

    #[test]
    fn empty_image_has_no_brightness() {
        assert!(brightness_quality(&gray(0, 0, 0)).is_err());
        let q = assess_quality(&gray(0, 0, 0), None);
        assert_eq!(q.brightness, NEUTRAL_BRIGHTNESS_QUALITY);
        assert_eq!(q.resolution, 0.0);
        // Aspect ratio 0 is 0.5 away from optimal
        assert_eq!(q.aspect, 0.5);
    }

    #[test]
    fn weighted_score_without_side_image() {
        // 500x1000: resolution 0.25, aspect 1.0, brightness 0.4
        let q = assess_quality(&gray(500, 1000, 51), None);
        assert!((q.resolution - 0.25).abs() < 1e-9);
        assert!((q.aspect - 1.0).abs() < 1e-9);
        // (0.0875 + 0.30 + 0.06) / 0.8
        assert!((q.score - 0.559375).abs() < 1e-9);
    }

    #[test]
    fn side_image_adds_bonus() {
        let front = gray(500, 1000, 51);
        let side = gray(10, 10, 0);
        let q = assess_quality(&front, Some(&side));
        assert!(q.has_side_image);
        // (0.4475 + 0.25) / 1.0
        assert!((q.score - 0.6975).abs() < 1e-9);
        assert!(q.score > image_quality(&front, None));
    }

    #[test]
    fn landscape_images_are_penalized() {
        let portrait = assess_quality(&gray(100, 200, 128), None);
        let landscape = assess_quality(&gray(200, 100, 128), None);
        assert!(portrait.aspect > landscape.aspect);
        assert_eq!(landscape.aspect, 0.5);
    }

    #[test]
    fn score_never_exceeds_one() {
        let q = assess_quality(&gray(1000, 2000, 128), Some(&gray(10, 10, 128)));
        assert!(q.score <= 1.0);
    }
}
