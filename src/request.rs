//! Inbound request decoding: height normalization and image payloads.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::generator::{validate_height, MAX_HEIGHT_CM};
use crate::types::{Gender, UnitSystem};

/// A measurement request as submitted by a client.
///
/// Image fields hold base64 payloads, either bare or as data URLs
/// (`data:image/jpeg;base64,...`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementRequest {
    pub gender: Gender,
    /// Height as entered, in the units of `measurement_system`.
    pub height: String,
    #[serde(default)]
    pub measurement_system: UnitSystem,
    pub front_image_base64: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side_image_base64: Option<String>,
}

impl MeasurementRequest {
    /// Build a request from raw (encoded) image bytes.
    pub fn from_bytes(
        gender: Gender,
        height: impl Into<String>,
        measurement_system: UnitSystem,
        front_image: &[u8],
    ) -> Self {
        Self {
            gender,
            height: height.into(),
            measurement_system,
            front_image_base64: STANDARD.encode(front_image),
            side_image_base64: None,
        }
    }

    pub fn with_side_image(mut self, side_image: &[u8]) -> Self {
        self.side_image_base64 = Some(STANDARD.encode(side_image));
        self
    }

    /// Height converted to centimeters.
    pub fn height_cm(&self) -> Result<f64> {
        parse_height(&self.height, self.measurement_system)
    }

    pub fn decode_front(&self) -> Result<DynamicImage> {
        decode_image(&decode_image_payload(&self.front_image_base64)?)
    }

    pub fn decode_side(&self) -> Result<Option<DynamicImage>> {
        match self.side_image_base64.as_deref() {
            Some(payload) if !payload.trim().is_empty() => {
                Ok(Some(decode_image(&decode_image_payload(payload)?)?))
            }
            _ => Ok(None),
        }
    }
}

/// Parse a height string and convert it to centimeters.
///
/// Imperial heights are in inches. The converted value must fall within
/// (0, [`MAX_HEIGHT_CM`]].
pub fn parse_height(text: &str, system: UnitSystem) -> Result<f64> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| Error::InvalidHeight(format!("{text:?} is not a number")))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InvalidHeight(format!("{text:?} must be a positive number")));
    }
    validate_height(system.to_centimeters(value))
}

/// Strip an optional data-URL prefix and decode the base64 payload.
pub fn decode_image_payload(payload: &str) -> Result<Vec<u8>> {
    let payload = payload.trim();
    let encoded = if payload.starts_with("data:") {
        payload
            .split_once(',')
            .map(|(_, data)| data)
            .ok_or_else(|| Error::Decode("data URL has no payload".to_string()))?
    } else {
        payload
    };
    Ok(STANDARD.decode(encoded)?)
}

/// Decode raw image bytes (JPEG, PNG or WebP).
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| Error::Decode(e.to_string()))
}
