use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid base64 image payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid height: {0}")]
    InvalidHeight(String),

    #[error("Unknown measurement system: {0} (expected metric or imperial)")]
    InvalidUnitSystem(String),

    #[error("Unknown gender: {0} (expected male, female or other)")]
    InvalidGender(String),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Image too small for band analysis: {width}x{height}")]
    DegenerateImage { width: u32, height: u32 },
}

impl Error {
    /// Whether the error was caused by bad input rather than an internal fault.
    ///
    /// Client errors carry a message that is safe to show to the caller.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidHeight(_)
                | Error::InvalidUnitSystem(_)
                | Error::InvalidGender(_)
                | Error::Decode(_)
                | Error::Base64(_)
                | Error::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
