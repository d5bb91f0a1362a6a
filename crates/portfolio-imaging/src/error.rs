//! Error types for portfolio-imaging.

use std::io;
use thiserror::Error;

/// Result type for portfolio-imaging operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Name used by the gallery for every failure of this crate.
pub type DecodeError = Error;

/// Error type for decoding and encoding images.
#[derive(Debug, Error)]
pub enum Error {
    /// The image codec rejected the data (malformed, truncated, or encode failure).
    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),

    /// The declared format has no decode path.
    #[error("Unsupported image type: {0}")]
    UnsupportedFormat(String),

    /// The format is known but this particular feature is not supported.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// The HEIF container structure is invalid.
    #[error("Invalid HEIF container: {0}")]
    InvalidContainer(String),

    /// A box the decoder needs is absent.
    #[error("Missing required box: {0}")]
    MissingBox(&'static str),

    /// Not enough bytes to satisfy a read.
    #[error("Truncated data: need {need} bytes, have {have}")]
    Truncated { need: usize, have: usize },

    /// Pixel plane geometry does not fit its buffer.
    #[error("Invalid pixel plane: {0}")]
    InvalidPlane(String),

    /// The native HEIF codec failed.
    #[error("HEIF codec error: {0}")]
    Codec(String),

    /// I/O error while reading the container.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create an invalid container error.
    pub fn invalid_container(msg: impl Into<String>) -> Self {
        Self::InvalidContainer(msg.into())
    }

    /// Create an unsupported feature error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Create an invalid plane error.
    pub fn invalid_plane(msg: impl Into<String>) -> Self {
        Self::InvalidPlane(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::UnsupportedFormat("image/gif".into()).to_string(),
            "Unsupported image type: image/gif"
        );
        assert_eq!(
            Error::Truncated { need: 16, have: 4 }.to_string(),
            "Truncated data: need 16 bytes, have 4"
        );
        assert_eq!(Error::MissingBox("ispe").to_string(), "Missing required box: ispe");
        assert_eq!(
            Error::invalid_container("no ftyp").to_string(),
            "Invalid HEIF container: no ftyp"
        );
    }
}
