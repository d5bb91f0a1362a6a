//! Format dispatch for uploaded bytes.

use image::ImageFormat;
use portfolio_common::DeclaredFormat;

use crate::{heif, DecodedImage, Error, Result};

/// Decode uploaded bytes according to their declared format.
///
/// JPEG and PNG are decoded with the declared format, without sniffing the
/// content. HEIF goes through the container reader. Any other format fails
/// with [`Error::UnsupportedFormat`].
pub fn decode(data: &[u8], format: &DeclaredFormat) -> Result<DecodedImage> {
    match format {
        DeclaredFormat::Jpeg => decode_standard(data, ImageFormat::Jpeg),
        DeclaredFormat::Png => decode_standard(data, ImageFormat::Png),
        DeclaredFormat::Heic => heif::decode(data),
        DeclaredFormat::Unsupported(tag) => Err(Error::UnsupportedFormat(if tag.is_empty() {
            "unknown".to_string()
        } else {
            tag.clone()
        })),
    }
}

/// Decode a JPEG blob, as written by the store.
pub fn decode_jpeg(data: &[u8]) -> Result<DecodedImage> {
    decode_standard(data, ImageFormat::Jpeg)
}

fn decode_standard(data: &[u8], format: ImageFormat) -> Result<DecodedImage> {
    let image = image::load_from_memory_with_format(data, format)?;
    tracing::debug!(
        "Decoded {:?} image {}x{} ({:?})",
        format,
        image.width(),
        image.height(),
        image.color()
    );
    Ok(DecodedImage::from_dynamic(image))
}
