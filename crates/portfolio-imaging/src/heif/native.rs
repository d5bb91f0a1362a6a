//! Coded HEIF items through libheif.

use libheif_rs::{ColorSpace, HeifContext, Image, LibHeif, RgbChroma};

use crate::{ColorMode, DecodedImage, Error, RawPlane, Result};

fn codec_error(err: libheif_rs::HeifError) -> Error {
    Error::Codec(err.to_string())
}

/// Decode the primary image to interleaved RGB(A) and rebuild it from libheif's plane.
pub(super) fn decode(data: &[u8]) -> Result<DecodedImage> {
    let lib = LibHeif::new();
    let context = HeifContext::read_from_bytes(data).map_err(codec_error)?;
    let handle = context.primary_image_handle().map_err(codec_error)?;

    let (chroma, mode) = if handle.has_alpha_channel() {
        (RgbChroma::Rgba, ColorMode::Rgba)
    } else {
        (RgbChroma::Rgb, ColorMode::Rgb)
    };

    let image = lib
        .decode(&handle, ColorSpace::Rgb(chroma), None)
        .map_err(codec_error)?;

    from_interleaved(&image, mode)
}

/// Copy the interleaved plane of a decoded image, dropping row padding.
fn from_interleaved(image: &Image, mode: ColorMode) -> Result<DecodedImage> {
    let planes = image.planes();
    let plane = planes
        .interleaved
        .ok_or_else(|| Error::Codec("libheif returned no interleaved plane".to_string()))?;

    tracing::debug!(
        "libheif decoded {}x{} {} with stride {}",
        plane.width,
        plane.height,
        mode,
        plane.stride
    );

    RawPlane {
        mode,
        width: plane.width,
        height: plane.height,
        stride: plane.stride,
        data: plane.data,
    }
    .reconstruct()
}
