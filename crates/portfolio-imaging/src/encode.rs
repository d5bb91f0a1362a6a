//! JPEG re-encoding for storage.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};

use crate::{ColorMode, DecodedImage, Result};

/// Quality used when none is configured.
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Encode a decoded image as baseline JPEG.
///
/// `quality` is clamped to 1-100. Gray images stay 8-bit grayscale and
/// color images become 8-bit RGB. JPEG has no alpha channel, so alpha is
/// composited over a white background first.
pub fn encode_jpeg(image: &DecodedImage, quality: u8) -> Result<Vec<u8>> {
    let quality = quality.clamp(1, 100);
    let source = image.as_dynamic();

    let flat = match image.mode() {
        ColorMode::L => DynamicImage::ImageLuma8(source.to_luma8()),
        ColorMode::La => DynamicImage::ImageLuma8(flatten_gray(source)),
        ColorMode::Rgb => DynamicImage::ImageRgb8(source.to_rgb8()),
        ColorMode::Rgba => DynamicImage::ImageRgb8(flatten_rgba(source)),
    };

    let mut buf = Vec::new();
    flat.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))?;

    tracing::debug!(
        "Encoded {}x{} {} image as JPEG (quality {}, {} bytes)",
        image.width(),
        image.height(),
        image.mode(),
        quality,
        buf.len()
    );

    Ok(buf)
}

fn flatten_gray(source: &DynamicImage) -> GrayImage {
    let gray = source.to_luma_alpha8();
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let [l, a] = gray.get_pixel(x, y).0;
        Luma([over_white(l, a)])
    })
}

fn flatten_rgba(source: &DynamicImage) -> RgbImage {
    let rgba = source.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        Rgb([over_white(r, a), over_white(g, a), over_white(b, a)])
    })
}

fn over_white(channel: u8, alpha: u8) -> u8 {
    let c = u16::from(channel);
    let a = u16::from(alpha);
    ((c * a + 255 * (255 - a) + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode_jpeg;
    use image::{GrayAlphaImage, LumaA, Rgba, RgbaImage};

    #[test]
    fn test_rgb_round_trip() {
        let img = DecodedImage::from(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            10,
            6,
            Rgb([20, 200, 40]),
        )));
        let jpeg = encode_jpeg(&img, DEFAULT_JPEG_QUALITY).unwrap();
        assert_eq!(&jpeg[..3], &[0xFF, 0xD8, 0xFF]);

        let back = decode_jpeg(&jpeg).unwrap();
        assert_eq!(back.dimensions(), (10, 6));
        assert_eq!(back.mode(), ColorMode::Rgb);
    }

    #[test]
    fn test_gray_stays_gray() {
        let img = DecodedImage::from(DynamicImage::ImageLuma8(GrayImage::from_pixel(
            4,
            4,
            Luma([128]),
        )));
        let back = decode_jpeg(&encode_jpeg(&img, 90).unwrap()).unwrap();
        assert_eq!(back.mode(), ColorMode::L);
    }

    #[test]
    fn test_alpha_is_flattened_over_white() {
        let transparent = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 0]));
        let img = DecodedImage::from(DynamicImage::ImageRgba8(transparent));

        let back = decode_jpeg(&encode_jpeg(&img, 100).unwrap()).unwrap();
        assert_eq!(back.mode(), ColorMode::Rgb);
        let rgb = back.as_dynamic().to_rgb8();
        assert!(rgb.pixels().all(|p| p.0.iter().all(|&c| c > 245)));
    }

    #[test]
    fn test_gray_alpha_is_flattened() {
        let img = DecodedImage::from(DynamicImage::ImageLumaA8(GrayAlphaImage::from_pixel(
            2,
            2,
            LumaA([0, 255]),
        )));
        let back = decode_jpeg(&encode_jpeg(&img, 100).unwrap()).unwrap();
        assert_eq!(back.mode(), ColorMode::L);
        assert!(back.as_bytes().iter().all(|&l| l < 10));
    }

    #[test]
    fn test_quality_is_clamped() {
        let img = DecodedImage::from(DynamicImage::ImageRgb8(RgbImage::new(2, 2)));
        assert!(encode_jpeg(&img, 0).is_ok());
        assert!(encode_jpeg(&img, 255).is_ok());
    }

    #[test]
    fn test_over_white() {
        assert_eq!(over_white(0, 0), 255);
        assert_eq!(over_white(0, 255), 0);
        assert_eq!(over_white(200, 255), 200);
    }
}
