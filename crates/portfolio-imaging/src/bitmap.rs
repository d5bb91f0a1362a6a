//! Decoded in-memory images.

use image::{ColorType, DynamicImage, GrayAlphaImage, GrayImage, RgbImage, RgbaImage};

use crate::{Error, Result};

/// Channel layout of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorMode {
    /// Grayscale.
    L,
    /// Grayscale with alpha.
    La,
    /// Red, green, blue.
    Rgb,
    /// Red, green, blue, alpha.
    Rgba,
}

impl ColorMode {
    /// Bytes per pixel in an 8-bit interleaved buffer.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::L => 1,
            Self::La => 2,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }

    /// Whether the mode carries an alpha channel.
    pub fn has_alpha(self) -> bool {
        matches!(self, Self::La | Self::Rgba)
    }

    /// Short display name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::L => "L",
            Self::La => "LA",
            Self::Rgb => "RGB",
            Self::Rgba => "RGBA",
        }
    }

    fn from_color_type(color: ColorType) -> Self {
        match (color.has_color(), color.has_alpha()) {
            (false, false) => Self::L,
            (false, true) => Self::La,
            (true, false) => Self::Rgb,
            (true, true) => Self::Rgba,
        }
    }
}

impl std::fmt::Display for ColorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded bitmap: dimensions, color mode and pixel buffer.
///
/// Produced by [`decode`](crate::decode) and consumed by
/// [`encode_jpeg`](crate::encode_jpeg).
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    image: DynamicImage,
}

impl DecodedImage {
    /// Wrap an image decoded by the `image` crate.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    /// Build an 8-bit image from a tightly packed pixel buffer.
    ///
    /// The buffer must hold exactly `width * height * mode.bytes_per_pixel()` bytes.
    pub fn from_raw(mode: ColorMode, width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let have = pixels.len();
        let image = match mode {
            ColorMode::L => GrayImage::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8),
            ColorMode::La => {
                GrayAlphaImage::from_raw(width, height, pixels).map(DynamicImage::ImageLumaA8)
            }
            ColorMode::Rgb => RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8),
            ColorMode::Rgba => {
                RgbaImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgba8)
            }
        };

        image.map(Self::from_dynamic).ok_or_else(|| {
            Error::invalid_plane(format!(
                "{} bytes do not form a {}x{} {} image",
                have, width, height, mode
            ))
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// Channel layout.
    pub fn mode(&self) -> ColorMode {
        ColorMode::from_color_type(self.image.color())
    }

    /// Number of pixels.
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    /// The raw pixel buffer, in the image's native sample layout.
    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_bytes()
    }

    /// Borrow the underlying image.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }
}

impl From<DynamicImage> for DecodedImage {
    fn from(image: DynamicImage) -> Self {
        Self::from_dynamic(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_rgb() {
        let img = DecodedImage::from_raw(ColorMode::Rgb, 2, 1, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(img.dimensions(), (2, 1));
        assert_eq!(img.mode(), ColorMode::Rgb);
        assert_eq!(img.as_bytes(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(img.pixel_count(), 2);
    }

    #[test]
    fn test_from_raw_size_mismatch() {
        let err = DecodedImage::from_raw(ColorMode::Rgba, 2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(err, Error::InvalidPlane(_)));
    }

    #[test]
    fn test_mode_from_dynamic() {
        let gray = DecodedImage::from(DynamicImage::new_luma8(1, 1));
        assert_eq!(gray.mode(), ColorMode::L);

        let gray16 = DecodedImage::from(DynamicImage::new_luma16(1, 1));
        assert_eq!(gray16.mode(), ColorMode::L);

        let rgba = DecodedImage::from(DynamicImage::new_rgba8(1, 1));
        assert_eq!(rgba.mode(), ColorMode::Rgba);
        assert!(rgba.mode().has_alpha());
    }

    #[test]
    fn test_bytes_per_pixel() {
        assert_eq!(ColorMode::L.bytes_per_pixel(), 1);
        assert_eq!(ColorMode::La.bytes_per_pixel(), 2);
        assert_eq!(ColorMode::Rgb.bytes_per_pixel(), 3);
        assert_eq!(ColorMode::Rgba.bytes_per_pixel(), 4);
    }
}
