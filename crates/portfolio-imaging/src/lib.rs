//! Portfolio-Imaging: turning uploaded bytes into bitmaps and back into JPEG.
//!
//! The gallery accepts three declared formats. JPEG and PNG are
//! self-describing and go straight through the `image` crate. HEIF needs its
//! container parsed first to find the primary item, its dimensions, color
//! layout and row stride; the pixel rows are then rebuilt from the raw plane.
//!
//! # Modules
//!
//! - `bitmap` - The decoded in-memory image and its color mode
//! - `raw` - Stride-aware reconstruction of interleaved pixel planes
//! - `decode` - Format dispatch over [`DeclaredFormat`](portfolio_common::DeclaredFormat)
//! - `encode` - JPEG re-encoding for storage
//! - `heif` - HEIF container reader and writer
//!
//! # Example
//!
//! ```
//! use portfolio_common::DeclaredFormat;
//! use portfolio_imaging::{decode, encode_jpeg, DEFAULT_JPEG_QUALITY};
//!
//! let png = {
//!     let img = image::RgbImage::from_pixel(4, 3, image::Rgb([200, 10, 10]));
//!     let mut buf = std::io::Cursor::new(Vec::new());
//!     img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
//!     buf.into_inner()
//! };
//!
//! let decoded = decode(&png, &DeclaredFormat::Png).unwrap();
//! assert_eq!(decoded.dimensions(), (4, 3));
//!
//! let jpeg = encode_jpeg(&decoded, DEFAULT_JPEG_QUALITY).unwrap();
//! assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
//! ```

pub mod bitmap;
pub mod decode;
pub mod encode;
pub mod error;
pub mod heif;
pub mod raw;

pub use bitmap::{ColorMode, DecodedImage};
pub use decode::{decode, decode_jpeg};
pub use encode::{encode_jpeg, DEFAULT_JPEG_QUALITY};
pub use error::{DecodeError, Error, Result};
pub use raw::RawPlane;

/// Whether coded HEIF items (HEVC, AV1, grids) can be decoded in this build.
pub const CODED_HEIF_SUPPORT: bool = cfg!(feature = "libheif");
