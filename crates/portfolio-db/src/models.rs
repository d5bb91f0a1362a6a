//! Database models for the portfolio gallery.

use portfolio_common::ImageId;

/// A row of `image_store`: one uploaded image as JPEG bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub id: ImageId,
    /// Client-supplied file name, kept verbatim.
    pub name: String,
    /// JPEG-encoded image data.
    pub image: Vec<u8>,
}
