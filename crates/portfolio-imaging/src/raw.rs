//! Reconstruction of interleaved pixel planes with row padding.
//!
//! Codecs and uncompressed containers hand back pixel rows that may be padded
//! out to an alignment boundary. Each row occupies `stride` bytes, of which
//! only the first `width * bytes_per_pixel` are image content. Reading rows
//! with the wrong stride shifts every row a little further than the last,
//! which shows up as a diagonal skew.

use crate::{ColorMode, DecodedImage, Error, Result};

/// Borrowed view of an interleaved 8-bit pixel plane.
#[derive(Debug, Clone, Copy)]
pub struct RawPlane<'a> {
    /// Channel layout of each pixel.
    pub mode: ColorMode,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Bytes from the start of one row to the start of the next.
    pub stride: usize,
    /// Plane bytes, starting at the first row.
    pub data: &'a [u8],
}

impl<'a> RawPlane<'a> {
    /// Bytes of image content per row.
    pub fn row_bytes(&self) -> Result<usize> {
        (self.width as usize)
            .checked_mul(self.mode.bytes_per_pixel())
            .ok_or_else(|| Error::invalid_plane(format!("row of {} pixels overflows", self.width)))
    }

    /// Minimum buffer length. The last row does not need its padding.
    pub fn required_len(&self) -> Result<usize> {
        let row_bytes = self.row_bytes()?;
        (self.height as usize)
            .saturating_sub(1)
            .checked_mul(self.stride)
            .and_then(|n| n.checked_add(row_bytes))
            .ok_or_else(|| {
                Error::invalid_plane(format!(
                    "{} rows of stride {} overflow",
                    self.height, self.stride
                ))
            })
    }

    /// Copy the image content of every row into a tightly packed bitmap.
    pub fn reconstruct(&self) -> Result<DecodedImage> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::invalid_plane(format!(
                "zero-sized plane {}x{}",
                self.width, self.height
            )));
        }

        let row_bytes = self.row_bytes()?;
        if self.stride < row_bytes {
            return Err(Error::invalid_plane(format!(
                "stride {} is smaller than a {}-byte row",
                self.stride, row_bytes
            )));
        }

        let required = self.required_len()?;
        if self.data.len() < required {
            return Err(Error::Truncated {
                need: required,
                have: self.data.len(),
            });
        }

        let plane = &self.data[..required];
        let pixels = if self.stride == row_bytes {
            plane.to_vec()
        } else {
            let mut pixels = Vec::with_capacity(row_bytes * self.height as usize);
            for row in plane.chunks(self.stride) {
                pixels.extend_from_slice(&row[..row_bytes]);
            }
            pixels
        };

        DecodedImage::from_raw(self.mode, self.width, self.height, pixels)
    }
}
