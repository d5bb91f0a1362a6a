//! Minimal HEIF writer for uncompressed images.
//!
//! Produces a single-item `unci` file: `ftyp`, a `meta` box describing the
//! item, and the padded pixel rows in `mdat` or `idat`. Used to build HEIC
//! fixtures with a known row stride.

use super::boxes::BoxType;
use super::uncompressed::{
    align_up, COMPONENT_ALPHA, COMPONENT_BLUE, COMPONENT_GREEN, COMPONENT_MONOCHROME,
    COMPONENT_RED,
};
use crate::{ColorMode, DecodedImage, Result};

const ITEM_ID: u16 = 1;

/// Where the pixel rows are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataPlacement {
    /// Top-level `mdat` box, addressed by file offset.
    #[default]
    Mdat,
    /// `idat` box inside `meta`.
    Idat,
}

/// Writer for single-image uncompressed HEIF files.
#[derive(Debug, Clone, Default)]
pub struct UncompressedWriter {
    row_align: u32,
    placement: DataPlacement,
}

impl UncompressedWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pad every row to a multiple of `align` bytes.
    pub fn row_align(mut self, align: u32) -> Self {
        self.row_align = align;
        self
    }

    /// Choose where the pixel rows are stored.
    pub fn placement(mut self, placement: DataPlacement) -> Self {
        self.placement = placement;
        self
    }

    /// Serialize an image. Samples are reduced to 8 bits.
    pub fn write(&self, image: &DecodedImage) -> Result<Vec<u8>> {
        let mode = image.mode();
        let (width, height) = image.dimensions();
        let source = image.as_dynamic();
        let pixels = match mode {
            ColorMode::L => source.to_luma8().into_raw(),
            ColorMode::La => source.to_luma_alpha8().into_raw(),
            ColorMode::Rgb => source.to_rgb8().into_raw(),
            ColorMode::Rgba => source.to_rgba8().into_raw(),
        };

        let row_bytes = width as usize * mode.bytes_per_pixel();
        let stride = align_up(row_bytes, self.row_align as usize)?;
        let mut plane = Vec::with_capacity(stride * height as usize);
        for row in pixels.chunks(row_bytes.max(1)) {
            plane.extend_from_slice(row);
            plane.resize(plane.len() + stride - row_bytes, 0);
        }

        let ftyp = make_box(b"ftyp", &{
            let mut payload = b"mif1".to_vec();
            payload.extend_from_slice(&0u32.to_be_bytes());
            payload.extend_from_slice(b"mif1mif3");
            payload
        });

        let out = match self.placement {
            DataPlacement::Mdat => {
                // The meta box has the same size whatever offset it records.
                let meta_len = self.meta(width, height, mode, &plane, 0).len();
                let data_offset = (ftyp.len() + meta_len + 8) as u32;
                let meta = self.meta(width, height, mode, &plane, data_offset);

                let mut out = ftyp;
                out.extend_from_slice(&meta);
                out.extend_from_slice(&make_box(b"mdat", &plane));
                out
            }
            DataPlacement::Idat => {
                let mut out = ftyp;
                out.extend_from_slice(&self.meta(width, height, mode, &plane, 0));
                out
            }
        };

        Ok(out)
    }

    fn meta(&self, width: u32, height: u32, mode: ColorMode, plane: &[u8], offset: u32) -> Vec<u8> {
        let hdlr = make_full_box(b"hdlr", 0, 0, &{
            let mut payload = 0u32.to_be_bytes().to_vec();
            payload.extend_from_slice(&BoxType::PICT.0);
            payload.extend_from_slice(&[0u8; 12]);
            payload.push(0);
            payload
        });

        let pitm = make_full_box(b"pitm", 0, 0, &ITEM_ID.to_be_bytes());

        let infe = make_full_box(b"infe", 2, 0, &{
            let mut payload = ITEM_ID.to_be_bytes().to_vec();
            payload.extend_from_slice(&0u16.to_be_bytes());
            payload.extend_from_slice(&BoxType::UNCI.0);
            payload.push(0);
            payload
        });
        let iinf = make_full_box(b"iinf", 0, 0, &{
            let mut payload = 1u16.to_be_bytes().to_vec();
            payload.extend_from_slice(&infe);
            payload
        });

        let construction_method: u16 = match self.placement {
            DataPlacement::Mdat => 0,
            DataPlacement::Idat => 1,
        };
        let iloc = make_full_box(b"iloc", 1, 0, &{
            let mut payload = vec![0x44, 0x00];
            payload.extend_from_slice(&1u16.to_be_bytes());
            payload.extend_from_slice(&ITEM_ID.to_be_bytes());
            payload.extend_from_slice(&construction_method.to_be_bytes());
            payload.extend_from_slice(&0u16.to_be_bytes());
            payload.extend_from_slice(&1u16.to_be_bytes());
            payload.extend_from_slice(&offset.to_be_bytes());
            payload.extend_from_slice(&(plane.len() as u32).to_be_bytes());
            payload
        });

        let component_types: &[u16] = match mode {
            ColorMode::L => &[COMPONENT_MONOCHROME],
            ColorMode::La => &[COMPONENT_MONOCHROME, COMPONENT_ALPHA],
            ColorMode::Rgb => &[COMPONENT_RED, COMPONENT_GREEN, COMPONENT_BLUE],
            ColorMode::Rgba => &[COMPONENT_RED, COMPONENT_GREEN, COMPONENT_BLUE, COMPONENT_ALPHA],
        };

        let ispe = make_full_box(b"ispe", 0, 0, &{
            let mut payload = width.to_be_bytes().to_vec();
            payload.extend_from_slice(&height.to_be_bytes());
            payload
        });
        let pixi = make_full_box(b"pixi", 0, 0, &{
            let mut payload = vec![component_types.len() as u8];
            payload.extend(std::iter::repeat(8u8).take(component_types.len()));
            payload
        });
        let cmpd = make_box(b"cmpd", &{
            let mut payload = (component_types.len() as u32).to_be_bytes().to_vec();
            for t in component_types {
                payload.extend_from_slice(&t.to_be_bytes());
            }
            payload
        });
        let uncc = make_full_box(b"uncC", 0, 0, &{
            let mut payload = vec![0u8; 4]; // profile
            payload.extend_from_slice(&(component_types.len() as u32).to_be_bytes());
            for index in 0..component_types.len() as u16 {
                payload.extend_from_slice(&index.to_be_bytes());
                payload.extend_from_slice(&[7, 0, 0]);
            }
            payload.extend_from_slice(&[0, 1, 0, 0]); // 4:4:4, pixel interleave
            payload.extend_from_slice(&0u32.to_be_bytes()); // pixel_size
            payload.extend_from_slice(&self.row_align.to_be_bytes());
            payload.extend_from_slice(&[0u8; 12]); // tile alignment and counts
            payload
        });
        let ipco = make_box(b"ipco", &[ispe, pixi, cmpd, uncc].concat());
        let ipma = make_full_box(b"ipma", 0, 0, &{
            let mut payload = 1u32.to_be_bytes().to_vec();
            payload.extend_from_slice(&ITEM_ID.to_be_bytes());
            payload.extend_from_slice(&[4, 0x01, 0x02, 0x83, 0x84]);
            payload
        });
        let iprp = make_box(b"iprp", &[ipco, ipma].concat());

        let mut children = [hdlr, pitm, iinf, iloc, iprp].concat();
        if self.placement == DataPlacement::Idat {
            children.extend_from_slice(&make_box(b"idat", plane));
        }
        make_full_box(b"meta", 0, 0, &children)
    }
}

fn make_box(box_type: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 8);
    out.extend_from_slice(&((payload.len() + 8) as u32).to_be_bytes());
    out.extend_from_slice(box_type);
    out.extend_from_slice(payload);
    out
}

fn make_full_box(box_type: &[u8; 4], version: u8, flags: u32, payload: &[u8]) -> Vec<u8> {
    let mut body = ((u32::from(version) << 24) | (flags & 0x00FF_FFFF))
        .to_be_bytes()
        .to_vec();
    body.extend_from_slice(payload);
    make_box(box_type, &body)
}
