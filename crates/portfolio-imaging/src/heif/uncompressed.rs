//! Uncompressed HEIF items (`unci`, ISO/IEC 23001-17).
//!
//! Supported subset: 8-bit unsigned components, 4:4:4 sampling, pixel
//! interleave (or a single component), a single tile and no per-pixel
//! padding. Rows may be padded to `row_align_size`.

use super::boxes::{BoxType, ByteCursor};
use super::{HeifFile, Property};
use crate::{ColorMode, DecodedImage, Error, RawPlane, Result};

/// Component types from the `cmpd` box.
pub(crate) const COMPONENT_MONOCHROME: u16 = 0;
pub(crate) const COMPONENT_LUMA: u16 = 1;
pub(crate) const COMPONENT_RED: u16 = 4;
pub(crate) const COMPONENT_GREEN: u16 = 5;
pub(crate) const COMPONENT_BLUE: u16 = 6;
pub(crate) const COMPONENT_ALPHA: u16 = 7;

const SAMPLING_444: u8 = 0;
const INTERLEAVE_COMPONENT: u8 = 0;
const INTERLEAVE_PIXEL: u8 = 1;
const FORMAT_UNSIGNED: u8 = 0;

/// One component entry of `uncC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentSpec {
    /// Index into the `cmpd` component list.
    pub index: u16,
    pub bit_depth: u8,
    pub format: u8,
    pub align_size: u8,
}

/// Parsed `uncC` box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UncompressedConfig {
    pub version: u8,
    pub profile: BoxType,
    pub components: Vec<ComponentSpec>,
    pub sampling_type: u8,
    pub interleave_type: u8,
    pub block_size: u8,
    pub pixel_size: u32,
    pub row_align_size: u32,
    pub tile_align_size: u32,
    pub tile_columns: u32,
    pub tile_rows: u32,
}

impl UncompressedConfig {
    /// Parse a `uncC` payload (full box).
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(payload);
        let (version, _) = cursor.read_full_box_header()?;
        let profile = cursor.read_fourcc()?;

        match version {
            0 => {}
            1 => return Self::from_profile(profile),
            v => return Err(Error::unsupported(format!("uncC version {}", v))),
        }

        let count = cursor.read_u32()?;
        let mut components = Vec::with_capacity(count.min(16) as usize);
        for _ in 0..count {
            components.push(ComponentSpec {
                index: cursor.read_u16()?,
                bit_depth: cursor.read_u8()?.saturating_add(1),
                format: cursor.read_u8()?,
                align_size: cursor.read_u8()?,
            });
        }

        let sampling_type = cursor.read_u8()?;
        let interleave_type = cursor.read_u8()?;
        let block_size = cursor.read_u8()?;
        cursor.skip(1)?; // endianness, block padding and pad_unknown flags
        let pixel_size = cursor.read_u32()?;
        let row_align_size = cursor.read_u32()?;
        let tile_align_size = cursor.read_u32()?;
        let tile_columns = cursor.read_u32()?.saturating_add(1);
        let tile_rows = cursor.read_u32()?.saturating_add(1);

        Ok(Self {
            version,
            profile,
            components,
            sampling_type,
            interleave_type,
            block_size,
            pixel_size,
            row_align_size,
            tile_align_size,
            tile_columns,
            tile_rows,
        })
    }

    /// Version 1 boxes only name a profile; the layout is implied.
    fn from_profile(profile: BoxType) -> Result<Self> {
        let count: u16 = match &profile.0 {
            b"rgb3" => 3,
            b"rgba" => 4,
            _ => {
                return Err(Error::unsupported(format!(
                    "uncompressed profile '{}'",
                    profile
                )))
            }
        };

        Ok(Self {
            version: 1,
            profile,
            components: (0..count)
                .map(|index| ComponentSpec {
                    index,
                    bit_depth: 8,
                    format: FORMAT_UNSIGNED,
                    align_size: 0,
                })
                .collect(),
            sampling_type: SAMPLING_444,
            interleave_type: INTERLEAVE_PIXEL,
            block_size: 0,
            pixel_size: 0,
            row_align_size: 0,
            tile_align_size: 0,
            tile_columns: 1,
            tile_rows: 1,
        })
    }

    /// Component types implied by a version 1 profile.
    fn implied_component_types(&self) -> Vec<u16> {
        let mut types = vec![COMPONENT_RED, COMPONENT_GREEN, COMPONENT_BLUE];
        if self.components.len() == 4 {
            types.push(COMPONENT_ALPHA);
        }
        types
    }

    /// Reject layouts outside the supported subset.
    fn check_supported(&self) -> Result<()> {
        if let Some(c) = self
            .components
            .iter()
            .find(|c| c.bit_depth != 8 || c.format != FORMAT_UNSIGNED || c.align_size > 1)
        {
            return Err(Error::unsupported(format!(
                "{}-bit component (format {}, align {})",
                c.bit_depth, c.format, c.align_size
            )));
        }
        if self.sampling_type != SAMPLING_444 {
            return Err(Error::unsupported(format!(
                "chroma subsampling type {}",
                self.sampling_type
            )));
        }
        let single = self.components.len() == 1;
        if self.interleave_type != INTERLEAVE_PIXEL
            && !(single && self.interleave_type == INTERLEAVE_COMPONENT)
        {
            return Err(Error::unsupported(format!(
                "interleave type {}",
                self.interleave_type
            )));
        }
        if self.block_size != 0 {
            return Err(Error::unsupported("block packing"));
        }
        if self.pixel_size != 0 && self.pixel_size as usize != self.components.len() {
            return Err(Error::unsupported(format!(
                "pixel padding to {} bytes",
                self.pixel_size
            )));
        }
        if self.tile_columns != 1 || self.tile_rows != 1 {
            return Err(Error::unsupported(format!(
                "{}x{} tiles",
                self.tile_columns, self.tile_rows
            )));
        }
        Ok(())
    }

    /// Bytes between the starts of consecutive rows.
    pub fn stride(&self, width: u32, mode: ColorMode) -> Result<usize> {
        let row_bytes = (width as usize)
            .checked_mul(mode.bytes_per_pixel())
            .ok_or_else(|| Error::invalid_plane("row size overflows"))?;
        align_up(row_bytes, self.row_align_size as usize)
    }
}

/// Round `value` up to a multiple of `align`. An alignment of 0 or 1 is a no-op.
pub(crate) fn align_up(value: usize, align: usize) -> Result<usize> {
    if align <= 1 {
        return Ok(value);
    }
    value
        .checked_add(align - 1)
        .map(|v| v / align * align)
        .ok_or_else(|| Error::invalid_plane("aligned row size overflows"))
}

/// Map component types, in storage order, to a color mode.
fn color_mode(types: &[u16]) -> Result<ColorMode> {
    let gray = |t: u16| t == COMPONENT_MONOCHROME || t == COMPONENT_LUMA;
    match types {
        [y] if gray(*y) => Ok(ColorMode::L),
        [y, COMPONENT_ALPHA] if gray(*y) => Ok(ColorMode::La),
        [COMPONENT_RED, COMPONENT_GREEN, COMPONENT_BLUE] => Ok(ColorMode::Rgb),
        [COMPONENT_RED, COMPONENT_GREEN, COMPONENT_BLUE, COMPONENT_ALPHA] => Ok(ColorMode::Rgba),
        other => Err(Error::unsupported(format!(
            "component layout {:?}",
            other
        ))),
    }
}

/// Decode an uncompressed item from its properties and payload.
pub(crate) fn decode_item(file: &HeifFile, item_id: u32, payload: &[u8]) -> Result<DecodedImage> {
    let properties = file.item_properties(item_id);

    let (width, height) = file.dimensions(item_id).ok_or(Error::MissingBox("ispe"))?;
    let config = properties
        .iter()
        .find_map(|p| match p {
            Property::UncompressedFrame(config) => Some(config),
            _ => None,
        })
        .ok_or(Error::MissingBox("uncC"))?;
    config.check_supported()?;

    if let Some(bits) = properties.iter().find_map(|p| match p {
        Property::PixelInformation { bits_per_channel } => Some(bits_per_channel),
        _ => None,
    }) {
        if bits.iter().any(|&b| b != 8) {
            return Err(Error::unsupported(format!("pixel depths {:?}", bits)));
        }
    }

    let definitions = if config.version == 1 {
        config.implied_component_types()
    } else {
        properties
            .iter()
            .find_map(|p| match p {
                Property::ComponentDefinition { component_types } => Some(component_types.clone()),
                _ => None,
            })
            .ok_or(Error::MissingBox("cmpd"))?
    };

    let types = config
        .components
        .iter()
        .map(|c| {
            definitions.get(c.index as usize).copied().ok_or_else(|| {
                Error::invalid_container(format!(
                    "uncC component index {} outside cmpd ({} entries)",
                    c.index,
                    definitions.len()
                ))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mode = color_mode(&types)?;
    let stride = config.stride(width, mode)?;

    tracing::debug!(
        "Uncompressed HEIF item {}: {}x{} {} stride {} ({} payload bytes)",
        item_id,
        width,
        height,
        mode,
        stride,
        payload.len()
    );

    RawPlane {
        mode,
        width,
        height,
        stride,
        data: payload,
    }
    .reconstruct()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uncc_v0(components: &[(u16, u8)], interleave: u8, row_align: u32) -> Vec<u8> {
        let mut data = vec![0, 0, 0, 0];
        data.extend_from_slice(&[0, 0, 0, 0]); // profile
        data.extend_from_slice(&(components.len() as u32).to_be_bytes());
        for (index, depth) in components {
            data.extend_from_slice(&index.to_be_bytes());
            data.extend_from_slice(&[depth - 1, 0, 0]);
        }
        data.extend_from_slice(&[0, interleave, 0, 0]);
        data.extend_from_slice(&0u32.to_be_bytes()); // pixel_size
        data.extend_from_slice(&row_align.to_be_bytes());
        data.extend_from_slice(&0u32.to_be_bytes()); // tile_align_size
        data.extend_from_slice(&0u32.to_be_bytes()); // num_tile_cols_minus_one
        data.extend_from_slice(&0u32.to_be_bytes()); // num_tile_rows_minus_one
        data
    }

    #[test]
    fn test_parse_v0() {
        let config = UncompressedConfig::parse(&uncc_v0(&[(0, 8), (1, 8), (2, 8)], 1, 64)).unwrap();
        assert_eq!(config.version, 0);
        assert_eq!(config.components.len(), 3);
        assert_eq!(config.components[2].index, 2);
        assert_eq!(config.components[0].bit_depth, 8);
        assert_eq!(config.row_align_size, 64);
        assert_eq!((config.tile_columns, config.tile_rows), (1, 1));
        assert!(config.check_supported().is_ok());
    }

    #[test]
    fn test_parse_v1_profiles() {
        let mut rgb3 = vec![1, 0, 0, 0];
        rgb3.extend_from_slice(b"rgb3");
        let config = UncompressedConfig::parse(&rgb3).unwrap();
        assert_eq!(config.components.len(), 3);
        assert_eq!(
            config.implied_component_types(),
            vec![COMPONENT_RED, COMPONENT_GREEN, COMPONENT_BLUE]
        );

        let mut abgr = vec![1, 0, 0, 0];
        abgr.extend_from_slice(b"abgr");
        assert!(matches!(
            UncompressedConfig::parse(&abgr),
            Err(Error::Unsupported(_))
        ));
    }

    #[test]
    fn test_unsupported_layouts() {
        let sixteen_bit = UncompressedConfig::parse(&uncc_v0(&[(0, 16)], 1, 0)).unwrap();
        assert!(sixteen_bit.check_supported().is_err());

        let planar_rgb = UncompressedConfig::parse(&uncc_v0(&[(0, 8), (1, 8), (2, 8)], 0, 0)).unwrap();
        assert!(planar_rgb.check_supported().is_err());

        let planar_gray = UncompressedConfig::parse(&uncc_v0(&[(0, 8)], 0, 0)).unwrap();
        assert!(planar_gray.check_supported().is_ok());
    }

    #[test]
    fn test_stride_alignment() {
        let config = UncompressedConfig::parse(&uncc_v0(&[(0, 8), (1, 8), (2, 8)], 1, 16)).unwrap();
        assert_eq!(config.stride(5, ColorMode::Rgb).unwrap(), 16);
        assert_eq!(config.stride(6, ColorMode::Rgb).unwrap(), 32);

        let tight = UncompressedConfig::parse(&uncc_v0(&[(0, 8)], 1, 0)).unwrap();
        assert_eq!(tight.stride(5, ColorMode::L).unwrap(), 5);
    }

    #[test]
    fn test_color_mode_mapping() {
        assert_eq!(color_mode(&[COMPONENT_MONOCHROME]).unwrap(), ColorMode::L);
        assert_eq!(color_mode(&[COMPONENT_LUMA, COMPONENT_ALPHA]).unwrap(), ColorMode::La);
        assert_eq!(
            color_mode(&[COMPONENT_RED, COMPONENT_GREEN, COMPONENT_BLUE]).unwrap(),
            ColorMode::Rgb
        );
        assert!(color_mode(&[COMPONENT_BLUE, COMPONENT_GREEN, COMPONENT_RED]).is_err());
    }

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(15, 0).unwrap(), 15);
        assert_eq!(align_up(15, 1).unwrap(), 15);
        assert_eq!(align_up(15, 4).unwrap(), 16);
        assert_eq!(align_up(16, 4).unwrap(), 16);
        assert!(align_up(usize::MAX, 8).is_err());
    }
}
