//! HEIF container support.
//!
//! A HEIF file is an ISO-BMFF file whose `meta` box describes image items.
//! Decoding means finding the primary item, its properties (dimensions,
//! component layout, row alignment) and the byte extents holding its pixels.
//!
//! Uncompressed (`unci`) items are rebuilt here directly from their raw
//! plane. Coded items (`hvc1`, `av01`, grids) go to libheif when the
//! `libheif` feature is enabled.

mod boxes;
#[cfg(feature = "libheif")]
mod native;
mod reader;
mod uncompressed;
pub mod writer;

pub use boxes::{BoxType, HEIF_BRANDS};
pub use reader::HeifReader;
pub use uncompressed::{ComponentSpec, UncompressedConfig};
pub use writer::{DataPlacement, UncompressedWriter};

use std::io::Cursor;

use crate::{DecodedImage, Error, Result};

/// Parsed structure of a HEIF file.
#[derive(Debug, Clone)]
pub struct HeifFile {
    /// Major brand from `ftyp`.
    pub major_brand: BoxType,
    /// Compatible brands from `ftyp`.
    pub compatible_brands: Vec<BoxType>,
    /// Item the reader should display.
    pub primary_item_id: u32,
    /// Item entries from `iinf`.
    pub items: Vec<ItemInfo>,
    /// Item locations from `iloc`.
    pub locations: Vec<ItemLocation>,
    /// Properties from `ipco`, in declaration order.
    pub properties: Vec<Property>,
    /// Property associations from `ipma`.
    pub associations: Vec<PropertyAssociation>,
    /// Payload of the `idat` box, if present.
    pub idat: Option<Vec<u8>>,
}

/// One entry of the item information box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemInfo {
    pub id: u32,
    pub item_type: BoxType,
    pub name: String,
    pub hidden: bool,
}

/// Where an item's bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemLocation {
    pub item_id: u32,
    /// 0 = file offsets, 1 = offsets into `idat`, 2 = other items.
    pub construction_method: u8,
    pub base_offset: u64,
    pub extents: Vec<Extent>,
}

/// A contiguous run of item bytes. A length of 0 runs to the end of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub offset: u64,
    pub length: u64,
}

/// An item property the decoder understands.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    /// `ispe`: image width and height.
    SpatialExtents { width: u32, height: u32 },
    /// `pixi`: bits per channel.
    PixelInformation { bits_per_channel: Vec<u8> },
    /// `cmpd`: component types, indexed by `uncC` component entries.
    ComponentDefinition { component_types: Vec<u16> },
    /// `uncC`: uncompressed frame layout.
    UncompressedFrame(UncompressedConfig),
    /// Anything else, kept for index bookkeeping.
    Other(BoxType),
}

/// Properties associated with one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyAssociation {
    pub item_id: u32,
    pub entries: Vec<AssociationEntry>,
}

/// One item-to-property link. `index` is 1-based into `ipco`; 0 means none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssociationEntry {
    pub essential: bool,
    pub index: u16,
}

impl HeifFile {
    /// The primary image item.
    pub fn primary_item(&self) -> Result<&ItemInfo> {
        self.items
            .iter()
            .find(|item| item.id == self.primary_item_id)
            .ok_or_else(|| {
                Error::invalid_container(format!(
                    "primary item {} has no 'infe' entry",
                    self.primary_item_id
                ))
            })
    }

    /// Location entry of an item.
    pub fn location(&self, item_id: u32) -> Option<&ItemLocation> {
        self.locations.iter().find(|loc| loc.item_id == item_id)
    }

    /// Properties associated with an item, in association order.
    pub fn item_properties(&self, item_id: u32) -> Vec<&Property> {
        self.associations
            .iter()
            .filter(|assoc| assoc.item_id == item_id)
            .flat_map(|assoc| assoc.entries.iter())
            .filter(|entry| entry.index > 0)
            .filter_map(|entry| self.properties.get(entry.index as usize - 1))
            .collect()
    }

    /// Width and height from the item's `ispe` property.
    pub fn dimensions(&self, item_id: u32) -> Option<(u32, u32)> {
        self.item_properties(item_id)
            .into_iter()
            .find_map(|prop| match prop {
                Property::SpatialExtents { width, height } => Some((*width, *height)),
                _ => None,
            })
    }
}

/// Decode the primary image of a HEIF file.
pub fn decode(data: &[u8]) -> Result<DecodedImage> {
    let mut reader = HeifReader::new(Cursor::new(data))?;
    let file = reader.parse()?;
    let item = file.primary_item()?;

    tracing::debug!(
        "HEIF primary item {} of type '{}' ({} items, brand '{}')",
        item.id,
        item.item_type,
        file.items.len(),
        file.major_brand
    );

    if item.item_type == BoxType::UNCI {
        let payload = reader.read_item_data(&file, item.id)?;
        return uncompressed::decode_item(&file, item.id, &payload);
    }

    decode_coded(data, item.item_type)
}

#[cfg(feature = "libheif")]
fn decode_coded(data: &[u8], _item_type: BoxType) -> Result<DecodedImage> {
    native::decode(data)
}

#[cfg(not(feature = "libheif"))]
fn decode_coded(_data: &[u8], item_type: BoxType) -> Result<DecodedImage> {
    Err(Error::unsupported(format!(
        "HEIF '{}' images need a compressed-image codec (build with the `libheif` feature)",
        item_type
    )))
}
