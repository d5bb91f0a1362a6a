//! HEIF file reader with box parsing.

use std::io::{Read, Seek, SeekFrom};

use super::boxes::{find_box, split_boxes, BoxHeader, BoxType, ByteCursor, RawBox, HEIF_BRANDS};
use super::{
    AssociationEntry, Extent, HeifFile, ItemInfo, ItemLocation, Property, PropertyAssociation,
    UncompressedConfig,
};
use crate::{Error, Result};

/// Maximum allowed box or item data size (64 MB) to prevent OOM on malformed files.
const MAX_BOX_DATA_SIZE: u64 = 64 * 1024 * 1024;

/// HEIF file reader.
pub struct HeifReader<R> {
    reader: R,
    file_size: u64,
}

impl<R: Read + Seek> HeifReader<R> {
    /// Create a new HEIF reader.
    pub fn new(mut reader: R) -> Result<Self> {
        let file_size = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;
        Ok(Self { reader, file_size })
    }

    /// Parse the file structure: brands and the `meta` box.
    pub fn parse(&mut self) -> Result<HeifFile> {
        let boxes = self.read_boxes(0, self.file_size)?;

        let ftyp = boxes
            .first()
            .filter(|b| b.box_type == BoxType::FTYP)
            .cloned()
            .ok_or_else(|| Error::invalid_container("file does not start with an 'ftyp' box"))?;
        let ftyp_data = self.read_box_data(&ftyp)?;
        let (major_brand, compatible_brands) = parse_ftyp(&ftyp_data)?;

        let is_heif = std::iter::once(&major_brand)
            .chain(compatible_brands.iter())
            .any(|brand| HEIF_BRANDS.contains(brand));
        if !is_heif {
            return Err(Error::invalid_container(format!(
                "brand '{}' is not a HEIF image brand",
                major_brand
            )));
        }

        let meta = boxes
            .iter()
            .find(|b| b.box_type == BoxType::META)
            .cloned()
            .ok_or(Error::MissingBox("meta"))?;
        let meta_data = self.read_box_data(&meta)?;

        parse_meta(&meta_data, major_brand, compatible_brands)
    }

    /// Read the bytes of an item, concatenating its extents.
    pub fn read_item_data(&mut self, file: &HeifFile, item_id: u32) -> Result<Vec<u8>> {
        let location = file.location(item_id).ok_or(Error::MissingBox("iloc"))?;

        match location.construction_method {
            0 => {
                let mut data = Vec::new();
                for extent in &location.extents {
                    let start = location
                        .base_offset
                        .checked_add(extent.offset)
                        .ok_or_else(|| Error::invalid_container("extent offset overflows"))?;
                    let length = resolve_length(extent.length, start, self.file_size)?;
                    check_total(data.len() as u64 + length)?;

                    self.reader.seek(SeekFrom::Start(start))?;
                    let mut chunk = vec![0u8; length as usize];
                    self.reader.read_exact(&mut chunk)?;
                    data.extend_from_slice(&chunk);
                }
                Ok(data)
            }
            1 => {
                let idat = file.idat.as_deref().ok_or(Error::MissingBox("idat"))?;
                let mut data = Vec::new();
                for extent in &location.extents {
                    let start = location
                        .base_offset
                        .checked_add(extent.offset)
                        .ok_or_else(|| Error::invalid_container("extent offset overflows"))?;
                    let length = resolve_length(extent.length, start, idat.len() as u64)?;
                    check_total(data.len() as u64 + length)?;
                    data.extend_from_slice(&idat[start as usize..(start + length) as usize]);
                }
                Ok(data)
            }
            method => Err(Error::unsupported(format!(
                "item construction method {}",
                method
            ))),
        }
    }

    /// Read boxes at the given level.
    fn read_boxes(&mut self, start: u64, end: u64) -> Result<Vec<BoxHeader>> {
        let mut boxes = Vec::new();
        let mut pos = start;

        while pos < end {
            self.reader.seek(SeekFrom::Start(pos))?;

            let mut header = [0u8; 8];
            if self.reader.read_exact(&mut header).is_err() {
                break;
            }

            let size = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as u64;
            let box_type = BoxType::from_bytes([header[4], header[5], header[6], header[7]]);

            let (actual_size, header_size) = if size == 1 {
                // 64-bit extended size
                let mut ext = [0u8; 8];
                self.reader.read_exact(&mut ext)?;
                (u64::from_be_bytes(ext), 16u8)
            } else if size == 0 {
                // Box extends to end of file
                (end - pos, 8u8)
            } else {
                (size, 8u8)
            };

            if actual_size < header_size as u64 {
                return Err(Error::invalid_container(format!(
                    "box '{}' declares size {} smaller than its header",
                    box_type, actual_size
                )));
            }
            let box_end = pos
                .checked_add(actual_size)
                .filter(|box_end| *box_end <= end)
                .ok_or_else(|| {
                    Error::invalid_container(format!(
                        "box '{}' at offset {} extends past the end of the file",
                        box_type, pos
                    ))
                })?;

            boxes.push(BoxHeader {
                box_type,
                size: actual_size,
                data_offset: pos + header_size as u64,
                header_size,
            });

            pos = box_end;
        }

        Ok(boxes)
    }

    /// Read and validate box data, rejecting oversized boxes.
    fn read_box_data(&mut self, header: &BoxHeader) -> Result<Vec<u8>> {
        let size = header.data_size();
        if size > MAX_BOX_DATA_SIZE {
            return Err(Error::invalid_container(format!(
                "box {} data size {} exceeds maximum {}",
                header.box_type, size, MAX_BOX_DATA_SIZE
            )));
        }
        self.reader.seek(SeekFrom::Start(header.data_offset))?;
        let mut data = vec![0u8; size as usize];
        self.reader.read_exact(&mut data)?;
        Ok(data)
    }
}

fn resolve_length(length: u64, start: u64, source_len: u64) -> Result<u64> {
    let available = source_len.checked_sub(start).ok_or(Error::Truncated {
        need: start as usize,
        have: source_len as usize,
    })?;
    if length == 0 {
        return Ok(available);
    }
    if length > available {
        return Err(Error::Truncated {
            need: length as usize,
            have: available as usize,
        });
    }
    Ok(length)
}

fn check_total(total: u64) -> Result<()> {
    if total > MAX_BOX_DATA_SIZE {
        return Err(Error::invalid_container(format!(
            "item data size {} exceeds maximum {}",
            total, MAX_BOX_DATA_SIZE
        )));
    }
    Ok(())
}

/// Parse ftyp: major brand, minor version, compatible brands.
fn parse_ftyp(data: &[u8]) -> Result<(BoxType, Vec<BoxType>)> {
    let mut cursor = ByteCursor::new(data);
    let major = cursor.read_fourcc()?;
    cursor.skip(4)?;

    let mut compatible = Vec::with_capacity(cursor.remaining() / 4);
    while cursor.remaining() >= 4 {
        compatible.push(cursor.read_fourcc()?);
    }
    Ok((major, compatible))
}

/// Parse the meta box payload.
fn parse_meta(
    data: &[u8],
    major_brand: BoxType,
    compatible_brands: Vec<BoxType>,
) -> Result<HeifFile> {
    let mut cursor = ByteCursor::new(data);
    cursor.read_full_box_header()?;
    let children = split_boxes(cursor.rest())?;

    let handler = parse_hdlr(find_box(&children, BoxType::HDLR).ok_or(Error::MissingBox("hdlr"))?)?;
    if handler != BoxType::PICT {
        return Err(Error::invalid_container(format!(
            "meta handler is '{}', expected 'pict'",
            handler
        )));
    }

    let primary_item_id =
        parse_pitm(find_box(&children, BoxType::PITM).ok_or(Error::MissingBox("pitm"))?)?;
    let items = parse_iinf(find_box(&children, BoxType::IINF).ok_or(Error::MissingBox("iinf"))?)?;

    let locations = match find_box(&children, BoxType::ILOC) {
        Some(payload) => parse_iloc(payload)?,
        None => Vec::new(),
    };

    let (properties, associations) = match find_box(&children, BoxType::IPRP) {
        Some(payload) => parse_iprp(payload)?,
        None => (Vec::new(), Vec::new()),
    };

    let idat = find_box(&children, BoxType::IDAT).map(<[u8]>::to_vec);

    Ok(HeifFile {
        major_brand,
        compatible_brands,
        primary_item_id,
        items,
        locations,
        properties,
        associations,
        idat,
    })
}

/// Parse hdlr: handler type.
fn parse_hdlr(data: &[u8]) -> Result<BoxType> {
    let mut cursor = ByteCursor::new(data);
    cursor.read_full_box_header()?;
    cursor.skip(4)?; // pre_defined
    cursor.read_fourcc()
}

/// Parse pitm: primary item ID.
fn parse_pitm(data: &[u8]) -> Result<u32> {
    let mut cursor = ByteCursor::new(data);
    let (version, _) = cursor.read_full_box_header()?;
    if version == 0 {
        cursor.read_u16().map(u32::from)
    } else {
        cursor.read_u32()
    }
}

/// Parse iinf: item information entries.
fn parse_iinf(data: &[u8]) -> Result<Vec<ItemInfo>> {
    let mut cursor = ByteCursor::new(data);
    let (version, _) = cursor.read_full_box_header()?;
    let declared = if version == 0 {
        cursor.read_u16()? as usize
    } else {
        cursor.read_u32()? as usize
    };

    let items = split_boxes(cursor.rest())?
        .into_iter()
        .filter(|b| b.box_type == BoxType::INFE)
        .map(parse_infe)
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .flatten()
        .collect::<Vec<_>>();

    if items.len() != declared {
        tracing::debug!("iinf declares {} entries, found {}", declared, items.len());
    }
    Ok(items)
}

/// Parse infe. Versions before 2 carry no item type and are skipped.
fn parse_infe(raw: RawBox<'_>) -> Result<Option<ItemInfo>> {
    let mut cursor = ByteCursor::new(raw.payload);
    let (version, flags) = cursor.read_full_box_header()?;
    if version < 2 {
        return Ok(None);
    }

    let id = if version == 2 {
        u32::from(cursor.read_u16()?)
    } else {
        cursor.read_u32()?
    };
    cursor.skip(2)?; // item_protection_index
    let item_type = cursor.read_fourcc()?;
    let name = cursor.read_cstring();

    Ok(Some(ItemInfo {
        id,
        item_type,
        name,
        hidden: flags & 1 == 1,
    }))
}

/// Parse iloc: item locations.
fn parse_iloc(data: &[u8]) -> Result<Vec<ItemLocation>> {
    let mut cursor = ByteCursor::new(data);
    let (version, _) = cursor.read_full_box_header()?;
    if version > 2 {
        return Err(Error::unsupported(format!("iloc version {}", version)));
    }

    let sizes = cursor.read_u8()?;
    let offset_size = sizes >> 4;
    let length_size = sizes & 0x0F;
    let sizes = cursor.read_u8()?;
    let base_offset_size = sizes >> 4;
    let index_size = if version >= 1 { sizes & 0x0F } else { 0 };

    let item_count = if version < 2 {
        cursor.read_u16()? as u32
    } else {
        cursor.read_u32()?
    };

    let mut locations = Vec::with_capacity(item_count.min(1024) as usize);
    for _ in 0..item_count {
        let item_id = if version < 2 {
            u32::from(cursor.read_u16()?)
        } else {
            cursor.read_u32()?
        };
        let construction_method = if version >= 1 {
            (cursor.read_u16()? & 0x000F) as u8
        } else {
            0
        };
        cursor.skip(2)?; // data_reference_index
        let base_offset = cursor.read_sized(base_offset_size)?;

        let extent_count = cursor.read_u16()?;
        let mut extents = Vec::with_capacity(extent_count as usize);
        for _ in 0..extent_count {
            if index_size > 0 {
                cursor.read_sized(index_size)?;
            }
            let offset = cursor.read_sized(offset_size)?;
            let length = cursor.read_sized(length_size)?;
            extents.push(Extent { offset, length });
        }

        locations.push(ItemLocation {
            item_id,
            construction_method,
            base_offset,
            extents,
        });
    }

    Ok(locations)
}

/// Parse iprp: property container and associations.
fn parse_iprp(data: &[u8]) -> Result<(Vec<Property>, Vec<PropertyAssociation>)> {
    let children = split_boxes(data)?;

    let properties = match find_box(&children, BoxType::IPCO) {
        Some(payload) => split_boxes(payload)?
            .into_iter()
            .map(parse_property)
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    let mut associations = Vec::new();
    for raw in children.iter().filter(|b| b.box_type == BoxType::IPMA) {
        associations.extend(parse_ipma(raw.payload)?);
    }

    Ok((properties, associations))
}

/// Parse a single property box from ipco.
fn parse_property(raw: RawBox<'_>) -> Result<Property> {
    let mut cursor = ByteCursor::new(raw.payload);

    let property = match raw.box_type {
        BoxType::ISPE => {
            cursor.read_full_box_header()?;
            Property::SpatialExtents {
                width: cursor.read_u32()?,
                height: cursor.read_u32()?,
            }
        }
        BoxType::PIXI => {
            cursor.read_full_box_header()?;
            let channels = cursor.read_u8()? as usize;
            Property::PixelInformation {
                bits_per_channel: cursor.read_bytes(channels)?.to_vec(),
            }
        }
        BoxType::CMPD => {
            let count = cursor.read_u32()?;
            let mut component_types = Vec::with_capacity(count.min(64) as usize);
            for _ in 0..count {
                let component_type = cursor.read_u16()?;
                if component_type >= 0x8000 {
                    cursor.read_cstring(); // component_type_uri
                }
                component_types.push(component_type);
            }
            Property::ComponentDefinition { component_types }
        }
        BoxType::UNCC => Property::UncompressedFrame(UncompressedConfig::parse(raw.payload)?),
        other => Property::Other(other),
    };

    Ok(property)
}

/// Parse ipma: item property associations.
fn parse_ipma(data: &[u8]) -> Result<Vec<PropertyAssociation>> {
    let mut cursor = ByteCursor::new(data);
    let (version, flags) = cursor.read_full_box_header()?;
    let wide_index = flags & 1 == 1;

    let entry_count = cursor.read_u32()?;
    let mut associations = Vec::with_capacity(entry_count.min(1024) as usize);
    for _ in 0..entry_count {
        let item_id = if version < 1 {
            u32::from(cursor.read_u16()?)
        } else {
            cursor.read_u32()?
        };

        let count = cursor.read_u8()?;
        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let entry = if wide_index {
                let value = cursor.read_u16()?;
                AssociationEntry {
                    essential: value & 0x8000 != 0,
                    index: value & 0x7FFF,
                }
            } else {
                let value = cursor.read_u8()?;
                AssociationEntry {
                    essential: value & 0x80 != 0,
                    index: u16::from(value & 0x7F),
                }
            };
            entries.push(entry);
        }

        associations.push(PropertyAssociation { item_id, entries });
    }

    Ok(associations)
}
