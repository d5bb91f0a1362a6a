//! ISO-BMFF box definitions and byte-level parsing helpers.

use crate::{Error, Result};

/// Four-character box type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoxType(pub [u8; 4]);

impl BoxType {
    pub const FTYP: Self = Self(*b"ftyp");
    pub const META: Self = Self(*b"meta");
    pub const HDLR: Self = Self(*b"hdlr");
    pub const PITM: Self = Self(*b"pitm");
    pub const IINF: Self = Self(*b"iinf");
    pub const INFE: Self = Self(*b"infe");
    pub const ILOC: Self = Self(*b"iloc");
    pub const IDAT: Self = Self(*b"idat");
    pub const IPRP: Self = Self(*b"iprp");
    pub const IPCO: Self = Self(*b"ipco");
    pub const IPMA: Self = Self(*b"ipma");
    pub const ISPE: Self = Self(*b"ispe");
    pub const PIXI: Self = Self(*b"pixi");
    pub const CMPD: Self = Self(*b"cmpd");
    pub const UNCC: Self = Self(*b"uncC");

    /// Item types.
    pub const UNCI: Self = Self(*b"unci");

    /// Handler type of image collections.
    pub const PICT: Self = Self(*b"pict");

    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Get the 4-char code as a string.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("????")
    }
}

impl std::fmt::Display for BoxType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Brands that identify a HEIF image file.
pub const HEIF_BRANDS: &[BoxType] = &[
    BoxType(*b"heic"),
    BoxType(*b"heix"),
    BoxType(*b"heim"),
    BoxType(*b"heis"),
    BoxType(*b"hevc"),
    BoxType(*b"hevx"),
    BoxType(*b"mif1"),
    BoxType(*b"msf1"),
    BoxType(*b"mif2"),
    BoxType(*b"mif3"),
];

/// Parsed box header within a seekable stream.
#[derive(Debug, Clone)]
pub struct BoxHeader {
    /// Box type code.
    pub box_type: BoxType,
    /// Box size including header.
    pub size: u64,
    /// Stream offset where box data starts (after header).
    pub data_offset: u64,
    /// Size of the header (8 or 16 bytes).
    pub header_size: u8,
}

impl BoxHeader {
    /// Get the data size (size - header).
    pub fn data_size(&self) -> u64 {
        self.size.saturating_sub(self.header_size as u64)
    }
}

/// A child box found inside an in-memory payload.
#[derive(Debug, Clone, Copy)]
pub struct RawBox<'a> {
    pub box_type: BoxType,
    pub payload: &'a [u8],
}

/// Split an in-memory payload into its child boxes.
pub fn split_boxes(data: &[u8]) -> Result<Vec<RawBox<'_>>> {
    let mut boxes = Vec::new();
    let mut cursor = ByteCursor::new(data);

    while cursor.remaining() > 0 {
        let start = cursor.position();
        let size = cursor.read_u32()? as u64;
        let box_type = cursor.read_fourcc()?;

        let (size, header) = match size {
            0 => ((data.len() - start) as u64, 8u64),
            1 => (cursor.read_u64()?, 16u64),
            n => (n, 8u64),
        };

        if size < header {
            return Err(Error::invalid_container(format!(
                "box '{}' declares size {} smaller than its header",
                box_type, size
            )));
        }

        let payload_len = usize::try_from(size - header)
            .map_err(|_| Error::invalid_container(format!("box '{}' is too large", box_type)))?;
        let payload = cursor.read_bytes(payload_len)?;
        boxes.push(RawBox { box_type, payload });
    }

    Ok(boxes)
}

/// Find the first child box of a type.
pub fn find_box<'a>(boxes: &[RawBox<'a>], box_type: BoxType) -> Option<&'a [u8]> {
    boxes
        .iter()
        .find(|b| b.box_type == box_type)
        .map(|b| b.payload)
}

/// Big-endian reader over a byte slice.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Bytes not yet consumed.
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(Error::Truncated {
                need: len,
                have: self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let b = self.read_bytes(8)?;
        Ok(u64::from_be_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    /// Read an unsigned integer stored in 0, 4 or 8 bytes.
    pub fn read_sized(&mut self, size: u8) -> Result<u64> {
        match size {
            0 => Ok(0),
            4 => self.read_u32().map(u64::from),
            8 => self.read_u64(),
            n => Err(Error::invalid_container(format!(
                "unsupported field size {} bytes",
                n
            ))),
        }
    }

    pub fn read_fourcc(&mut self) -> Result<BoxType> {
        let b = self.read_bytes(4)?;
        Ok(BoxType::from_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read the version and flags of a full box.
    pub fn read_full_box_header(&mut self) -> Result<(u8, u32)> {
        let word = self.read_u32()?;
        Ok(((word >> 24) as u8, word & 0x00FF_FFFF))
    }

    /// Read a NUL-terminated UTF-8 string; a missing terminator ends at the payload end.
    pub fn read_cstring(&mut self) -> String {
        let rest = self.rest();
        let end = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());
        let text = String::from_utf8_lossy(&rest[..end]).into_owned();
        self.pos += (end + 1).min(rest.len());
        text
    }
}
