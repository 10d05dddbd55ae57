//! Bounds checked primitive reads honoring the byte order of an archive.

use std::fmt;

use byteorder::{BigEndian, ByteOrder as _, LittleEndian};

use crate::error::{Error, Result};

/// Byte order of an archive, resolved at runtime from its byte order mark
///
/// Generally big endian is used on the Wii U and little endian on the Switch.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// Most significant byte first (Wii U)
    Big,

    /// Least significant byte first (Switch)
    #[default]
    Little,
}

impl ByteOrder {
    /// Value of the byte order mark, stored in the archive's own byte order
    pub const MARK: u16 = 0xFEFF;

    /// Resolve the byte order from the two raw bytes of a byte order mark.
    ///
    /// The two valid marks are byte reversals of each other, so they can be told apart without
    /// knowing the byte order up front.
    pub fn from_mark(bytes: [u8; 2]) -> Option<Self> {
        match bytes {
            [0xFE, 0xFF] => Some(ByteOrder::Big),
            [0xFF, 0xFE] => Some(ByteOrder::Little),
            _ => None,
        }
    }
}

impl From<ByteOrder> for binrw::Endian {
    fn from(value: ByteOrder) -> Self {
        match value {
            ByteOrder::Big => binrw::Endian::Big,
            ByteOrder::Little => binrw::Endian::Little,
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ByteOrder::Big => write!(f, "big endian"),
            ByteOrder::Little => write!(f, "little endian"),
        }
    }
}

/// Reads integers and strings out of a byte slice
///
/// Every read is checked against the length of the slice and fails with
/// [`Error::TruncatedInput`] instead of panicking.
#[derive(Debug, Clone, Copy)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    order: ByteOrder,
}

impl<'a> ByteReader<'a> {
    /// Wrap `data`, interpreting integers with `order`.
    pub fn new(data: &'a [u8], order: ByteOrder) -> Self {
        Self { data, order }
    }

    /// The byte order integers are read with
    pub fn order(&self) -> ByteOrder {
        self.order
    }

    /// Length of the underlying buffer
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the underlying buffer is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow `len` bytes starting at `offset`.
    pub fn span(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or(Error::TruncatedInput {
                offset,
                needed: len,
                available: self.data.len(),
            })
    }

    /// Read a `u16` at `offset`.
    pub fn u16_at(&self, offset: usize) -> Result<u16> {
        let bytes = self.span(offset, 2)?;
        Ok(match self.order {
            ByteOrder::Big => BigEndian::read_u16(bytes),
            ByteOrder::Little => LittleEndian::read_u16(bytes),
        })
    }

    /// Read a `u32` at `offset`.
    pub fn u32_at(&self, offset: usize) -> Result<u32> {
        let bytes = self.span(offset, 4)?;
        Ok(match self.order {
            ByteOrder::Big => BigEndian::read_u32(bytes),
            ByteOrder::Little => LittleEndian::read_u32(bytes),
        })
    }

    /// Borrow the null terminated string starting at `offset`, without its terminator.
    pub fn cstr_at(&self, offset: usize) -> Result<&'a [u8]> {
        let rest = self.data.get(offset..).ok_or(Error::TruncatedInput {
            offset,
            needed: 1,
            available: self.data.len(),
        })?;

        let end = rest
            .iter()
            .position(|b| *b == 0)
            .ok_or(Error::TruncatedInput {
                offset,
                needed: rest.len() + 1,
                available: self.data.len(),
            })?;

        Ok(&rest[..end])
    }
}
