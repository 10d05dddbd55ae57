//! Base types for structure of a SARC file, as written to disk.
//!
//! None of these carry a byte order of their own; they are written with the byte order of the
//! archive through [`binrw::BinWrite::write_options`].

use binrw::BinWrite;

/// SARC file header
#[derive(BinWrite, Debug, Copy, Clone, PartialEq, Eq)]
#[bw(magic = b"SARC")]
pub struct ResHeader {
    /// Size of this header, always 0x14
    pub header_size: u16,

    /// Always [`crate::ByteOrder::MARK`], which encodes the byte order once written
    pub bom: u16,

    /// The size of the whole archive
    pub file_size: u32,

    /// The offset from the beginning of the file where file data starts
    pub data_offset: u32,

    /// Format version, always 0x0100
    pub version: u16,

    /// Unused
    pub reserved: u16,
}

/// File allocation table header
#[derive(BinWrite, Debug, Copy, Clone, PartialEq, Eq)]
#[bw(magic = b"SFAT")]
pub struct ResFatHeader {
    /// Size of this header, always 0x0C
    pub header_size: u16,

    /// The number of records following this header
    pub num_files: u16,

    /// The multiplier used to hash file names
    pub hash_multiplier: u32,
}

/// File allocation table record
#[derive(BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct ResFatEntry {
    /// Hash of the file name
    pub name_hash: u32,

    /// Collision counter in the high byte, name offset in words in the low 24 bits
    pub name_attributes: u32,

    /// Start of the file data relative to the data section
    pub data_start: u32,

    /// End of the file data relative to the data section
    pub data_end: u32,
}

/// File name table header
#[derive(BinWrite, Debug, Copy, Clone, PartialEq, Eq)]
#[bw(magic = b"SFNT")]
pub struct ResFntHeader {
    /// Size of this header, always 0x08
    pub header_size: u16,

    /// Unused
    pub reserved: u16,
}
