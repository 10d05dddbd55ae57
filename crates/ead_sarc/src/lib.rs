//! This library handles reading from and creating **SARC** archives used by Nintendo EAD/EPD titles.
//!
//! # SARC Archive Format Documentation
//!
//! This crate provides utilities to index and extract data from the **SARC** archive format. A SARC
//! bundles many named byte blobs into a single buffer and is commonly found wrapped in Yaz0
//! compression (`.szs`, `.pack`, `.sbactorpack`, ...). Enable the default `yaz0` feature to open
//! compressed archives directly.
//!
//! ## File Structure
//!
//! A SARC file consists of a header, a file allocation table (SFAT), a file name table (SFNT)
//! and the data section.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: 0x53415243 ("SARC")                               |
//! | 0x0004         | Header Size            | 2 bytes: Fixed value 0x14                                  |
//! | 0x0006         | Byte Order Mark        | 2 bytes: `FE FF` for big endian, `FF FE` for little endian |
//! | 0x0008         | File Size              | 4 bytes: Total size of the archive                         |
//! | 0x000C         | Data Offset            | 4 bytes: Offset to the start of the data section           |
//! | 0x0010         | Version                | 2 bytes: Fixed value 0x0100                                |
//! | 0x0012         | Reserved               | 2 bytes                                                    |
//!
//! ### Header
//!
//! - **Byte Order Mark**: The value `0xFEFF` written in the byte order of the archive. Every
//!   multi-byte integer after it, including those of the tables below, uses that byte order.
//! - **File Size**: Informational. A mismatch with the real buffer length is reported but does
//!   not prevent the archive from being read.
//! - **Data Offset**: Absolute offset of the data section. Must lie between the end of the header
//!   and the end of the archive.
//!
//! ### File Allocation Table
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: "SFAT"                                         |
//! | 0x0004         | Header Size            | 2 bytes: Fixed value 0x0C                               |
//! | 0x0006         | File Count             | 2 bytes: Number of entries, at most 0x3FFF              |
//! | 0x0008         | Hash Multiplier        | 4 bytes: Multiplier of the name hash, usually 0x65      |
//!
//! The header is followed by one 16 byte record per file, sorted by name hash:
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Name Hash              | 4 bytes: Hash of the file name                          |
//! | 0x0004         | Name Attributes        | 4 bytes: Collision counter and name offset              |
//! | 0x0008         | Data Start             | 4 bytes: Start of the data, relative to the data offset |
//! | 0x000C         | Data End               | 4 bytes: End of the data, relative to the data offset   |
//!
//! - **Name Hash**: `hash = hash * multiplier + byte` over the bytes of the name, with each byte
//!   sign extended and the arithmetic wrapping. See [`hash_name`].
//! - **Name Attributes**: The high byte is zero when the file has no name. Otherwise it is a
//!   1-based counter distinguishing names that share a hash, and the low 24 bits are the offset
//!   of the name in the name table, in units of 4 bytes.
//!
//! ### File Name Table
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: "SFNT"                                         |
//! | 0x0004         | Header Size            | 2 bytes: Fixed value 0x08                               |
//! | 0x0006         | Reserved               | 2 bytes                                                 |
//!
//! The header is followed by the names as null terminated UTF-8 strings, each padded to a
//! multiple of 4 bytes.
//!
//! ### Data Section
//!
//! File data is stored back to back, each file padded to its required alignment. The alignment
//! is not recorded anywhere; [`SarcArchive::guess_alignment`] infers it from the offsets.
//!

#![cfg_attr(not(test), deny(clippy::unwrap_used))]

pub mod bytes;
pub mod error;
pub mod hash;
pub mod header;
pub mod read;
pub mod table;
pub mod types;
pub mod write;

pub use bytes::{ByteOrder, ByteReader};
pub use hash::hash_name;
pub use header::SarcHeader;
pub use read::{OpenOptions, SarcArchive, SarcFile};
pub use table::{FileEntry, FileTable, UnsortedTablePolicy};
pub use write::{SarcWriter, SarcWriterOptions};
