//! This library handles decompressing **Yaz0** streams used by Nintendo EAD/EPD titles.
//!
//! # Yaz0 Format Documentation
//!
//! Yaz0 is a byte oriented LZ77 variant. It is most often found wrapped around SARC archives,
//! in which case the file usually carries the `.szs` extension.
//!
//! ## File Structure
//!
//! A Yaz0 stream consists of a 16 byte header followed by the compressed data.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: 0x59617A30 ("Yaz0")                               |
//! | 0x0004         | Uncompressed Size      | 4 bytes: Size of the data once decompressed                |
//! | 0x0008         | Data Alignment         | 4 bytes: Alignment hint for the output, 0 on older files   |
//! | 0x000C         | Reserved               | 4 bytes: Always zero                                       |
//!
//! All header fields are stored in big endian regardless of the platform.
//!
//! ### Compressed Data
//!
//! The data is a sequence of groups. Each group starts with a single byte whose bits, read from
//! the most significant one, describe up to eight operations:
//!
//! - **1**: copy the next input byte to the output.
//! - **0**: back-reference. Two bytes `b1 b2` follow. The distance back from the current output
//!   position is `((b1 & 0x0F) << 8 | b2) + 1`. If the upper nibble of `b1` is non zero the
//!   number of bytes to copy is that nibble plus 2, otherwise a third byte follows and the number
//!   of bytes to copy is that byte plus `0x12`.
//!
//! Back-references may overlap the bytes they produce, so copies are performed one byte at a
//! time. Decompression stops as soon as the declared uncompressed size has been produced; any
//! padding after that point is ignored.
//!

pub mod decompress;
pub mod error;
pub mod types;

pub use decompress::{decompress, decompress_into, is_compressed};
pub use types::Yaz0Header;
