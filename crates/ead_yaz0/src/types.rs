//! Base types for structure of a Yaz0 stream.

use std::io::Cursor;

use binrw::{BinRead, BinWrite};

use crate::error::{Error, Result};

/// Yaz0 stream header
///
/// Always starts with "Yaz0" and is always stored in big endian format
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(magic = b"Yaz0", big)]
pub struct Yaz0Header {
    /// The size of the data once decompressed
    pub uncompressed_size: u32,

    /// Required alignment of the decompressed buffer, zero when unspecified
    pub alignment: u32,

    /// Unused, always zero
    pub reserved: u32,
}

impl Yaz0Header {
    /// The magic number every Yaz0 stream starts with
    pub const MAGIC: &'static [u8; 4] = b"Yaz0";

    /// Size of the header in bytes, including the magic
    pub const SIZE: usize = 0x10;

    /// Read the header from the start of `data`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < Self::MAGIC.len() {
            return Err(Error::TruncatedHeader(data.len()));
        }
        if &data[..Self::MAGIC.len()] != Self::MAGIC {
            return Err(Error::BadMagic {
                found: data[..Self::MAGIC.len()].to_vec(),
            });
        }
        if data.len() < Self::SIZE {
            return Err(Error::TruncatedHeader(data.len()));
        }

        Ok(Self::read(&mut Cursor::new(&data[..Self::SIZE]))?)
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use binrw::BinWrite;
    use pretty_assertions::assert_eq;

    use crate::error::{Error, Result};
    use crate::types::Yaz0Header;

    #[test]
    fn read_header() -> Result<()> {
        #[rustfmt::skip]
        let input = [
            0x59, 0x61, 0x7A, 0x30,
            0x00, 0x01, 0x02, 0x00,
            0x00, 0x00, 0x00, 0x80,
            0x00, 0x00, 0x00, 0x00,
        ];

        let expected = Yaz0Header {
            uncompressed_size: 0x10200,
            alignment: 0x80,
            ..Default::default()
        };

        assert_eq!(Yaz0Header::parse(&input)?, expected);

        Ok(())
    }

    #[test]
    fn write_header() -> Result<()> {
        #[rustfmt::skip]
        let expected: Vec<u8> = vec![
            0x59, 0x61, 0x7A, 0x30,
            0x00, 0x00, 0x00, 0x2A,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
        ];

        let header = Yaz0Header {
            uncompressed_size: 42,
            ..Default::default()
        };

        let mut actual = Vec::new();
        header.write(&mut Cursor::new(&mut actual))?;

        assert_eq!(actual, expected);

        Ok(())
    }

    #[test]
    fn read_header_bad_magic() {
        let input = *b"SARC\0\0\0\0\0\0\0\0\0\0\0\0";

        assert!(matches!(
            Yaz0Header::parse(&input),
            Err(Error::BadMagic { found }) if found == b"SARC"
        ));
    }

    #[test]
    fn read_header_truncated() {
        let input = *b"Yaz0\0\0\0\x10";

        assert!(matches!(
            Yaz0Header::parse(&input),
            Err(Error::TruncatedHeader(8))
        ));
    }
}
