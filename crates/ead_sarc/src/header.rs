//! Parsing of the fixed archive header.

use tracing::{instrument, warn};

use crate::bytes::{ByteOrder, ByteReader};
use crate::error::{Error, Result, SizeMismatch};

/// SARC archive header
///
/// Always starts with "SARC". The byte order mark decides how every following integer is read.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SarcHeader {
    /// Byte order of the whole archive
    pub byte_order: ByteOrder,

    /// The size of the archive as stated by the header
    pub file_size: u32,

    /// The offset from the beginning of the archive where file data starts
    pub data_offset: u32,

    /// Format version, only 0x0100 is supported
    pub version: u16,

    /// Set when `file_size` disagrees with the length of the buffer
    pub size_mismatch: Option<SizeMismatch>,
}

impl SarcHeader {
    /// The magic number every archive starts with
    pub const MAGIC: &'static [u8; 4] = b"SARC";

    /// Size of the header in bytes, including the magic
    pub const SIZE: usize = 0x14;

    /// The only supported version
    pub const VERSION: u16 = 0x0100;

    /// Parse and validate the header at the start of `data`.
    #[instrument(skip_all, err, fields(size = data.len()))]
    pub fn parse(data: &[u8]) -> Result<Self> {
        let raw = ByteReader::new(data, ByteOrder::Big);

        let magic = raw.span(0, Self::MAGIC.len())?;
        if magic != Self::MAGIC {
            return Err(Error::BadMagic {
                found: magic.to_vec(),
                expected: "SARC",
            });
        }
        raw.span(0, Self::SIZE)?;

        let mark = raw.span(6, 2)?;
        let byte_order = ByteOrder::from_mark([mark[0], mark[1]]).ok_or_else(|| {
            Error::CorruptHeader(format!("invalid byte order mark {mark:02x?}"))
        })?;

        let reader = ByteReader::new(data, byte_order);
        let header_size = reader.u16_at(4)?;
        if header_size as usize != Self::SIZE {
            return Err(Error::UnsupportedVersion(format!(
                "header size {header_size:#x}, expected {:#x}",
                Self::SIZE
            )));
        }

        let file_size = reader.u32_at(8)?;
        let data_offset = reader.u32_at(12)?;
        let version = reader.u16_at(16)?;
        if version != Self::VERSION {
            return Err(Error::UnsupportedVersion(format!(
                "version {version:#06x}, expected {:#06x}",
                Self::VERSION
            )));
        }

        if (data_offset as usize) < Self::SIZE || data_offset as usize > data.len() {
            return Err(Error::CorruptHeader(format!(
                "data offset {data_offset:#x} outside of {:#x}..={:#x}",
                Self::SIZE,
                data.len()
            )));
        }

        let size_mismatch = (file_size as usize != data.len()).then_some(SizeMismatch {
            declared: file_size,
            actual: data.len(),
        });
        if let Some(mismatch) = &size_mismatch {
            warn!(%mismatch, "archive size does not match the buffer");
        }

        Ok(SarcHeader {
            byte_order,
            file_size,
            data_offset,
            version,
            size_mismatch,
        })
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use crate::bytes::ByteOrder;
    use crate::error::{Error, Result, SizeMismatch};
    use crate::header::SarcHeader;

    #[test]
    fn read_big_endian_header() -> Result<()> {
        #[rustfmt::skip]
        let input = [
            0x53, 0x41, 0x52, 0x43, 0x00, 0x14, 0xFE, 0xFF,
            0x00, 0x00, 0x00, 0x18,
            0x00, 0x00, 0x00, 0x18,
            0x01, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
        ];

        let expected = SarcHeader {
            byte_order: ByteOrder::Big,
            file_size: 0x18,
            data_offset: 0x18,
            version: 0x0100,
            size_mismatch: None,
        };

        assert_eq!(SarcHeader::parse(&input)?, expected);

        Ok(())
    }

    #[test]
    fn read_little_endian_header() -> Result<()> {
        #[rustfmt::skip]
        let input = [
            0x53, 0x41, 0x52, 0x43, 0x14, 0x00, 0xFF, 0xFE,
            0x14, 0x00, 0x00, 0x00,
            0x14, 0x00, 0x00, 0x00,
            0x00, 0x01, 0x00, 0x00,
        ];

        let header = SarcHeader::parse(&input)?;
        assert_eq!(header.byte_order, ByteOrder::Little);
        assert_eq!(header.data_offset, 0x14);
        assert_eq!(header.size_mismatch, None);

        Ok(())
    }

    #[traced_test]
    #[test]
    fn size_mismatch_is_not_fatal() -> Result<()> {
        #[rustfmt::skip]
        let input = [
            0x53, 0x41, 0x52, 0x43, 0x14, 0x00, 0xFF, 0xFE,
            0x00, 0x10, 0x00, 0x00,
            0x14, 0x00, 0x00, 0x00,
            0x00, 0x01, 0x00, 0x00,
        ];

        let header = SarcHeader::parse(&input)?;
        assert_eq!(
            header.size_mismatch,
            Some(SizeMismatch {
                declared: 0x1000,
                actual: 0x14
            })
        );
        assert!(logs_contain("archive size does not match the buffer"));

        Ok(())
    }

    #[test]
    fn read_invalid_magic() {
        #[rustfmt::skip]
        let input = [
            0x59, 0x61, 0x7A, 0x30, 0x14, 0x00, 0xFF, 0xFE,
            0x14, 0x00, 0x00, 0x00,
            0x14, 0x00, 0x00, 0x00,
            0x00, 0x01, 0x00, 0x00,
        ];

        assert!(matches!(
            SarcHeader::parse(&input),
            Err(Error::BadMagic { expected: "SARC", .. })
        ));
    }

    #[test]
    fn read_truncated_header() {
        let input = [0x53, 0x41, 0x52, 0x43, 0x14, 0x00, 0xFF, 0xFE, 0x14];

        assert!(matches!(
            SarcHeader::parse(&input),
            Err(Error::TruncatedInput { .. })
        ));
        assert!(matches!(
            SarcHeader::parse(b"SA"),
            Err(Error::TruncatedInput { .. })
        ));
    }

    #[test]
    fn read_invalid_mark() {
        #[rustfmt::skip]
        let input = [
            0x53, 0x41, 0x52, 0x43, 0x14, 0x00, 0xFE, 0xFE,
            0x14, 0x00, 0x00, 0x00,
            0x14, 0x00, 0x00, 0x00,
            0x00, 0x01, 0x00, 0x00,
        ];

        assert!(matches!(
            SarcHeader::parse(&input),
            Err(Error::CorruptHeader(_))
        ));
    }

    #[test]
    fn read_wrong_header_size() {
        // header size written big endian in a little endian archive
        #[rustfmt::skip]
        let input = [
            0x53, 0x41, 0x52, 0x43, 0x00, 0x14, 0xFF, 0xFE,
            0x14, 0x00, 0x00, 0x00,
            0x14, 0x00, 0x00, 0x00,
            0x00, 0x01, 0x00, 0x00,
        ];

        assert!(matches!(
            SarcHeader::parse(&input),
            Err(Error::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn read_wrong_version() {
        #[rustfmt::skip]
        let input = [
            0x53, 0x41, 0x52, 0x43, 0x14, 0x00, 0xFF, 0xFE,
            0x14, 0x00, 0x00, 0x00,
            0x14, 0x00, 0x00, 0x00,
            0x00, 0x02, 0x00, 0x00,
        ];

        assert!(matches!(
            SarcHeader::parse(&input),
            Err(Error::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn read_data_offset_out_of_bounds() {
        #[rustfmt::skip]
        let too_small = [
            0x53, 0x41, 0x52, 0x43, 0x14, 0x00, 0xFF, 0xFE,
            0x14, 0x00, 0x00, 0x00,
            0x10, 0x00, 0x00, 0x00,
            0x00, 0x01, 0x00, 0x00,
        ];
        #[rustfmt::skip]
        let too_large = [
            0x53, 0x41, 0x52, 0x43, 0x14, 0x00, 0xFF, 0xFE,
            0x14, 0x00, 0x00, 0x00,
            0x20, 0x00, 0x00, 0x00,
            0x00, 0x01, 0x00, 0x00,
        ];

        assert!(matches!(
            SarcHeader::parse(&too_small),
            Err(Error::CorruptHeader(_))
        ));
        assert!(matches!(
            SarcHeader::parse(&too_large),
            Err(Error::CorruptHeader(_))
        ));
    }
}
