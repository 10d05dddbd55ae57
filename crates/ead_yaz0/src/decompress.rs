//! Yaz0 stream decompression.

use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::types::Yaz0Header;

/// Most output a single compressed byte can expand to, a three byte reference yields 0x111 bytes.
const MAX_EXPANSION: usize = 0x111 / 3;

/// Returns true if `data` starts with the Yaz0 magic.
pub fn is_compressed(data: &[u8]) -> bool {
    data.starts_with(Yaz0Header::MAGIC)
}

/// Decompress a complete Yaz0 stream into a newly allocated buffer.
///
/// ```
/// # fn doit() -> ead_yaz0::error::Result<()>
/// # {
/// #[rustfmt::skip]
/// let stream = [
///     b'Y', b'a', b'z', b'0', 0, 0, 0, 3, 0, 0, 0, 0, 0, 0, 0, 0,
///     0xE0, b'a', b'b', b'c',
/// ];
///
/// assert_eq!(ead_yaz0::decompress(&stream)?, b"abc");
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
#[instrument(skip_all, err, fields(size = data.len()))]
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let header = Yaz0Header::parse(data)?;
    debug!(
        uncompressed_size = header.uncompressed_size,
        alignment = header.alignment,
        "decompressing yaz0 stream"
    );

    let input = &data[Yaz0Header::SIZE..];
    let declared = header.uncompressed_size as usize;
    let limit = input.len().saturating_mul(MAX_EXPANSION);
    if declared > limit {
        return Err(Error::ImplausibleSize { declared, limit });
    }

    let mut output = vec![0u8; declared];
    decode(input, &mut output)?;
    Ok(output)
}

/// Decompress a complete Yaz0 stream into a caller provided buffer.
///
/// The buffer must be exactly as long as the uncompressed size declared in the header.
#[instrument(skip_all, err, fields(size = data.len(), output = output.len()))]
pub fn decompress_into(data: &[u8], output: &mut [u8]) -> Result<()> {
    let header = Yaz0Header::parse(data)?;
    if output.len() != header.uncompressed_size as usize {
        return Err(Error::OutputSize {
            declared: header.uncompressed_size as usize,
            actual: output.len(),
        });
    }

    decode(&data[Yaz0Header::SIZE..], output)
}

fn next_byte(input: &[u8], src: &mut usize, declared: usize, produced: usize) -> Result<u8> {
    let byte = *input
        .get(*src)
        .ok_or(Error::UnexpectedEnd { declared, produced })?;
    *src += 1;
    Ok(byte)
}

fn decode(input: &[u8], output: &mut [u8]) -> Result<()> {
    let declared = output.len();
    let mut src = 0;
    let mut dst = 0;
    let mut group = 0u8;
    let mut remaining = 0;

    while dst < declared {
        if remaining == 0 {
            group = next_byte(input, &mut src, declared, dst)?;
            remaining = 8;
        }

        if group & 0x80 != 0 {
            output[dst] = next_byte(input, &mut src, declared, dst)?;
            dst += 1;
        } else {
            let b1 = next_byte(input, &mut src, declared, dst)? as usize;
            let b2 = next_byte(input, &mut src, declared, dst)? as usize;

            let distance = ((b1 & 0x0F) << 8 | b2) + 1;
            let length = match b1 >> 4 {
                0 => next_byte(input, &mut src, declared, dst)? as usize + 0x12,
                n => n + 2,
            };

            if distance > dst {
                return Err(Error::InvalidBackReference {
                    position: dst,
                    distance,
                });
            }
            if length > declared - dst {
                return Err(Error::Overrun {
                    declared,
                    position: dst,
                    length,
                });
            }

            // Source and destination may overlap
            let start = dst - distance;
            for i in 0..length {
                output[dst + i] = output[start + i];
            }
            dst += length;
        }

        group <<= 1;
        remaining -= 1;
    }

    if src < input.len() {
        debug!(trailing = input.len() - src, "ignoring trailing bytes");
    }

    Ok(())
}
