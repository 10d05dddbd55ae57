//! File name hashing used to sort and search the file table.

/// Hash multiplier written by every known SARC producer
pub const DEFAULT_HASH_MULTIPLIER: u32 = 0x65;

/// Hash a file name the way the file table is keyed.
///
/// Bytes are sign extended before being accumulated, which matters for names containing
/// non-ASCII characters.
pub fn hash_name(multiplier: u32, name: &str) -> u32 {
    name.bytes().fold(0u32, |hash, byte| {
        hash.wrapping_mul(multiplier)
            .wrapping_add(byte as i8 as u32)
    })
}
