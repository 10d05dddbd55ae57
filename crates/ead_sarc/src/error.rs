//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// Transparent wrapper for [`ead_yaz0::error::Error`]
    #[cfg(feature = "yaz0")]
    #[error(transparent)]
    Codec(#[from] ead_yaz0::error::Error),

    /// a magic number did not match
    #[error("bad magic: found {found:02x?}, expected {expected}")]
    BadMagic {
        /// The bytes found in place of the magic
        found: Vec<u8>,
        /// The expected magic
        expected: &'static str,
    },

    /// archive uses a layout this library does not understand
    #[error("unsupported archive: {0}")]
    UnsupportedVersion(String),

    /// header fields are inconsistent
    #[error("corrupt archive header: {0}")]
    CorruptHeader(String),

    /// file table is inconsistent
    #[error("corrupt file table: {0}")]
    CorruptTable(String),

    /// a read ran past the end of the buffer
    #[error("input truncated: reading {needed:#x} bytes at offset {offset:#x} exceeds buffer of {available:#x} bytes")]
    TruncatedInput {
        /// Offset of the read
        offset: usize,
        /// Number of bytes requested
        needed: usize,
        /// Length of the buffer
        available: usize,
    },

    /// declared archive size differs from the buffer, only fatal when requested
    #[error(transparent)]
    SizeMismatch(#[from] SizeMismatch),

    /// unable to find requested file
    #[error("unable to find requested file {0}")]
    NotFound(#[from] FileNotFoundError),

    /// index is not below the file count
    #[error("no file at index {index}, archive holds {count} files")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of files in the archive
        count: usize,
    },

    /// file at index {0} only carries a hash
    #[error("file at index {0} has no name")]
    NameAbsent(usize),

    /// alignment is not a power of two
    #[error("invalid alignment {0}, expected a non zero power of two")]
    InvalidAlignment(usize),

    /// file name cannot be stored in the name table
    #[error("invalid file name {0:?}")]
    InvalidName(String),

    /// more files than the table can index
    #[error("too many files: {0}, at most 0x3fff are supported")]
    TooManyFiles(usize),

    /// archive would not fit in 32 bit offsets
    #[error("archive of {0:#x} bytes does not fit in 32 bit offsets")]
    ArchiveTooLarge(usize),
}

/// Disagreement between the size stated in the header and the size of the buffer
#[derive(Error, Diagnostic, Debug, Clone, Copy, PartialEq, Eq)]
#[error("archive declares {declared:#x} bytes but the buffer holds {actual:#x}")]
pub struct SizeMismatch {
    /// Size stated in the header
    pub declared: u32,
    /// Length of the buffer
    pub actual: usize,
}

/// Error type to provide further information when a file has not been found
#[derive(Error, Diagnostic, Debug)]
pub enum FileNotFoundError {
    /// by name {0}
    #[error("by name {0}")]
    Name(String),

    /// by hash {0:#010x}
    #[error("by hash {0:#010x}")]
    Hash(u32),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
