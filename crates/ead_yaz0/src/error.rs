//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// stream does not start with the Yaz0 magic
    #[error("stream is not yaz0 compressed (found magic {found:02x?})")]
    BadMagic {
        /// The first bytes of the stream
        found: Vec<u8>,
    },

    /// stream is shorter than the yaz0 header
    #[error("yaz0 header is truncated: found {0:#x} bytes, expected at least 0x10")]
    TruncatedHeader(usize),

    /// compressed data ended before the declared size was produced
    #[error("compressed data ended after {produced:#x} of {declared:#x} bytes")]
    UnexpectedEnd {
        /// Uncompressed size stated in the header
        declared: usize,
        /// Bytes written before the input ran out
        produced: usize,
    },

    /// declared size is more than the compressed data could expand to
    #[error("declared size {declared:#x} exceeds the {limit:#x} bytes the compressed data can produce")]
    ImplausibleSize {
        /// Uncompressed size stated in the header
        declared: usize,
        /// Largest output the compressed data could decode to
        limit: usize,
    },

    /// a back-reference points before the start of the output
    #[error("back-reference at output offset {position:#x} reaches {distance:#x} bytes back")]
    InvalidBackReference {
        /// Output offset at which the reference was decoded
        position: usize,
        /// Distance the reference points back
        distance: usize,
    },

    /// a back-reference would write past the declared size
    #[error("back-reference at output offset {position:#x} of length {length:#x} overruns declared size {declared:#x}")]
    Overrun {
        /// Uncompressed size stated in the header
        declared: usize,
        /// Output offset at which the reference was decoded
        position: usize,
        /// Length of the reference
        length: usize,
    },

    /// destination buffer does not match the declared size
    #[error("output buffer holds {actual:#x} bytes but the stream declares {declared:#x}")]
    OutputSize {
        /// Uncompressed size stated in the header
        declared: usize,
        /// Length of the buffer provided by the caller
        actual: usize,
    },
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
