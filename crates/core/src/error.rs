//! Error types for huffstream.
//!
//! All operations return structured errors rather than panicking. The
//! codec only classifies failures; presenting them is up to the caller.

use thiserror::Error;

/// Top-level error type for all operations in the crate.
///
/// Each variant corresponds to a specific failure domain:
/// - Bit I/O: misuse of the bit channel (e.g. oversized bit counts)
/// - Format: the compressed blob is not something we can decode
/// - Code: the code table cannot represent a tree path
/// - I/O: the underlying byte stream failed
#[derive(Debug, Error)]
pub enum Error {
    /// Bit I/O operation failed
    #[error("bit I/O error: {0}")]
    BitIo(#[from] BitIoError),

    /// Compressed stream is malformed
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// Code table construction failed
    #[error("code table error: {0}")]
    Code(#[from] CodeError),

    /// Underlying stream I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Bit-level I/O errors.
#[derive(Debug, Error)]
pub enum BitIoError {
    /// Invalid bit count (more than 64 bits in one call)
    #[error("invalid bit count: {0}")]
    InvalidBitCount(usize),
}

/// Errors raised while decoding a compressed blob.
///
/// All of them are fatal to the operation in progress.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Leading 32 bits are not the huffstream magic number.
    ///
    /// `actual` is `None` when the stream holds fewer than 32 bits.
    #[error("bad magic number: expected {expected:#010x}, got {}", describe_magic(.actual))]
    BadMagic { expected: u32, actual: Option<u32> },

    /// The tree header could not be reconstructed
    #[error("corrupt header at bit {position}: {fault}")]
    CorruptHeader { position: u64, fault: HeaderFault },

    /// Payload ran out of bits before the end-of-stream marker
    #[error("truncated stream at bit {position}: no end-of-stream marker after {decoded} bytes")]
    TruncatedStream { position: u64, decoded: u64 },
}

/// Reason a tree header was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HeaderFault {
    /// Input ended in the middle of the header
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// Leaf symbol outside 0..=256
    #[error("symbol {0} out of range")]
    SymbolOutOfRange(u16),

    /// Same symbol on two leaves
    #[error("symbol {0} appears on more than one leaf")]
    DuplicateSymbol(u16),

    /// Nesting deeper than any tree over 257 leaves can be
    #[error("tree deeper than {0} levels")]
    TooDeep(usize),

    /// No leaf carries the end-of-stream marker
    #[error("tree has no end-of-stream leaf")]
    MissingEndMarker,
}

/// Code table errors.
#[derive(Debug, Error)]
pub enum CodeError {
    /// Path from root to leaf does not fit in a code word
    #[error("code for symbol {symbol} is {length} bits, maximum is {max}")]
    CodeTooLong {
        symbol: u16,
        length: usize,
        max: usize,
    },

    /// A symbol seen on the encoding pass has no leaf in the tree
    #[error("no code for symbol {symbol}; input changed between passes")]
    MissingCode { symbol: u16 },
}

impl Error {
    /// True if the error describes a malformed compressed stream (as opposed
    /// to an I/O failure or API misuse).
    pub fn is_format(&self) -> bool {
        matches!(self, Error::Format(_))
    }
}

fn describe_magic(actual: &Option<u32>) -> String {
    match actual {
        Some(value) => format!("{value:#010x}"),
        None => "end of stream".to_string(),
    }
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
