//! Error types for codec operations.

use bytestream::StreamError;
use thiserror::Error;
use wire::MessageTag;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors raised while encoding or decoding protocol messages.
///
/// Decoding never panics; malformed or truncated input always ends up here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum CodecError {
    /// The frame around the body is invalid.
    #[error("wire error: {0}")]
    Wire(#[from] wire::DecodeError),

    /// A primitive inside the body could not be read or written.
    #[error("stream error: {0}")]
    Stream(#[from] StreamError),

    /// The frame could not be built.
    #[error("encode error: {0}")]
    Encode(#[from] wire::EncodeError),

    /// A count or string exceeded the configured codec limits.
    #[error("{kind} limit exceeded: {actual} > {limit}")]
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },

    /// A present color does not fit in 24 bits.
    #[error("invalid color value {value:#x}")]
    InvalidColor { value: u32 },

    /// A record lists the same cell twice.
    #[error("duplicate cell ({x}, {z}) in record")]
    DuplicateCell { x: i32, z: i32 },

    /// A snapshot lists the same record id twice.
    #[error("duplicate record id {id:?} in snapshot")]
    DuplicateRecord { id: String },

    /// The body holds more bytes than its message consumed.
    #[error("{remaining} trailing bytes after {tag:?} body")]
    TrailingBytes { tag: MessageTag, remaining: usize },

    /// A collection is too large to encode its count.
    #[error("length overflow: {length}")]
    LengthOverflow { length: usize },
}

/// Specific codec limits that can be exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    RecordsPerSnapshot,
    CellsPerRecord,
    /// Only raised on encode; the decoder reports
    /// [`StreamError::StringTooLong`] for the same condition.
    StringBytes,
}

impl std::fmt::Display for LimitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::RecordsPerSnapshot => "records per snapshot",
            Self::CellsPerRecord => "cells per record",
            Self::StringBytes => "string bytes",
        };
        write!(f, "{name}")
    }
}
