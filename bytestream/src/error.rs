//! Error types for byte stream operations.

use thiserror::Error;

/// Result type for byte stream operations.
pub type StreamResult<T> = Result<T, StreamError>;

/// Errors that can occur during byte-level encoding/decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// Attempted to read past the end of the buffer.
    #[error("attempted to read {requested} bytes but only {available} bytes available")]
    UnexpectedEof {
        /// Number of bytes requested.
        requested: usize,
        /// Number of bytes available.
        available: usize,
    },

    /// A varint ran past five bytes or overflowed `u32`.
    #[error("invalid varint")]
    InvalidVarint,

    /// A boolean byte was neither 0 nor 1.
    #[error("invalid bool byte {value}")]
    InvalidBool { value: u8 },

    /// A length-prefixed string exceeded the caller's bound.
    #[error("string length {len} exceeds maximum {max}")]
    StringTooLong { len: usize, max: usize },

    /// String bytes were not valid UTF-8.
    #[error("string is not valid utf-8")]
    InvalidUtf8,

    /// A length does not fit in the varint length prefix.
    #[error("length overflow: {length}")]
    LengthOverflow { length: usize },
}
