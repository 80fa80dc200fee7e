//! Error types for wire format operations.

use thiserror::Error;

use crate::transport::SinkId;

/// Result type for wire format operations.
pub type WireResult<T> = Result<T, DecodeError>;

/// High-level decode errors for wire framing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// Frame is too small to contain the required header.
    #[error("frame too small: {actual} bytes, need at least {required}")]
    FrameTooSmall { actual: usize, required: usize },

    /// Unsupported wire version.
    #[error("unsupported wire version: {found}")]
    UnsupportedVersion { found: u8 },

    /// Unknown message tag encountered.
    #[error("unknown message tag: {tag}")]
    UnknownTag { tag: u8 },

    /// The body length prefix is not a valid varint.
    #[error("invalid body length prefix")]
    InvalidLength,

    /// Body length declared in the header does not match the bytes present.
    #[error("body length mismatch: header {header_len} bytes but {actual_len} available")]
    BodyLengthMismatch { header_len: u32, actual_len: usize },

    /// Limits exceeded.
    #[error("{kind} limit exceeded: {actual} > {limit}")]
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },
}

/// Specific wire limits that can be exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    FrameBytes,
    BodyBytes,
}

impl std::fmt::Display for LimitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::FrameBytes => "frame bytes",
            Self::BodyBytes => "body bytes",
        };
        write!(f, "{name}")
    }
}

/// Errors that can occur during encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("length overflow: {length}")]
    LengthOverflow { length: usize },

    /// The frame would be rejected by a decoder with the same limits.
    #[error("{kind} limit exceeded: {actual} > {limit}")]
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },
}

/// Delivery failure for a single recipient.
///
/// Failures are scoped to one sink (or the uplink of one sink); they never
/// describe the state of other recipients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The sink was never connected or has already been removed.
    #[error("unknown sink {sink}")]
    UnknownSink { sink: SinkId },

    /// The peer hung up.
    #[error("sink {sink} disconnected")]
    Disconnected { sink: SinkId },

    /// The transport refused the payload.
    #[error("sink {sink} rejected payload: {reason}")]
    Rejected { sink: SinkId, reason: String },
}

impl TransportError {
    /// Returns the sink this failure belongs to.
    #[must_use]
    pub const fn sink(&self) -> SinkId {
        match self {
            Self::UnknownSink { sink }
            | Self::Disconnected { sink }
            | Self::Rejected { sink, .. } => *sink,
        }
    }
}
