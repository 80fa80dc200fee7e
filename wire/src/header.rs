//! Frame header types and constants.

use crate::error::DecodeError;

/// Current wire format version.
///
/// Carried as the first byte of every frame so mismatched peers fail fast
/// instead of misreading bodies.
pub const VERSION: u8 = 1;

/// Smallest possible frame: version, tag and a one-byte body length.
pub const MIN_FRAME_SIZE: usize = 1 + 1 + 1;

/// Maximum frame header size: version, tag and a five-byte body length.
pub const MAX_HEADER_SIZE: usize = 1 + 1 + bytestream::MAX_VARU32_BYTES;

/// Which way a message is allowed to travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Authoritative source to observing sinks.
    SourceToSink,
    /// Observing sink to the authoritative source.
    SinkToSource,
}

/// Message tags for version 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageTag {
    Snapshot = 1,
    Upsert = 2,
    Delete = 3,
    CellClaim = 4,
    CellUnclaim = 5,
    RequestSnapshot = 6,
}

impl MessageTag {
    /// Parses a message tag from a raw byte.
    pub fn parse(tag: u8) -> Result<Self, DecodeError> {
        match tag {
            1 => Ok(Self::Snapshot),
            2 => Ok(Self::Upsert),
            3 => Ok(Self::Delete),
            4 => Ok(Self::CellClaim),
            5 => Ok(Self::CellUnclaim),
            6 => Ok(Self::RequestSnapshot),
            _ => Err(DecodeError::UnknownTag { tag }),
        }
    }

    /// Returns the raw tag byte.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self as u8
    }

    /// Returns the direction this message travels in.
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::RequestSnapshot => Direction::SinkToSource,
            Self::Snapshot
            | Self::Upsert
            | Self::Delete
            | Self::CellClaim
            | Self::CellUnclaim => Direction::SourceToSink,
        }
    }

    /// Returns `true` for incremental events (everything the source sends
    /// except the full snapshot).
    #[must_use]
    pub const fn is_incremental(self) -> bool {
        matches!(
            self,
            Self::Upsert | Self::Delete | Self::CellClaim | Self::CellUnclaim
        )
    }
}
