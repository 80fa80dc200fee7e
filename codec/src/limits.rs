//! Limits for codec-level encoding and decoding.

/// Codec-specific limits enforced on both sides of a message body.
///
/// Frame and body size limits live in [`wire::Limits`]; these bound the
/// counts and strings inside a body. Every count is checked before anything
/// is allocated for it.
///
/// The defaults admit any single record at every limit inside the default
/// wire body. Snapshot size is bound by the wire limits, not by
/// `max_records_per_snapshot` times the per-record maximum.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodecLimits {
    /// Maximum number of records in one snapshot.
    pub max_records_per_snapshot: usize,
    /// Maximum number of claimed cells in one record.
    pub max_cells_per_record: usize,
    /// Maximum length in bytes of any string field.
    pub max_string_bytes: usize,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_records_per_snapshot: 4096,
            max_cells_per_record: 65_536,
            max_string_bytes: 1024,
        }
    }
}

impl CodecLimits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_records_per_snapshot: 32,
            max_cells_per_record: 256,
            max_string_bytes: 64,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_records_per_snapshot: usize::MAX,
            max_cells_per_record: usize::MAX,
            max_string_bytes: usize::MAX,
        }
    }
}
