//! Configurable limits for bounded framing.

/// Wire-level limits on frame and body size.
///
/// Decoding enforces them to bound memory use; encoding enforces the same
/// values so a peer with equal limits accepts every frame. Body parsing
/// limits (record and cell counts) belong to the codec layer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Limits {
    /// Maximum frame size in bytes, header included.
    pub max_frame_bytes: usize,

    /// Maximum length of a frame body in bytes.
    pub max_body_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            // Full snapshots of a busy world dominate frame sizes.
            max_frame_bytes: 1024 * 1024,
            max_body_bytes: 1024 * 1024 - crate::MAX_HEADER_SIZE,
        }
    }
}

impl Limits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_frame_bytes: 4096,
            max_body_bytes: 4000,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_frame_bytes: usize::MAX,
            max_body_bytes: usize::MAX,
        }
    }
}
