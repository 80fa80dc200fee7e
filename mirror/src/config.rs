//! Session configuration.

use std::time::Duration;

use codec::CodecLimits;

/// Knobs for a [`SinkSession`](crate::SinkSession).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionConfig {
    /// Grace period between connecting and requesting a snapshot. Zero
    /// sends the request immediately.
    pub snapshot_request_delay_ms: u64,
    /// Whether to request a snapshot on connect at all. The source pushes
    /// one on connect, so the request is a safety net.
    pub request_on_connect: bool,
    pub codec: CodecLimits,
    pub wire: wire::Limits,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            snapshot_request_delay_ms: 1000,
            request_on_connect: true,
            codec: CodecLimits::default(),
            wire: wire::Limits::default(),
        }
    }
}

impl SessionConfig {
    /// Creates a configuration suitable for testing with smaller limits.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            snapshot_request_delay_ms: 1000,
            request_on_connect: true,
            codec: CodecLimits::for_testing(),
            wire: wire::Limits::for_testing(),
        }
    }

    #[must_use]
    pub const fn snapshot_request_delay(&self) -> Duration {
        Duration::from_millis(self.snapshot_request_delay_ms)
    }
}
