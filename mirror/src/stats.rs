/// Counters kept by a [`SinkSession`](crate::SinkSession).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SyncStats {
    pub connections: u64,
    pub snapshots_applied: u64,
    pub events_applied: u64,
    pub decode_errors: u64,
    pub unknown_references: u64,
    /// Messages ignored because of the session state.
    pub dropped_messages: u64,
    pub requests_sent: u64,
    pub request_failures: u64,
}
