//! Error types for applying messages to a mirror.

use codec::{CodecError, RecordId};
use thiserror::Error;
use wire::{MessageTag, TransportError};

/// A message that could not be applied to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    /// The message references a record the mirror does not hold.
    #[error("unknown record {id}")]
    UnknownRecord { id: RecordId },

    /// The message is not something a mirror applies.
    #[error("{tag:?} cannot be applied to a mirror")]
    NotApplicable { tag: MessageTag },
}

/// Result type for session operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Why a session dropped an inbound message or failed to send a request.
///
/// None of these end the session; the caller may log or ignore them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("failed to decode message: {0}")]
    Decode(#[from] CodecError),

    #[error(transparent)]
    Apply(#[from] ApplyError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A message arrived while no connection is open.
    #[error("{tag:?} received while disconnected")]
    NotConnected { tag: MessageTag },

    /// An incremental event arrived before the first snapshot.
    #[error("{tag:?} received before initial snapshot")]
    AwaitingSnapshot { tag: MessageTag },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_record_names_id() {
        let err = ApplyError::UnknownRecord {
            id: RecordId::from("ghost"),
        };
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn sync_error_wraps_apply() {
        let err: SyncError = ApplyError::NotApplicable {
            tag: MessageTag::RequestSnapshot,
        }
        .into();
        assert!(err.to_string().contains("RequestSnapshot"));
    }
}
