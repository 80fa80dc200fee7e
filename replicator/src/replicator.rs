//! Fan-out of authoritative changes to connected sinks.

use std::collections::BTreeSet;

use codec::{
    decode_message, encode_message, CellPos, ClaimedAreaRecord, CodecError, CodecLimits, Message,
    RecordId,
};
use wire::{Direction, SinkId, Transport, TransportError};

use crate::store::{AuthoritativeStore, StoreEvent};

/// Outcome of one broadcast.
///
/// Failures are per recipient; a failed sink never stops delivery to the
/// rest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failures: Vec<TransportError>,
}

impl BroadcastReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    fn merge(&mut self, other: Self) {
        self.delivered += other.delivered;
        self.failures.extend(other.failures);
    }
}

/// Counters kept by a [`SourceReplicator`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplicatorStats {
    pub messages_sent: u64,
    pub bytes_sent: u64,
    pub snapshots_sent: u64,
    pub send_failures: u64,
    /// Messages refused by the encoder, usually for exceeding limits.
    pub encode_failures: u64,
    pub uplink_dropped: u64,
}

/// Errors from sending a unicast snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplicatorError {
    #[error("failed to encode message: {0}")]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Why an uplink frame was not acted on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// The sender is not registered for broadcasts.
    UnregisteredSink,
    /// A source-to-sink message arrived on the uplink.
    WrongDirection(wire::MessageTag),
    /// The frame could not be decoded.
    Decode(CodecError),
}

/// What [`SourceReplicator::handle_sink_message`] did with a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UplinkOutcome {
    /// A snapshot of `bytes` was sent back to the requester.
    SnapshotSent { bytes: usize },
    /// The snapshot could not be delivered.
    SnapshotFailed(ReplicatorError),
    Dropped(DropReason),
}

/// Source side of the protocol.
///
/// Keeps the set of registered sinks and turns store changes into
/// broadcasts. Must be driven from the thread that mutates the store so
/// events go out in emission order.
#[derive(Debug)]
pub struct SourceReplicator<T: Transport> {
    transport: T,
    sinks: BTreeSet<SinkId>,
    limits: CodecLimits,
    wire_limits: wire::Limits,
    stats: ReplicatorStats,
}

impl<T: Transport> SourceReplicator<T> {
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self::with_limits(transport, CodecLimits::default(), wire::Limits::default())
    }

    /// Creates a replicator that encodes outgoing and decodes uplink frames
    /// with the given limits.
    ///
    /// Sinks should decode with the same limits; a message the encoder
    /// refuses is never sent.
    #[must_use]
    pub fn with_limits(transport: T, limits: CodecLimits, wire_limits: wire::Limits) -> Self {
        Self {
            transport,
            sinks: BTreeSet::new(),
            limits,
            wire_limits,
            stats: ReplicatorStats::default(),
        }
    }

    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Registered sinks in broadcast order.
    pub fn sinks(&self) -> impl Iterator<Item = SinkId> + '_ {
        self.sinks.iter().copied()
    }

    #[must_use]
    pub fn is_registered(&self, sink: SinkId) -> bool {
        self.sinks.contains(&sink)
    }

    #[must_use]
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    #[must_use]
    pub const fn stats(&self) -> ReplicatorStats {
        self.stats
    }

    /// Every authoritative record, read from the store now.
    pub fn snapshot(&self, store: &impl AuthoritativeStore) -> Vec<ClaimedAreaRecord> {
        store.list_records()
    }

    /// Registers `sink` and sends it, and only it, a full snapshot.
    ///
    /// Registration and snapshot capture happen in the same call, so the
    /// sink sees every later broadcast and none from before the snapshot.
    /// The sink stays registered when the send fails.
    pub fn on_sink_connected(
        &mut self,
        sink: SinkId,
        store: &impl AuthoritativeStore,
    ) -> Result<usize, ReplicatorError> {
        if !self.sinks.insert(sink) {
            tracing::debug!(%sink, "sink connected twice, resending snapshot");
        }
        tracing::info!(%sink, sinks = self.sinks.len(), "sink connected");
        self.send_snapshot(sink, store)
    }

    /// Stops broadcasting to `sink`. Returns `false` if it was not registered.
    pub fn on_sink_disconnected(&mut self, sink: SinkId) -> bool {
        let removed = self.sinks.remove(&sink);
        if removed {
            tracing::info!(%sink, sinks = self.sinks.len(), "sink disconnected");
        }
        removed
    }

    pub fn on_record_upserted(
        &mut self,
        record: &ClaimedAreaRecord,
    ) -> Result<BroadcastReport, CodecError> {
        self.broadcast(&Message::Upsert(record.clone()))
    }

    pub fn on_record_deleted(&mut self, id: &RecordId) -> Result<BroadcastReport, CodecError> {
        self.broadcast(&Message::Delete(id.clone()))
    }

    pub fn on_cell_claimed(
        &mut self,
        cell: CellPos,
        record: &RecordId,
    ) -> Result<BroadcastReport, CodecError> {
        self.broadcast(&Message::CellClaim {
            record: record.clone(),
            cell,
        })
    }

    pub fn on_cell_unclaimed(&mut self, cell: CellPos) -> Result<BroadcastReport, CodecError> {
        self.broadcast(&Message::CellUnclaim(cell))
    }

    /// Broadcasts the message for one store event.
    pub fn handle_store_event(
        &mut self,
        event: &StoreEvent,
    ) -> Result<BroadcastReport, CodecError> {
        match event {
            StoreEvent::Upserted(record) => self.on_record_upserted(record),
            StoreEvent::Deleted(id) => self.on_record_deleted(id),
            StoreEvent::CellClaimed { cell, record } => self.on_cell_claimed(*cell, record),
            StoreEvent::CellUnclaimed(cell) => self.on_cell_unclaimed(*cell),
        }
    }

    /// Broadcasts each event in order and merges the reports.
    pub fn handle_store_events<'a>(
        &mut self,
        events: impl IntoIterator<Item = &'a StoreEvent>,
    ) -> Result<BroadcastReport, CodecError> {
        let mut report = BroadcastReport::default();
        for event in events {
            report.merge(self.handle_store_event(event)?);
        }
        Ok(report)
    }

    /// Encodes `message` once and sends it to every registered sink.
    ///
    /// Nothing is sent if the message does not fit the limits.
    pub fn broadcast(&mut self, message: &Message) -> Result<BroadcastReport, CodecError> {
        let bytes = self.encode(message)?;
        let mut report = BroadcastReport::default();
        for sink in &self.sinks {
            match self.transport.send(*sink, &bytes) {
                Ok(()) => {
                    report.delivered += 1;
                    self.stats.messages_sent += 1;
                    self.stats.bytes_sent += bytes.len() as u64;
                }
                Err(err) => {
                    tracing::warn!(%sink, tag = ?message.tag(), error = %err, "broadcast failed");
                    self.stats.send_failures += 1;
                    report.failures.push(err);
                }
            }
        }
        tracing::debug!(
            tag = ?message.tag(),
            bytes = bytes.len(),
            delivered = report.delivered,
            failed = report.failures.len(),
            "broadcast"
        );
        Ok(report)
    }

    /// Handles one frame a sink sent to the source.
    ///
    /// Only `RequestSnapshot` from a registered sink is acted on; everything
    /// else is logged and dropped.
    pub fn handle_sink_message(
        &mut self,
        from: SinkId,
        bytes: &[u8],
        store: &impl AuthoritativeStore,
    ) -> UplinkOutcome {
        let message = match decode_message(bytes, &self.limits, &self.wire_limits) {
            Ok(message) => message,
            Err(err) => {
                tracing::warn!(sink = %from, error = %err, "dropping undecodable uplink frame");
                return self.drop_uplink(DropReason::Decode(err));
            }
        };
        if message.direction() != Direction::SinkToSource {
            tracing::warn!(sink = %from, tag = ?message.tag(), "dropping source message on uplink");
            return self.drop_uplink(DropReason::WrongDirection(message.tag()));
        }
        if !self.sinks.contains(&from) {
            tracing::warn!(sink = %from, "snapshot request from unregistered sink");
            return self.drop_uplink(DropReason::UnregisteredSink);
        }

        tracing::info!(sink = %from, "snapshot requested");
        match self.send_snapshot(from, store) {
            Ok(bytes) => UplinkOutcome::SnapshotSent { bytes },
            Err(err) => UplinkOutcome::SnapshotFailed(err),
        }
    }

    fn send_snapshot(
        &mut self,
        sink: SinkId,
        store: &impl AuthoritativeStore,
    ) -> Result<usize, ReplicatorError> {
        let records = self.snapshot(store);
        let count = records.len();
        let bytes = self.encode(&Message::Snapshot(records))?;
        if let Err(err) = self.transport.send(sink, &bytes) {
            tracing::warn!(%sink, error = %err, "snapshot send failed");
            self.stats.send_failures += 1;
            return Err(err.into());
        }
        self.stats.messages_sent += 1;
        self.stats.snapshots_sent += 1;
        self.stats.bytes_sent += bytes.len() as u64;
        tracing::debug!(%sink, records = count, bytes = bytes.len(), "sent snapshot");
        Ok(bytes.len())
    }

    fn encode(&mut self, message: &Message) -> Result<Vec<u8>, CodecError> {
        encode_message(message, &self.limits, &self.wire_limits).map_err(|err| {
            tracing::warn!(tag = ?message.tag(), error = %err, "message not sent");
            self.stats.encode_failures += 1;
            err
        })
    }

    fn drop_uplink(&mut self, reason: DropReason) -> UplinkOutcome {
        self.stats.uplink_dropped += 1;
        UplinkOutcome::Dropped(reason)
    }
}
