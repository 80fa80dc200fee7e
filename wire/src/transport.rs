//! Transport boundary between the source and its sinks.
//!
//! The protocol only needs an ordered, reliable, per-sink byte channel. The
//! [`Transport`] and [`Uplink`] traits describe that boundary; the
//! [`ChannelTransport`] implementation provides it in-process on top of
//! `crossbeam-channel`.

use std::collections::HashMap;
use std::fmt;

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::error::TransportError;

/// Identifier of a connected sink, assigned by the integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SinkId(pub u32);

impl fmt::Display for SinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Source-side delivery of encoded frames to one sink at a time.
///
/// Implementations must preserve per-sink ordering. A failed send affects
/// only the named sink.
pub trait Transport {
    fn send(&mut self, sink: SinkId, bytes: &[u8]) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, sink: SinkId, bytes: &[u8]) -> Result<(), TransportError> {
        (**self).send(sink, bytes)
    }
}

/// Sink-side delivery of encoded frames to the source.
pub trait Uplink {
    fn send_to_source(&mut self, bytes: &[u8]) -> Result<(), TransportError>;
}

impl<U: Uplink + ?Sized> Uplink for &mut U {
    fn send_to_source(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        (**self).send_to_source(bytes)
    }
}

/// In-process transport: one unbounded channel per sink plus a shared uplink.
#[derive(Debug)]
pub struct ChannelTransport {
    sinks: HashMap<SinkId, Sender<Vec<u8>>>,
    uplink_tx: Sender<(SinkId, Vec<u8>)>,
    uplink_rx: Receiver<(SinkId, Vec<u8>)>,
}

/// Sink half of a [`ChannelTransport`] connection.
#[derive(Debug)]
pub struct SinkEndpoint {
    pub id: SinkId,
    /// Frames sent by the source, in order.
    pub inbound: Receiver<Vec<u8>>,
    /// Path back to the source.
    pub uplink: ChannelUplink,
}

/// [`Uplink`] that tags every frame with its sink id.
#[derive(Debug, Clone)]
pub struct ChannelUplink {
    sink: SinkId,
    tx: Sender<(SinkId, Vec<u8>)>,
}

impl Default for ChannelTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelTransport {
    #[must_use]
    pub fn new() -> Self {
        let (uplink_tx, uplink_rx) = unbounded();
        Self {
            sinks: HashMap::new(),
            uplink_tx,
            uplink_rx,
        }
    }

    /// Opens a fresh channel for `sink`, replacing any previous one.
    pub fn connect(&mut self, sink: SinkId) -> SinkEndpoint {
        let (tx, rx) = unbounded();
        if self.sinks.insert(sink, tx).is_some() {
            tracing::debug!(%sink, "replaced existing channel");
        }
        SinkEndpoint {
            id: sink,
            inbound: rx,
            uplink: ChannelUplink {
                sink,
                tx: self.uplink_tx.clone(),
            },
        }
    }

    /// Drops the channel for `sink`. Returns `false` if it was not connected.
    pub fn disconnect(&mut self, sink: SinkId) -> bool {
        self.sinks.remove(&sink).is_some()
    }

    #[must_use]
    pub fn is_connected(&self, sink: SinkId) -> bool {
        self.sinks.contains_key(&sink)
    }

    /// Takes every frame sinks have sent so far, in arrival order.
    pub fn drain_uplink(&self) -> Vec<(SinkId, Vec<u8>)> {
        self.uplink_rx.try_iter().collect()
    }
}

impl Transport for ChannelTransport {
    fn send(&mut self, sink: SinkId, bytes: &[u8]) -> Result<(), TransportError> {
        let tx = self
            .sinks
            .get(&sink)
            .ok_or(TransportError::UnknownSink { sink })?;
        tx.send(bytes.to_vec())
            .map_err(|_| TransportError::Disconnected { sink })
    }
}

impl ChannelUplink {
    #[must_use]
    pub const fn sink(&self) -> SinkId {
        self.sink
    }
}

impl Uplink for ChannelUplink {
    fn send_to_source(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.tx
            .send((self.sink, bytes.to_vec()))
            .map_err(|_| TransportError::Disconnected { sink: self.sink })
    }
}
