//! Hand-off from network threads to the thread that owns the mirror.

use crossbeam_channel::{unbounded, Receiver, Sender, TryIter};

/// Something the network side observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Connected,
    Payload(Vec<u8>),
    Disconnected,
}

/// Cloneable, thread-safe producer half of an [`Inbox`].
#[derive(Debug, Clone)]
pub struct InboxSender {
    tx: Sender<InboundEvent>,
}

/// Consumer half, drained on the owning thread.
#[derive(Debug)]
pub struct Inbox {
    rx: Receiver<InboundEvent>,
}

/// Error returned when the [`Inbox`] has been dropped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("inbox closed")]
pub struct InboxClosed;

/// Creates a connected sender/inbox pair.
#[must_use]
pub fn inbox() -> (InboxSender, Inbox) {
    let (tx, rx) = unbounded();
    (InboxSender { tx }, Inbox { rx })
}

impl InboxSender {
    pub fn send(&self, event: InboundEvent) -> Result<(), InboxClosed> {
        self.tx.send(event).map_err(|_| InboxClosed)
    }

    pub fn connected(&self) -> Result<(), InboxClosed> {
        self.send(InboundEvent::Connected)
    }

    pub fn payload(&self, bytes: Vec<u8>) -> Result<(), InboxClosed> {
        self.send(InboundEvent::Payload(bytes))
    }

    pub fn disconnected(&self) -> Result<(), InboxClosed> {
        self.send(InboundEvent::Disconnected)
    }
}

impl Inbox {
    /// Pending events in arrival order, without blocking.
    pub fn try_iter(&self) -> TryIter<'_, InboundEvent> {
        self.rx.try_iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
