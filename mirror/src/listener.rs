//! Change notification for mirror consumers.

use std::collections::HashMap;

use codec::{CellPos, ClaimedAreaRecord, RecordId};

/// Description of one change to the mirror.
///
/// Every mutating registry operation returns these, in the order they were
/// applied, and replays them to registered listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorChange {
    RecordAdded(RecordId),
    RecordUpdated(RecordId),
    /// Carries the record as it was before removal.
    RecordRemoved(ClaimedAreaRecord),
    CellOwnerChanged {
        cell: CellPos,
        previous: Option<RecordId>,
        current: Option<RecordId>,
    },
    /// The whole mirror was replaced by a snapshot of `records` records.
    MirrorReplaced { records: usize },
    /// The mirror was emptied; it held `records` records.
    MirrorCleared { records: usize },
}

/// Observer of mirror changes. Every method defaults to a no-op.
///
/// Called synchronously on the thread that owns the registry, after the
/// change has been applied.
pub trait MirrorListener {
    fn on_record_added(&mut self, _record: &ClaimedAreaRecord) {}

    fn on_record_updated(&mut self, _record: &ClaimedAreaRecord) {}

    fn on_record_removed(&mut self, _record: &ClaimedAreaRecord) {}

    fn on_cell_owner_changed(
        &mut self,
        _cell: CellPos,
        _previous: Option<&RecordId>,
        _current: Option<&RecordId>,
    ) {
    }

    /// `records` is the new mirror content, sorted by id.
    fn on_mirror_replaced(&mut self, _records: &[&ClaimedAreaRecord]) {}

    fn on_mirror_cleared(&mut self) {}
}

/// Handle returned by [`ListenerSet::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Registered listeners, notified in registration order.
#[derive(Default)]
pub struct ListenerSet {
    next_id: u64,
    listeners: Vec<(ListenerId, Box<dyn MirrorListener>)>,
}

impl std::fmt::Debug for ListenerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSet")
            .field("len", &self.listeners.len())
            .finish()
    }
}

impl ListenerSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, listener: Box<dyn MirrorListener>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Removes a listener. Returns `false` if `id` was not registered.
    pub fn unregister(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Replays `changes` to every listener, resolving ids against `records`.
    pub(crate) fn dispatch(
        &mut self,
        changes: &[MirrorChange],
        records: &HashMap<RecordId, ClaimedAreaRecord>,
    ) {
        if self.listeners.is_empty() || changes.is_empty() {
            return;
        }
        for change in changes {
            match change {
                MirrorChange::RecordAdded(id) => {
                    if let Some(record) = records.get(id) {
                        self.each(|listener| listener.on_record_added(record));
                    }
                }
                MirrorChange::RecordUpdated(id) => {
                    if let Some(record) = records.get(id) {
                        self.each(|listener| listener.on_record_updated(record));
                    }
                }
                MirrorChange::RecordRemoved(record) => {
                    self.each(|listener| listener.on_record_removed(record));
                }
                MirrorChange::CellOwnerChanged {
                    cell,
                    previous,
                    current,
                } => {
                    self.each(|listener| {
                        listener.on_cell_owner_changed(*cell, previous.as_ref(), current.as_ref());
                    });
                }
                MirrorChange::MirrorReplaced { .. } => {
                    let mut sorted: Vec<&ClaimedAreaRecord> = records.values().collect();
                    sorted.sort_by(|a, b| a.id.cmp(&b.id));
                    self.each(|listener| listener.on_mirror_replaced(&sorted));
                }
                MirrorChange::MirrorCleared { .. } => {
                    self.each(|listener| listener.on_mirror_cleared());
                }
            }
        }
    }

    fn each(&mut self, mut f: impl FnMut(&mut dyn MirrorListener)) {
        for (_, listener) in &mut self.listeners {
            f(listener.as_mut());
        }
    }
}
