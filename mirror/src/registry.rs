//! The sink-side mirror and its grid-cell ownership index.

use std::collections::HashMap;

use codec::{CellPos, ClaimedAreaRecord, Message, RecordId};

use crate::error::ApplyError;
use crate::listener::{ListenerId, ListenerSet, MirrorChange, MirrorListener};

/// Read-only mirror of the source's records.
///
/// Holds every record by id plus a cell → owner index. Each cell has at most
/// one owner: claiming a cell for one record silently takes it from any
/// other. Not synchronized; mutate it from a single owning thread.
#[derive(Debug, Default)]
pub struct SinkRegistry {
    records: HashMap<RecordId, ClaimedAreaRecord>,
    owners: HashMap<CellPos, RecordId>,
    listeners: ListenerSet,
}

impl SinkRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn record(&self, id: &RecordId) -> Option<&ClaimedAreaRecord> {
        self.records.get(id)
    }

    /// All records, sorted by id.
    #[must_use]
    pub fn records(&self) -> Vec<&ClaimedAreaRecord> {
        let mut records: Vec<_> = self.records.values().collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        records
    }

    #[must_use]
    pub fn owner_of(&self, cell: CellPos) -> Option<&RecordId> {
        self.owners.get(&cell)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of owned cells in the grid index.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.owners.len()
    }

    pub fn add_listener(&mut self, listener: Box<dyn MirrorListener>) -> ListenerId {
        self.listeners.register(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.unregister(id)
    }

    #[must_use]
    pub const fn listeners(&self) -> &ListenerSet {
        &self.listeners
    }

    /// Applies one decoded source message.
    pub fn apply(&mut self, message: Message) -> Result<Vec<MirrorChange>, ApplyError> {
        match message {
            Message::Snapshot(records) => Ok(self.apply_snapshot(records)),
            Message::Upsert(record) => Ok(self.apply_upsert(record)),
            Message::Delete(id) => self.apply_delete(&id),
            Message::CellClaim { record, cell } => self.apply_cell_claim(cell, &record),
            Message::CellUnclaim(cell) => Ok(self.apply_cell_unclaim(cell)),
            Message::RequestSnapshot => Err(ApplyError::NotApplicable {
                tag: wire::MessageTag::RequestSnapshot,
            }),
        }
    }

    /// Replaces the whole mirror with `records` and rebuilds the grid index.
    ///
    /// If two records list the same cell, the later one keeps it.
    pub fn apply_snapshot(&mut self, records: Vec<ClaimedAreaRecord>) -> Vec<MirrorChange> {
        self.records.clear();
        self.owners.clear();

        for record in records {
            if let Some(earlier) = self.records.remove(&record.id) {
                // Same id twice: the later copy wins.
                for cell in earlier.claimed_cells.difference(&record.claimed_cells) {
                    if self.owners.get(cell) == Some(&record.id) {
                        self.owners.remove(cell);
                    }
                }
            }
            for cell in &record.claimed_cells {
                if let Some(previous) = self.owners.insert(*cell, record.id.clone()) {
                    if previous != record.id {
                        tracing::debug!(%cell, owner = %previous, "snapshot lists cell twice");
                        if let Some(loser) = self.records.get_mut(&previous) {
                            loser.claimed_cells.remove(cell);
                        }
                    }
                }
            }
            self.records.insert(record.id.clone(), record);
        }

        let changes = vec![MirrorChange::MirrorReplaced {
            records: self.records.len(),
        }];
        self.notify(&changes);
        changes
    }

    /// Inserts or overwrites a record by id and reconciles its cells.
    pub fn apply_upsert(&mut self, record: ClaimedAreaRecord) -> Vec<MirrorChange> {
        let id = record.id.clone();
        let mut changes = Vec::new();

        let previous_cells = self
            .records
            .get(&id)
            .map(|existing| existing.claimed_cells.clone())
            .unwrap_or_default();
        changes.push(if self.records.contains_key(&id) {
            MirrorChange::RecordUpdated(id.clone())
        } else {
            MirrorChange::RecordAdded(id.clone())
        });

        for cell in previous_cells.difference(&record.claimed_cells) {
            if self.owners.get(cell) == Some(&id) {
                self.owners.remove(cell);
                changes.push(MirrorChange::CellOwnerChanged {
                    cell: *cell,
                    previous: Some(id.clone()),
                    current: None,
                });
            }
        }
        for cell in &record.claimed_cells {
            if let Some(change) = self.take_cell(*cell, &id) {
                changes.push(change);
            }
        }

        self.records.insert(id, record);
        self.notify(&changes);
        changes
    }

    /// Removes a record and every cell it owned.
    pub fn apply_delete(&mut self, id: &RecordId) -> Result<Vec<MirrorChange>, ApplyError> {
        let record = self
            .records
            .remove(id)
            .ok_or_else(|| ApplyError::UnknownRecord { id: id.clone() })?;

        let mut changes = Vec::with_capacity(record.claimed_cells.len() + 1);
        for cell in &record.claimed_cells {
            if self.owners.get(cell) == Some(id) {
                self.owners.remove(cell);
                changes.push(MirrorChange::CellOwnerChanged {
                    cell: *cell,
                    previous: Some(id.clone()),
                    current: None,
                });
            }
        }
        changes.push(MirrorChange::RecordRemoved(record));
        self.notify(&changes);
        Ok(changes)
    }

    /// Gives `cell` to `id`, revoking any previous owner.
    pub fn apply_cell_claim(
        &mut self,
        cell: CellPos,
        id: &RecordId,
    ) -> Result<Vec<MirrorChange>, ApplyError> {
        if !self.records.contains_key(id) {
            return Err(ApplyError::UnknownRecord { id: id.clone() });
        }
        let changes: Vec<_> = self.take_cell(cell, id).into_iter().collect();
        if let Some(record) = self.records.get_mut(id) {
            record.claimed_cells.insert(cell);
        }
        self.notify(&changes);
        Ok(changes)
    }

    /// Makes `cell` unowned. Unclaiming an unowned cell changes nothing.
    pub fn apply_cell_unclaim(&mut self, cell: CellPos) -> Vec<MirrorChange> {
        let Some(owner) = self.owners.remove(&cell) else {
            return Vec::new();
        };
        if let Some(record) = self.records.get_mut(&owner) {
            record.claimed_cells.remove(&cell);
        }
        let changes = vec![MirrorChange::CellOwnerChanged {
            cell,
            previous: Some(owner),
            current: None,
        }];
        self.notify(&changes);
        changes
    }

    /// Empties the mirror and the grid index.
    pub fn clear(&mut self) -> Vec<MirrorChange> {
        let records = self.records.len();
        self.records.clear();
        self.owners.clear();
        let changes = vec![MirrorChange::MirrorCleared { records }];
        self.notify(&changes);
        changes
    }

    /// Returns `true` if the grid index and the records' cell sets agree and
    /// no cell has two owners.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let claimed: usize = self.records.values().map(|r| r.claimed_cells.len()).sum();
        claimed == self.owners.len()
            && self.owners.iter().all(|(cell, owner)| {
                self.records
                    .get(owner)
                    .is_some_and(|record| record.claims(*cell))
            })
    }

    /// Points `cell` at `id` in the index and removes it from any other
    /// record's set. Returns the ownership change, if any.
    fn take_cell(&mut self, cell: CellPos, id: &RecordId) -> Option<MirrorChange> {
        let previous = self.owners.insert(cell, id.clone());
        if previous.as_ref() == Some(id) {
            return None;
        }
        if let Some(loser) = previous.as_ref().and_then(|p| self.records.get_mut(p)) {
            loser.claimed_cells.remove(&cell);
        }
        Some(MirrorChange::CellOwnerChanged {
            cell,
            previous,
            current: Some(id.clone()),
        })
    }

    fn notify(&mut self, changes: &[MirrorChange]) {
        self.listeners.dispatch(changes, &self.records);
    }
}
