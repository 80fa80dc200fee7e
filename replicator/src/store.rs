//! The authoritative record set and its native representation.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use codec::{CellPos, ClaimedAreaRecord, RecordId};
use thiserror::Error;

use crate::derive::{record_for, Formatting};

/// "List all records now" view of the authoritative state.
///
/// Implementations compute the list at call time; the replicator never
/// caches it.
pub trait AuthoritativeStore {
    fn list_records(&self) -> Vec<ClaimedAreaRecord>;
}

impl<S: AuthoritativeStore + ?Sized> AuthoritativeStore for &S {
    fn list_records(&self) -> Vec<ClaimedAreaRecord> {
        (**self).list_records()
    }
}

/// Native representation of a faction inside the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Faction {
    pub id: RecordId,
    pub name: String,
    pub formatting: Option<Formatting>,
    pub claims: BTreeSet<CellPos>,
}

/// A change the replicator must broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Upserted(ClaimedAreaRecord),
    Deleted(RecordId),
    CellClaimed { cell: CellPos, record: RecordId },
    CellUnclaimed(CellPos),
}

/// Result type for store mutations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Rejected store mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("faction name {name:?} is already taken")]
    NameTaken { name: String },

    #[error("unknown faction {id}")]
    UnknownFaction { id: RecordId },
}

/// In-memory authoritative store.
///
/// Every mutation returns the events that describe it, in emission order.
#[derive(Debug, Clone, Default)]
pub struct FactionStore {
    factions: BTreeMap<RecordId, Faction>,
    owners: HashMap<CellPos, RecordId>,
    next_id: u64,
}

impl FactionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.factions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factions.is_empty()
    }

    #[must_use]
    pub fn faction(&self, id: &RecordId) -> Option<&Faction> {
        self.factions.get(id)
    }

    /// Returns faction ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = &RecordId> {
        self.factions.keys()
    }

    #[must_use]
    pub fn owner_of(&self, cell: CellPos) -> Option<&RecordId> {
        self.owners.get(&cell)
    }

    /// Number of claimed cells across all factions.
    #[must_use]
    pub fn claimed_cell_count(&self) -> usize {
        self.owners.len()
    }

    /// Creates a faction with a fresh id.
    pub fn create(
        &mut self,
        name: &str,
        formatting: Option<Formatting>,
    ) -> StoreResult<(RecordId, Vec<StoreEvent>)> {
        self.ensure_name_free(name, None)?;
        let id = RecordId::new(format!("f-{:06}", self.next_id));
        self.next_id += 1;
        let faction = Faction {
            id: id.clone(),
            name: name.to_string(),
            formatting,
            claims: BTreeSet::new(),
        };
        let event = StoreEvent::Upserted(record_for(&faction));
        self.factions.insert(id.clone(), faction);
        Ok((id, vec![event]))
    }

    pub fn rename(&mut self, id: &RecordId, name: &str) -> StoreResult<Vec<StoreEvent>> {
        self.ensure_name_free(name, Some(id))?;
        let faction = self.faction_mut(id)?;
        faction.name = name.to_string();
        Ok(vec![StoreEvent::Upserted(record_for(faction))])
    }

    pub fn set_formatting(
        &mut self,
        id: &RecordId,
        formatting: Option<Formatting>,
    ) -> StoreResult<Vec<StoreEvent>> {
        let faction = self.faction_mut(id)?;
        faction.formatting = formatting;
        Ok(vec![StoreEvent::Upserted(record_for(faction))])
    }

    /// Claims `cell` for `id`, taking it from any previous owner.
    ///
    /// Claiming a cell the faction already owns emits nothing.
    pub fn claim(&mut self, id: &RecordId, cell: CellPos) -> StoreResult<Vec<StoreEvent>> {
        if !self.factions.contains_key(id) {
            return Err(StoreError::UnknownFaction { id: id.clone() });
        }
        if let Some(previous) = self.owners.insert(cell, id.clone()) {
            if &previous == id {
                return Ok(Vec::new());
            }
            if let Some(faction) = self.factions.get_mut(&previous) {
                faction.claims.remove(&cell);
            }
        }
        self.faction_mut(id)?.claims.insert(cell);
        Ok(vec![StoreEvent::CellClaimed {
            cell,
            record: id.clone(),
        }])
    }

    /// Releases `cell`. Releasing an unowned cell emits nothing.
    pub fn unclaim(&mut self, cell: CellPos) -> Vec<StoreEvent> {
        let Some(owner) = self.owners.remove(&cell) else {
            return Vec::new();
        };
        if let Some(faction) = self.factions.get_mut(&owner) {
            faction.claims.remove(&cell);
        }
        vec![StoreEvent::CellUnclaimed(cell)]
    }

    /// Removes a faction and all of its claims.
    pub fn remove(&mut self, id: &RecordId) -> StoreResult<Vec<StoreEvent>> {
        let faction = self
            .factions
            .remove(id)
            .ok_or_else(|| StoreError::UnknownFaction { id: id.clone() })?;
        for cell in &faction.claims {
            self.owners.remove(cell);
        }
        Ok(vec![StoreEvent::Deleted(faction.id)])
    }

    fn faction_mut(&mut self, id: &RecordId) -> StoreResult<&mut Faction> {
        self.factions
            .get_mut(id)
            .ok_or_else(|| StoreError::UnknownFaction { id: id.clone() })
    }

    fn ensure_name_free(&self, name: &str, except: Option<&RecordId>) -> StoreResult<()> {
        let taken = self
            .factions
            .values()
            .any(|faction| faction.name == name && Some(&faction.id) != except);
        if taken {
            return Err(StoreError::NameTaken {
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

impl AuthoritativeStore for FactionStore {
    fn list_records(&self) -> Vec<ClaimedAreaRecord> {
        self.factions.values().map(record_for).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codec::Category;

    #[test]
    fn create_emits_upsert_with_derived_fields() {
        let mut store = FactionStore::new();
        let (id, events) = store.create("safezone", None).unwrap();
        let [StoreEvent::Upserted(record)] = events.as_slice() else {
            panic!("expected one upsert, got {events:?}");
        };
        assert_eq!(record.id, id);
        assert_eq!(record.category, Category::Protected);
        assert!(record.color.is_some());
    }

    #[test]
    fn ids_are_never_reused() {
        let mut store = FactionStore::new();
        let (first, _) = store.create("a", None).unwrap();
        store.remove(&first).unwrap();
        let (second, _) = store.create("a", None).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn names_are_unique() {
        let mut store = FactionStore::new();
        let (a, _) = store.create("a", None).unwrap();
        let (b, _) = store.create("b", None).unwrap();
        assert_eq!(
            store.create("a", None).unwrap_err(),
            StoreError::NameTaken { name: "a".into() }
        );
        assert!(store.rename(&b, "a").is_err());
        assert!(store.rename(&a, "a").is_ok());
    }

    #[test]
    fn claim_moves_cell_between_factions() {
        let mut store = FactionStore::new();
        let (a, _) = store.create("a", None).unwrap();
        let (b, _) = store.create("b", None).unwrap();
        let cell = CellPos::new(3, 4);
        store.claim(&a, cell).unwrap();
        let events = store.claim(&b, cell).unwrap();
        assert_eq!(
            events,
            vec![StoreEvent::CellClaimed {
                cell,
                record: b.clone()
            }]
        );
        assert_eq!(store.owner_of(cell), Some(&b));
        assert!(store.faction(&a).unwrap().claims.is_empty());
        assert!(store.claim(&b, cell).unwrap().is_empty());
    }

    #[test]
    fn unclaim_unowned_is_silent() {
        let mut store = FactionStore::new();
        assert!(store.unclaim(CellPos::new(0, 0)).is_empty());
    }

    #[test]
    fn remove_releases_claims() {
        let mut store = FactionStore::new();
        let (a, _) = store.create("a", None).unwrap();
        store.claim(&a, CellPos::new(0, 0)).unwrap();
        assert_eq!(store.remove(&a).unwrap(), vec![StoreEvent::Deleted(a.clone())]);
        assert_eq!(store.owner_of(CellPos::new(0, 0)), None);
        assert_eq!(store.claimed_cell_count(), 0);
        assert!(store.remove(&a).is_err());
    }

    #[test]
    fn list_records_reflects_live_state() {
        let mut store = FactionStore::new();
        let (a, _) = store.create("a", Some(Formatting::Aqua)).unwrap();
        store.claim(&a, CellPos::new(1, 1)).unwrap();
        let records = store.list_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].display_name, "\u{a7}ba");
        assert!(records[0].claims(CellPos::new(1, 1)));
    }

    #[test]
    fn claim_for_unknown_faction_fails() {
        let mut store = FactionStore::new();
        let err = store.claim(&RecordId::from("nope"), CellPos::new(0, 0)).unwrap_err();
        assert!(matches!(err, StoreError::UnknownFaction { .. }));
        assert_eq!(store.claimed_cell_count(), 0);
    }
}
