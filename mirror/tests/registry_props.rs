use std::collections::{HashMap, HashSet};

use codec::{CellPos, ClaimedAreaRecord, RecordId};
use mirror::SinkRegistry;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Upsert(u8, Vec<(i8, i8)>),
    Claim(u8, (i8, i8)),
    Unclaim((i8, i8)),
    Delete(u8),
}

fn small_cell() -> impl Strategy<Value = (i8, i8)> {
    (-3i8..3, -3i8..3)
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..4, prop::collection::vec(small_cell(), 0..6)).prop_map(|(r, c)| Op::Upsert(r, c)),
        (0u8..4, small_cell()).prop_map(|(r, c)| Op::Claim(r, c)),
        small_cell().prop_map(Op::Unclaim),
        (0u8..4).prop_map(Op::Delete),
    ]
}

fn record_id(raw: u8) -> RecordId {
    RecordId::new(format!("r{raw}"))
}

fn to_cell((x, z): (i8, i8)) -> CellPos {
    CellPos::new(i32::from(x), i32::from(z))
}

fn apply(registry: &mut SinkRegistry, op: &Op) {
    match op {
        Op::Upsert(r, cells) => {
            registry.apply_upsert(
                ClaimedAreaRecord::new(record_id(*r), "n")
                    .with_cells(cells.iter().copied().map(to_cell)),
            );
        }
        Op::Claim(r, c) => {
            let _ = registry.apply_cell_claim(to_cell(*c), &record_id(*r));
        }
        Op::Unclaim(c) => {
            registry.apply_cell_unclaim(to_cell(*c));
        }
        Op::Delete(r) => {
            let _ = registry.apply_delete(&record_id(*r));
        }
    }
}

fn snapshot_strategy() -> impl Strategy<Value = Vec<ClaimedAreaRecord>> {
    prop::collection::btree_map(0u8..6, prop::collection::btree_set(small_cell(), 0..5), 0..6)
        .prop_map(|records| {
            // A well-formed snapshot never lists a cell under two records.
            let mut taken = HashSet::new();
            records
                .into_iter()
                .map(|(r, cells)| {
                    let cells: Vec<_> = cells.into_iter().filter(|c| taken.insert(*c)).collect();
                    ClaimedAreaRecord::new(record_id(r), "n")
                        .with_cells(cells.into_iter().map(to_cell))
                })
                .collect()
        })
}

fn view(registry: &SinkRegistry) -> (Vec<ClaimedAreaRecord>, Vec<(CellPos, RecordId)>) {
    let records = registry.records().into_iter().cloned().collect();
    let mut owners: Vec<_> = registry
        .records()
        .iter()
        .flat_map(|r| r.claimed_cells.iter().map(|c| (*c, r.id.clone())))
        .collect();
    owners.sort();
    (records, owners)
}

proptest! {
    #[test]
    fn prop_at_most_one_owner(ops in prop::collection::vec(op_strategy(), 0..64)) {
        let mut registry = SinkRegistry::new();
        for op in &ops {
            apply(&mut registry, op);
            prop_assert!(registry.is_consistent());
        }
        let mut seen: HashMap<CellPos, RecordId> = HashMap::new();
        for record in registry.records() {
            for cell in &record.claimed_cells {
                prop_assert!(seen.insert(*cell, record.id.clone()).is_none());
                prop_assert_eq!(registry.owner_of(*cell), Some(&record.id));
            }
        }
    }

    #[test]
    fn prop_snapshot_is_idempotent(
        prefix in prop::collection::vec(op_strategy(), 0..16),
        snapshot in snapshot_strategy(),
    ) {
        let mut once = SinkRegistry::new();
        for op in &prefix {
            apply(&mut once, op);
        }
        once.apply_snapshot(snapshot.clone());

        let mut twice = SinkRegistry::new();
        twice.apply_snapshot(snapshot.clone());
        twice.apply_snapshot(snapshot.clone());

        prop_assert_eq!(view(&once), view(&twice));
        let mut expected = snapshot;
        expected.sort_by(|a, b| a.id.cmp(&b.id));
        prop_assert_eq!(view(&once).0, expected);
    }

    #[test]
    fn prop_clear_empties(ops in prop::collection::vec(op_strategy(), 0..32)) {
        let mut registry = SinkRegistry::new();
        for op in &ops {
            apply(&mut registry, op);
        }
        registry.clear();
        prop_assert!(registry.is_empty());
        prop_assert_eq!(registry.cell_count(), 0);
    }
}
