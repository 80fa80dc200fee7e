use std::cell::RefCell;
use std::rc::Rc;

use codec::{CellPos, ClaimedAreaRecord, Message, RecordId};
use mirror::{MirrorChange, MirrorListener, SinkRegistry};

fn cell(x: i32, z: i32) -> CellPos {
    CellPos::new(x, z)
}

fn id(raw: &str) -> RecordId {
    RecordId::from(raw)
}

fn example_snapshot() -> Vec<ClaimedAreaRecord> {
    vec![
        ClaimedAreaRecord::new("a1", "red").with_cells([(0, 0), (0, 1)]),
        ClaimedAreaRecord::new("a2", "blue").with_cells([(5, 5)]),
    ]
}

#[derive(Default)]
struct Log(Rc<RefCell<Vec<String>>>);

impl MirrorListener for Log {
    fn on_record_added(&mut self, record: &ClaimedAreaRecord) {
        self.0.borrow_mut().push(format!("added {}", record.id));
    }

    fn on_record_updated(&mut self, record: &ClaimedAreaRecord) {
        self.0.borrow_mut().push(format!("updated {}", record.id));
    }

    fn on_record_removed(&mut self, record: &ClaimedAreaRecord) {
        self.0.borrow_mut().push(format!("removed {}", record.id));
    }

    fn on_cell_owner_changed(
        &mut self,
        cell: CellPos,
        previous: Option<&RecordId>,
        current: Option<&RecordId>,
    ) {
        let name = |owner: Option<&RecordId>| owner.map_or("-".to_string(), ToString::to_string);
        self.0
            .borrow_mut()
            .push(format!("cell {cell} {} -> {}", name(previous), name(current)));
    }

    fn on_mirror_replaced(&mut self, records: &[&ClaimedAreaRecord]) {
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        self.0.borrow_mut().push(format!("replaced [{}]", ids.join(",")));
    }

    fn on_mirror_cleared(&mut self) {
        self.0.borrow_mut().push("cleared".to_string());
    }
}

#[test]
fn two_record_snapshot_then_claim_then_delete() {
    let mut registry = SinkRegistry::new();
    registry.apply(Message::Snapshot(example_snapshot())).unwrap();

    assert_eq!(registry.len(), 2);
    assert_eq!(registry.owner_of(cell(0, 0)), Some(&id("a1")));
    assert_eq!(registry.owner_of(cell(0, 1)), Some(&id("a1")));
    assert_eq!(registry.owner_of(cell(5, 5)), Some(&id("a2")));

    registry
        .apply(Message::CellClaim {
            record: id("a2"),
            cell: cell(0, 0),
        })
        .unwrap();
    assert_eq!(registry.owner_of(cell(0, 0)), Some(&id("a2")));
    let a1 = registry.record(&id("a1")).unwrap();
    assert_eq!(a1.claimed_cells.len(), 1);
    assert!(a1.claims(cell(0, 1)));

    registry.apply(Message::Delete(id("a1"))).unwrap();
    assert!(registry.record(&id("a1")).is_none());
    assert_eq!(registry.owner_of(cell(0, 1)), None);
    assert_eq!(registry.owner_of(cell(0, 0)), Some(&id("a2")));
    assert_eq!(registry.cell_count(), 2);
    assert!(registry.is_consistent());
}

#[test]
fn listeners_observe_changes_in_order() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut registry = SinkRegistry::new();
    registry.add_listener(Box::new(Log(Rc::clone(&log))));

    registry.apply_snapshot(example_snapshot());
    registry.apply_cell_claim(cell(0, 0), &id("a2")).unwrap();
    registry.apply_upsert(ClaimedAreaRecord::new("a3", "green").with_cells([(7, 7)]));
    registry.apply_delete(&id("a1")).unwrap();
    registry.apply_cell_unclaim(cell(7, 7));
    registry.clear();

    assert_eq!(
        *log.borrow(),
        vec![
            "replaced [a1,a2]",
            "cell (0, 0) a1 -> a2",
            "added a3",
            "cell (7, 7) - -> a3",
            "cell (0, 1) a1 -> -",
            "removed a1",
            "cell (7, 7) a3 -> -",
            "cleared",
        ]
    );
}

#[test]
fn unregistered_listener_stops_hearing() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut registry = SinkRegistry::new();
    let handle = registry.add_listener(Box::new(Log(Rc::clone(&log))));
    registry.apply_snapshot(example_snapshot());
    assert!(registry.remove_listener(handle));
    registry.clear();
    assert_eq!(log.borrow().len(), 1);
    assert!(registry.listeners().is_empty());
}

#[test]
fn returned_changes_match_notifications() {
    let mut registry = SinkRegistry::new();
    registry.apply_snapshot(example_snapshot());
    let changes = registry
        .apply_upsert(ClaimedAreaRecord::new("a2", "blue").with_cells([(0, 1), (5, 5)]));
    assert_eq!(
        changes,
        vec![
            MirrorChange::RecordUpdated(id("a2")),
            MirrorChange::CellOwnerChanged {
                cell: cell(0, 1),
                previous: Some(id("a1")),
                current: Some(id("a2")),
            },
        ]
    );
}
