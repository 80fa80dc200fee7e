//! Seeded random store operations.

use codec::{CellPos, RecordId};
use replicator::{FactionStore, Formatting, StoreEvent, StoreResult};
use serde::Serialize;

/// Names that derive a non-default category.
const SPECIAL_NAMES: [&str; 3] = ["wilderness", "SafeZone", "warzone"];

/// Linear congruential generator; deterministic across platforms.
#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1);
        (self.state >> 32) as u32
    }

    /// Uniform-ish value in `0..bound`. `bound` of zero yields zero.
    pub fn below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        self.next_u32() % bound
    }

    /// Value in `min..max`.
    pub fn range_i32(&mut self, min: i32, max: i32) -> i32 {
        let span = max.abs_diff(min).max(1);
        min.wrapping_add(self.below(span) as i32)
    }
}

/// The kinds of operation a scenario performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Create,
    Rename,
    Recolor,
    Claim,
    Unclaim,
    Delete,
}

/// How often each kind ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OpCounts {
    pub create: u64,
    pub rename: u64,
    pub recolor: u64,
    pub claim: u64,
    pub unclaim: u64,
    pub delete: u64,
    /// Operations that changed nothing, e.g. a rename onto a taken name.
    pub noop: u64,
}

impl OpCounts {
    pub fn record(&mut self, kind: OpKind, changed: bool) {
        if !changed {
            self.noop += 1;
            return;
        }
        let slot = match kind {
            OpKind::Create => &mut self.create,
            OpKind::Rename => &mut self.rename,
            OpKind::Recolor => &mut self.recolor,
            OpKind::Claim => &mut self.claim,
            OpKind::Unclaim => &mut self.unclaim,
            OpKind::Delete => &mut self.delete,
        };
        *slot += 1;
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.create
            + self.rename
            + self.recolor
            + self.claim
            + self.unclaim
            + self.delete
            + self.noop
    }
}

/// Drives a [`FactionStore`] with pseudo-random mutations.
#[derive(Debug, Clone)]
pub struct Scenario {
    rng: Rng,
    grid_radius: i32,
    next_name: u32,
}

impl Scenario {
    #[must_use]
    pub fn new(seed: u64, grid_radius: i32) -> Self {
        Self {
            rng: Rng::new(seed),
            grid_radius: grid_radius.max(1),
            next_name: 0,
        }
    }

    /// Performs one operation and returns the events it emitted.
    pub fn step(&mut self, store: &mut FactionStore) -> (OpKind, Vec<StoreEvent>) {
        let kind = self.pick_kind(store);
        let events = match kind {
            OpKind::Create => {
                let name = self.fresh_name();
                let formatting = self.formatting();
                store.create(&name, formatting).map(|(_, events)| events)
            }
            OpKind::Rename => {
                let name = self.fresh_name();
                self.with_target(store, |store, id| store.rename(&id, &name))
            }
            OpKind::Recolor => {
                let formatting = self.formatting();
                self.with_target(store, |store, id| store.set_formatting(&id, formatting))
            }
            OpKind::Claim => {
                let cell = self.cell();
                self.with_target(store, |store, id| store.claim(&id, cell))
            }
            OpKind::Unclaim => Ok(store.unclaim(self.cell())),
            OpKind::Delete => self.with_target(store, |store, id| store.remove(&id)),
        };
        (kind, events.unwrap_or_default())
    }

    fn pick_kind(&mut self, store: &FactionStore) -> OpKind {
        if store.len() < 2 {
            return OpKind::Create;
        }
        match self.rng.below(100) {
            0..=11 => OpKind::Create,
            12..=16 => OpKind::Rename,
            17..=21 => OpKind::Recolor,
            22..=71 => OpKind::Claim,
            72..=91 => OpKind::Unclaim,
            _ => OpKind::Delete,
        }
    }

    fn with_target(
        &mut self,
        store: &mut FactionStore,
        op: impl FnOnce(&mut FactionStore, RecordId) -> StoreResult<Vec<StoreEvent>>,
    ) -> StoreResult<Vec<StoreEvent>> {
        let count = u32::try_from(store.len()).unwrap_or(u32::MAX);
        let index = self.rng.below(count) as usize;
        let target = store.ids().nth(index).cloned();
        match target {
            Some(id) => op(store, id),
            None => Ok(Vec::new()),
        }
    }

    fn fresh_name(&mut self) -> String {
        if self.rng.below(10) == 0 {
            return SPECIAL_NAMES[self.rng.below(3) as usize].to_string();
        }
        self.next_name += 1;
        format!("faction-{}", self.next_name)
    }

    fn formatting(&mut self) -> Option<Formatting> {
        let roll = self.rng.below(20) as usize;
        Formatting::ALL.get(roll).copied()
    }

    fn cell(&mut self) -> CellPos {
        let r = self.grid_radius;
        CellPos::new(self.rng.range_i32(-r, r), self.rng.range_i32(-r, r))
    }
}
