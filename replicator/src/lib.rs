//! Source side of claimsync: decide what every sink must hear.
//!
//! A [`SourceReplicator`] keeps the registered sink set, answers snapshot
//! requests from the live [`AuthoritativeStore`] and fans incremental events
//! out in the order the store emits them. [`FactionStore`] is an in-memory
//! store whose mutations return the [`StoreEvent`]s to broadcast.

pub mod derive;
mod replicator;
mod store;

pub use derive::{category_for_name, color_for, display_name, record_for, Formatting};
pub use replicator::{
    BroadcastReport, DropReason, ReplicatorError, ReplicatorStats, SourceReplicator,
    UplinkOutcome,
};
pub use store::{AuthoritativeStore, Faction, FactionStore, StoreError, StoreEvent, StoreResult};
