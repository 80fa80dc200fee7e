//! End-to-end simulation of claimsync replication.
//!
//! One [`FactionStore`](replicator::FactionStore) feeds a
//! [`SourceReplicator`](replicator::SourceReplicator) that fans out over an
//! in-process transport to a set of [`SinkSession`](mirror::SinkSession)s.
//! A seeded scenario mutates the store; at the end every sink mirror must
//! equal the store.
//!
//! - **Reproducible** - the same config and seed produce the same summary.
//! - **Lossy on demand** - one sink can lose deliveries, then resync.

mod config;
mod scenario;
mod simulation;
mod transport;

pub use config::SimConfig;
pub use scenario::{OpCounts, OpKind, Rng, Scenario};
pub use simulation::{run, SinkReport, Simulation, Summary};
pub use transport::FaultyTransport;
