//! The source, its sinks and the simulated clock.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use codec::ClaimedAreaRecord;
use mirror::{SessionState, SinkSession, SyncStats};
use replicator::{AuthoritativeStore, FactionStore, SourceReplicator, StoreEvent, UplinkOutcome};
use serde::Serialize;
use tracing::{debug, info, warn};
use wire::{ChannelTransport, SinkEndpoint, SinkId};

use crate::config::SimConfig;
use crate::scenario::{OpCounts, Scenario};
use crate::transport::FaultyTransport;

struct SimSink {
    endpoint: SinkEndpoint,
    session: SinkSession,
    missed: u64,
    diverged_before_resync: bool,
}

/// Per-sink outcome.
#[derive(Debug, Clone, Serialize)]
pub struct SinkReport {
    pub sink: u32,
    pub state: String,
    pub records: usize,
    pub cells: usize,
    pub missed_deliveries: u64,
    pub diverged_before_resync: bool,
    pub converged: bool,
    pub stats: SyncStats,
}

/// Everything a run reports; serialized to `summary.json`.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub sinks: u32,
    pub ops: u32,
    pub seed: u64,
    pub fail_sink: Option<u32>,
    pub fail_every: u32,
    pub op_counts: OpCounts,
    pub events_broadcast: u64,
    pub messages_sent: u64,
    pub bytes_sent: u64,
    pub snapshots_sent: u64,
    pub send_failures: u64,
    pub encode_failures: u64,
    pub uplink_dropped: u64,
    pub lost_deliveries: u64,
    pub snapshot_requests_served: u64,
    pub records: usize,
    pub claimed_cells: usize,
    pub simulated_ms: u64,
    pub sink_reports: Vec<SinkReport>,
    pub converged: bool,
}

impl Summary {
    /// Sinks whose mirror differs from the store.
    pub fn diverged(&self) -> impl Iterator<Item = &SinkReport> {
        self.sink_reports.iter().filter(|report| !report.converged)
    }
}

/// One source, N sinks, one clock.
pub struct Simulation {
    config: SimConfig,
    store: FactionStore,
    replicator: SourceReplicator<FaultyTransport>,
    sinks: Vec<SimSink>,
    scenario: Scenario,
    start: Instant,
    elapsed: Duration,
    op_counts: OpCounts,
    events_broadcast: u64,
    requests_served: u64,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        let faulty = config.fail_sink.map(SinkId);
        let transport = FaultyTransport::new(ChannelTransport::new(), faulty, config.fail_every);
        let replicator = SourceReplicator::with_limits(
            transport,
            config.session.codec.clone(),
            config.session.wire.clone(),
        );
        Ok(Self {
            scenario: Scenario::new(config.seed, config.grid_radius),
            config,
            store: FactionStore::new(),
            replicator,
            sinks: Vec::new(),
            start: Instant::now(),
            elapsed: Duration::ZERO,
            op_counts: OpCounts::default(),
            events_broadcast: 0,
            requests_served: 0,
        })
    }

    #[must_use]
    pub const fn store(&self) -> &FactionStore {
        &self.store
    }

    /// The session of sink `index`.
    #[must_use]
    pub fn session(&self, index: usize) -> Option<&SinkSession> {
        self.sinks.get(index).map(|sink| &sink.session)
    }

    fn now(&self) -> Instant {
        self.start + self.elapsed
    }

    /// Connects every configured sink: the sink starts its session, then
    /// the source registers it and pushes a snapshot.
    pub fn connect_all(&mut self) -> Result<()> {
        let now = self.now();
        for index in 0..self.config.sinks {
            let id = SinkId(index);
            let mut endpoint = self.replicator.transport_mut().channels_mut().connect(id);
            let mut session = SinkSession::new(self.config.session.clone());
            session
                .on_connected(now, &mut endpoint.uplink)
                .with_context(|| format!("connect sink {id}"))?;
            let mut missed = 0;
            if let Err(err) = self.replicator.on_sink_connected(id, &self.store) {
                warn!(sink = %id, error = %err, "initial snapshot not delivered");
                missed += 1;
            }
            self.sinks.push(SimSink {
                endpoint,
                session,
                missed,
                diverged_before_resync: false,
            });
        }
        info!(sinks = self.sinks.len(), "all sinks connected");
        Ok(())
    }

    /// Advances the clock, performs one operation and lets every party
    /// process what it received.
    pub fn step(&mut self) -> Result<()> {
        self.elapsed += Duration::from_millis(self.config.step_ms);
        let (kind, events) = self.scenario.step(&mut self.store);
        self.op_counts.record(kind, !events.is_empty());
        self.broadcast(&events)?;
        self.deliver();
        self.serve_uplink();
        Ok(())
    }

    fn broadcast(&mut self, events: &[StoreEvent]) -> Result<()> {
        for event in events {
            let report = self
                .replicator
                .handle_store_event(event)
                .context("encode store event")?;
            self.events_broadcast += 1;
            for failure in &report.failures {
                if let Some(sink) = self.sinks.get_mut(failure.sink().0 as usize) {
                    sink.missed += 1;
                }
            }
        }
        Ok(())
    }

    /// Hands every queued frame to its session, then runs due tasks.
    fn deliver(&mut self) {
        let now = self.now();
        for sink in &mut self.sinks {
            for bytes in sink.endpoint.inbound.try_iter() {
                let _ = sink.session.on_payload(&bytes);
            }
            sink.session.poll(now, &mut sink.endpoint.uplink);
        }
    }

    fn serve_uplink(&mut self) {
        for (from, bytes) in self.replicator.transport().channels().drain_uplink() {
            match self.replicator.handle_sink_message(from, &bytes, &self.store) {
                UplinkOutcome::SnapshotSent { bytes } => {
                    self.requests_served += 1;
                    debug!(sink = %from, bytes, "served snapshot request");
                }
                UplinkOutcome::SnapshotFailed(err) => {
                    warn!(sink = %from, error = %err, "snapshot request not served");
                    if let Some(sink) = self.sinks.get_mut(from.0 as usize) {
                        sink.missed += 1;
                    }
                }
                UplinkOutcome::Dropped(reason) => {
                    warn!(sink = %from, ?reason, "uplink frame dropped");
                }
            }
        }
    }

    /// Restores the lossy link and asks every sink that missed a delivery
    /// for a resync.
    pub fn repair(&mut self) -> Result<()> {
        self.replicator.transport_mut().heal();
        let expected = self.store.list_records();
        for (index, sink) in self.sinks.iter_mut().enumerate() {
            if sink.missed == 0 {
                continue;
            }
            sink.diverged_before_resync = mirror_of(&sink.session) != expected;
            info!(
                sink = index,
                missed = sink.missed,
                diverged = sink.diverged_before_resync,
                "requesting resync"
            );
            sink.session
                .request_resync(&mut sink.endpoint.uplink)
                .with_context(|| format!("resync sink {index}"))?;
        }
        self.serve_uplink();
        self.deliver();
        Ok(())
    }

    /// Compares every mirror with the store.
    #[must_use]
    pub fn summarize(&self) -> Summary {
        let expected = self.store.list_records();
        let stats = self.replicator.stats();
        let sink_reports: Vec<SinkReport> = self
            .sinks
            .iter()
            .zip(0u32..)
            .map(|(sink, index)| {
                let registry = sink.session.registry();
                let converged = sink.session.state() == SessionState::Synced
                    && registry.is_consistent()
                    && mirror_of(&sink.session) == expected;
                SinkReport {
                    sink: index,
                    state: format!("{:?}", sink.session.state()),
                    records: registry.len(),
                    cells: registry.cell_count(),
                    missed_deliveries: sink.missed,
                    diverged_before_resync: sink.diverged_before_resync,
                    converged,
                    stats: sink.session.stats(),
                }
            })
            .collect();
        Summary {
            sinks: self.config.sinks,
            ops: self.config.ops,
            seed: self.config.seed,
            fail_sink: self.config.fail_sink,
            fail_every: self.config.fail_every,
            op_counts: self.op_counts,
            events_broadcast: self.events_broadcast,
            messages_sent: stats.messages_sent,
            bytes_sent: stats.bytes_sent,
            snapshots_sent: stats.snapshots_sent,
            send_failures: stats.send_failures,
            encode_failures: stats.encode_failures,
            uplink_dropped: stats.uplink_dropped,
            lost_deliveries: self.replicator.transport().dropped(),
            snapshot_requests_served: self.requests_served,
            records: expected.len(),
            claimed_cells: self.store.claimed_cell_count(),
            simulated_ms: u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX),
            converged: sink_reports.iter().all(|report| report.converged),
            sink_reports,
        }
    }
}

fn mirror_of(session: &SinkSession) -> Vec<ClaimedAreaRecord> {
    session.registry().records().into_iter().cloned().collect()
}

/// Runs a whole scenario: connect, mutate, repair, compare.
pub fn run(config: &SimConfig) -> Result<Summary> {
    let mut sim = Simulation::new(config.clone())?;
    sim.connect_all()?;
    for _ in 0..config.ops {
        sim.step()?;
    }
    sim.repair()?;
    let summary = sim.summarize();
    info!(
        records = summary.records,
        cells = summary.claimed_cells,
        messages = summary.messages_sent,
        bytes = summary.bytes_sent,
        converged = summary.converged,
        "simulation finished"
    );
    Ok(summary)
}
