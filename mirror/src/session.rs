//! Sink session lifecycle.
//!
//! ```text
//! Disconnected --connect--> AwaitingSnapshot --snapshot--> Synced --event--> Synced
//!       ^                          |                         |
//!       +-------disconnect---------+-----------disconnect----+
//! ```

use std::time::Instant;

use codec::{decode_message, encode_message, Message};
use wire::{MessageTag, Uplink};

use crate::config::SessionConfig;
use crate::error::{ApplyError, SyncError, SyncResult};
use crate::inbox::{InboundEvent, Inbox};
use crate::listener::MirrorChange;
use crate::registry::SinkRegistry;
use crate::scheduler::{Scheduler, TaskHandle};
use crate::stats::SyncStats;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SessionState {
    Disconnected,
    AwaitingSnapshot,
    Synced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionTask {
    RequestSnapshot,
}

/// One sink's view of the protocol: the mirror plus the state machine that
/// decides what to do with each inbound message.
///
/// Single-threaded. Network threads hand events over through an
/// [`Inbox`]; the owner calls [`pump`](Self::pump) or the individual
/// `on_*` methods and [`poll`](Self::poll) on its own thread.
#[derive(Debug)]
pub struct SinkSession {
    config: SessionConfig,
    state: SessionState,
    registry: SinkRegistry,
    scheduler: Scheduler<SessionTask>,
    pending_request: Option<TaskHandle>,
    stats: SyncStats,
}

impl Default for SinkSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl SinkSession {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: SessionState::Disconnected,
            registry: SinkRegistry::new(),
            scheduler: Scheduler::new(),
            pending_request: None,
            stats: SyncStats::default(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub const fn registry(&self) -> &SinkRegistry {
        &self.registry
    }

    /// Mutable access for registering listeners.
    pub fn registry_mut(&mut self) -> &mut SinkRegistry {
        &mut self.registry
    }

    #[must_use]
    pub const fn stats(&self) -> SyncStats {
        self.stats
    }

    /// Returns `true` while the delayed snapshot request has not fired.
    #[must_use]
    pub fn has_pending_request(&self) -> bool {
        self.pending_request
            .is_some_and(|handle| self.scheduler.is_pending(handle))
    }

    /// When [`poll`](Self::poll) next has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Starts a fresh connection cycle.
    ///
    /// A connect while already connected is treated as a reconnect: the old
    /// mirror is discarded first.
    pub fn on_connected(&mut self, now: Instant, uplink: &mut impl Uplink) -> SyncResult<()> {
        if self.state != SessionState::Disconnected {
            tracing::info!(state = ?self.state, "connect while connected, resetting");
            self.on_disconnected();
        }
        self.state = SessionState::AwaitingSnapshot;
        self.stats.connections += 1;
        tracing::info!("connected, awaiting snapshot");

        if !self.config.request_on_connect {
            return Ok(());
        }
        let delay = self.config.snapshot_request_delay();
        if delay.is_zero() {
            return self.send_request(uplink);
        }
        let handle = self
            .scheduler
            .schedule_after(now, delay, SessionTask::RequestSnapshot);
        self.pending_request = Some(handle);
        Ok(())
    }

    /// Ends the connection: cancels pending work and clears the mirror.
    pub fn on_disconnected(&mut self) -> Vec<MirrorChange> {
        if let Some(handle) = self.pending_request.take() {
            self.scheduler.cancel(handle);
        }
        self.scheduler.clear();
        if self.state != SessionState::Disconnected {
            tracing::info!(records = self.registry.len(), "disconnected, clearing mirror");
        }
        self.state = SessionState::Disconnected;
        self.registry.clear()
    }

    /// Decodes and applies one inbound frame.
    ///
    /// Errors describe why the frame was dropped; the session stays usable.
    pub fn on_payload(&mut self, bytes: &[u8]) -> SyncResult<Vec<MirrorChange>> {
        let message = match decode_message(bytes, &self.config.codec, &self.config.wire) {
            Ok(message) => message,
            Err(err) => {
                self.stats.decode_errors += 1;
                tracing::warn!(error = %err, len = bytes.len(), "dropping undecodable frame");
                return Err(err.into());
            }
        };
        self.on_message(message)
    }

    /// Applies one decoded message according to the session state.
    pub fn on_message(&mut self, message: Message) -> SyncResult<Vec<MirrorChange>> {
        let tag = message.tag();
        match (self.state, message) {
            (SessionState::Disconnected, _) => {
                self.stats.dropped_messages += 1;
                tracing::warn!(?tag, "message while disconnected");
                Err(SyncError::NotConnected { tag })
            }
            (_, Message::RequestSnapshot) => {
                self.stats.dropped_messages += 1;
                tracing::warn!("snapshot request received by a sink");
                Err(ApplyError::NotApplicable { tag }.into())
            }
            (state, Message::Snapshot(records)) => {
                if let Some(handle) = self.pending_request.take() {
                    if self.scheduler.cancel(handle).is_some() {
                        tracing::debug!("snapshot arrived, cancelled delayed request");
                    }
                }
                let count = records.len();
                let changes = self.registry.apply_snapshot(records);
                self.stats.snapshots_applied += 1;
                if state == SessionState::AwaitingSnapshot {
                    tracing::info!(records = count, "initial snapshot applied");
                } else {
                    tracing::info!(records = count, "resync snapshot applied");
                }
                self.state = SessionState::Synced;
                Ok(changes)
            }
            (SessionState::AwaitingSnapshot, _) => {
                self.stats.dropped_messages += 1;
                tracing::warn!(?tag, "incremental event before snapshot");
                Err(SyncError::AwaitingSnapshot { tag })
            }
            (SessionState::Synced, message) => match self.registry.apply(message) {
                Ok(changes) => {
                    self.stats.events_applied += 1;
                    tracing::debug!(?tag, changes = changes.len(), "applied event");
                    Ok(changes)
                }
                Err(err) => {
                    self.stats.unknown_references += 1;
                    tracing::warn!(?tag, error = %err, "ignoring event");
                    Err(err.into())
                }
            },
        }
    }

    /// Runs every task due at `now`. Returns the number of requests sent.
    pub fn poll(&mut self, now: Instant, uplink: &mut impl Uplink) -> usize {
        let mut sent = 0;
        for task in self.scheduler.drain_due(now) {
            match task {
                SessionTask::RequestSnapshot => {
                    self.pending_request = None;
                    if self.state != SessionState::AwaitingSnapshot {
                        continue;
                    }
                    if self.send_request(uplink).is_ok() {
                        sent += 1;
                    }
                }
            }
        }
        sent
    }

    /// Asks the source for a fresh snapshot right away.
    ///
    /// Used after a detected desync; the mirror keeps serving the old state
    /// until the snapshot arrives.
    pub fn request_resync(&mut self, uplink: &mut impl Uplink) -> SyncResult<()> {
        if self.state == SessionState::Disconnected {
            return Err(SyncError::NotConnected {
                tag: MessageTag::RequestSnapshot,
            });
        }
        self.send_request(uplink)
    }

    /// Routes one inbound event. Returns the mirror changes it caused.
    pub fn handle_event(
        &mut self,
        event: InboundEvent,
        now: Instant,
        uplink: &mut impl Uplink,
    ) -> SyncResult<Vec<MirrorChange>> {
        match event {
            InboundEvent::Connected => self.on_connected(now, uplink).map(|()| Vec::new()),
            InboundEvent::Payload(bytes) => self.on_payload(&bytes),
            InboundEvent::Disconnected => Ok(self.on_disconnected()),
        }
    }

    /// Drains the inbox, then runs due tasks. Returns the number of events
    /// handled.
    ///
    /// Per-event errors are already logged and counted, so they are not
    /// returned.
    pub fn pump(&mut self, inbox: &Inbox, now: Instant, uplink: &mut impl Uplink) -> usize {
        let mut handled = 0;
        for event in inbox.try_iter() {
            let _ = self.handle_event(event, now, uplink);
            handled += 1;
        }
        self.poll(now, uplink);
        handled
    }

    fn send_request(&mut self, uplink: &mut impl Uplink) -> SyncResult<()> {
        let config = &self.config;
        let bytes = encode_message(&Message::RequestSnapshot, &config.codec, &config.wire)?;
        match uplink.send_to_source(&bytes) {
            Ok(()) => {
                self.stats.requests_sent += 1;
                tracing::debug!("requested snapshot");
                Ok(())
            }
            Err(err) => {
                self.stats.request_failures += 1;
                tracing::warn!(error = %err, "snapshot request failed");
                Err(err.into())
            }
        }
    }
}
