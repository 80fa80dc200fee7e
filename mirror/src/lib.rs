//! Sink side of claimsync: a local mirror of the source's claimed areas.
//!
//! [`SinkRegistry`] holds the records and the cell ownership index and
//! notifies [`MirrorListener`]s of every change. [`SinkSession`] wraps it in
//! the connection lifecycle: request a snapshot after connecting, apply
//! events once synced, discard everything on disconnect.
//!
//! # Threading
//!
//! Nothing here locks. Network threads push [`InboundEvent`]s through an
//! [`InboxSender`]; the thread that owns the session drains the [`Inbox`].

mod config;
mod error;
mod inbox;
mod listener;
mod registry;
mod scheduler;
mod session;
mod stats;

pub use config::SessionConfig;
pub use error::{ApplyError, SyncError, SyncResult};
pub use inbox::{inbox, InboundEvent, Inbox, InboxClosed, InboxSender};
pub use listener::{ListenerId, ListenerSet, MirrorChange, MirrorListener};
pub use registry::SinkRegistry;
pub use scheduler::{Scheduler, TaskHandle};
pub use session::{SessionState, SinkSession};
pub use stats::SyncStats;
