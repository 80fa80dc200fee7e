//! Data model and message codec for the claimsync protocol.
//!
//! This crate ties together `bytestream` and `wire` to turn claimed-area
//! records and protocol messages into frames and back.
//!
//! # Features
//!
//! - Claimed-area record encoding with explicit category and optional color
//! - The six-message catalogue ([`Message`])
//! - Bounded encoding and decoding via [`CodecLimits`] and [`WireLimits`]
//!
//! # Design Principles
//!
//! - **Exact round-trip** - `decode(encode(m)) == m` for every message the
//!   encoder accepts under the limits the decoder applies.
//! - **Deterministic** - Cell sets are ordered, so equal records encode equally.
//! - **Never panics on input** - Malformed bytes always yield a [`CodecError`].

mod error;
mod limits;
mod message;
mod record;
mod types;

pub use error::{CodecError, CodecResult, LimitKind};
pub use limits::CodecLimits;
pub use message::{decode_message, encode_message, encode_message_into, Message};
pub use record::{decode_record, decode_records, encode_record, encode_records};
pub use types::{Category, CellPos, ClaimedAreaRecord, RecordId, Rgb};
pub use wire::Limits as WireLimits;
