//! The protocol message catalogue.

use bytestream::{ByteReader, ByteWriter};
use wire::{decode_frame, encode_frame, Direction, MessageTag};

use crate::error::{CodecError, CodecResult};
use crate::limits::CodecLimits;
use crate::record::{
    decode_cell, decode_record, decode_records, encode_cell, encode_record, encode_records,
    write_bounded_str,
};
use crate::types::{CellPos, ClaimedAreaRecord, RecordId};

/// Every message the protocol carries, in decoded form.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Message {
    /// Complete replacement of a sink's mirror.
    Snapshot(Vec<ClaimedAreaRecord>),
    /// A record was created or mutated.
    Upsert(ClaimedAreaRecord),
    /// A record ceased to exist.
    Delete(RecordId),
    /// `cell` now belongs to `record`, revoking any previous owner.
    CellClaim { record: RecordId, cell: CellPos },
    /// `cell` reverts to unowned.
    CellUnclaim(CellPos),
    /// A sink asks for a full snapshot.
    RequestSnapshot,
}

impl Message {
    #[must_use]
    pub const fn tag(&self) -> MessageTag {
        match self {
            Self::Snapshot(_) => MessageTag::Snapshot,
            Self::Upsert(_) => MessageTag::Upsert,
            Self::Delete(_) => MessageTag::Delete,
            Self::CellClaim { .. } => MessageTag::CellClaim,
            Self::CellUnclaim(_) => MessageTag::CellUnclaim,
            Self::RequestSnapshot => MessageTag::RequestSnapshot,
        }
    }

    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.tag().direction()
    }
}

/// Encodes `message` into a fresh frame.
///
/// Encoding enforces the limits [`decode_message`] enforces, so with equal
/// limits on both ends every frame this returns is accepted by the peer.
/// Body limits surface as [`CodecError::LimitsExceeded`], frame size limits
/// as [`CodecError::Encode`].
pub fn encode_message(
    message: &Message,
    limits: &CodecLimits,
    wire_limits: &wire::Limits,
) -> CodecResult<Vec<u8>> {
    let mut out = Vec::new();
    encode_message_into(message, limits, wire_limits, &mut out)?;
    Ok(out)
}

/// Appends the frame for `message` to `out`. Returns the bytes written.
///
/// `out` is left untouched on error.
pub fn encode_message_into(
    message: &Message,
    limits: &CodecLimits,
    wire_limits: &wire::Limits,
    out: &mut Vec<u8>,
) -> CodecResult<usize> {
    let mut body = ByteWriter::new();
    match message {
        Message::Snapshot(records) => encode_records(records, &mut body, limits)?,
        Message::Upsert(record) => encode_record(record, &mut body, limits)?,
        Message::Delete(id) => write_bounded_str(&mut body, id.as_str(), limits)?,
        Message::CellClaim { record, cell } => {
            write_bounded_str(&mut body, record.as_str(), limits)?;
            encode_cell(*cell, &mut body);
        }
        Message::CellUnclaim(cell) => encode_cell(*cell, &mut body),
        Message::RequestSnapshot => {}
    }
    let written = encode_frame(message.tag(), &body.finish(), wire_limits, out)?;
    Ok(written)
}

/// Decodes one framed message.
///
/// The frame is validated against `wire_limits`, the body against `limits`.
/// A body with bytes left over after its message is rejected.
pub fn decode_message(
    bytes: &[u8],
    limits: &CodecLimits,
    wire_limits: &wire::Limits,
) -> CodecResult<Message> {
    let frame = decode_frame(bytes, wire_limits)?;
    let mut reader = ByteReader::new(frame.body);
    let message = match frame.tag {
        MessageTag::Snapshot => Message::Snapshot(decode_records(&mut reader, limits)?),
        MessageTag::Upsert => Message::Upsert(decode_record(&mut reader, limits)?),
        MessageTag::Delete => {
            Message::Delete(RecordId::new(reader.read_str(limits.max_string_bytes)?))
        }
        MessageTag::CellClaim => {
            let record = RecordId::new(reader.read_str(limits.max_string_bytes)?);
            let cell = decode_cell(&mut reader)?;
            Message::CellClaim { record, cell }
        }
        MessageTag::CellUnclaim => Message::CellUnclaim(decode_cell(&mut reader)?),
        MessageTag::RequestSnapshot => Message::RequestSnapshot,
    };

    if !reader.is_empty() {
        return Err(CodecError::TrailingBytes {
            tag: frame.tag,
            remaining: reader.bytes_remaining(),
        });
    }
    Ok(message)
}
