//! Frame encoding and decoding.

use bytestream::{ByteReader, ByteWriter, StreamError};

use crate::error::{DecodeError, EncodeError, LimitKind, WireResult};
use crate::header::{MessageTag, MIN_FRAME_SIZE, VERSION};
use crate::limits::Limits;

/// A decoded frame: the message tag plus a borrowed body slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireFrame<'a> {
    pub tag: MessageTag,
    pub body: &'a [u8],
}

/// Decodes one frame, validating header and exact length.
///
/// Truncated bodies and trailing bytes after the body are both rejected so a
/// frame never silently absorbs or loses data.
pub fn decode_frame<'a>(buf: &'a [u8], limits: &Limits) -> WireResult<WireFrame<'a>> {
    if buf.len() < MIN_FRAME_SIZE {
        return Err(DecodeError::FrameTooSmall {
            actual: buf.len(),
            required: MIN_FRAME_SIZE,
        });
    }
    if buf.len() > limits.max_frame_bytes {
        return Err(DecodeError::LimitsExceeded {
            kind: LimitKind::FrameBytes,
            limit: limits.max_frame_bytes,
            actual: buf.len(),
        });
    }

    let version = buf[0];
    if version != VERSION {
        return Err(DecodeError::UnsupportedVersion { found: version });
    }
    let tag = MessageTag::parse(buf[1])?;

    let mut reader = ByteReader::new(&buf[2..]);
    let body_len = reader.read_varu32().map_err(|err| match err {
        StreamError::UnexpectedEof { .. } => DecodeError::FrameTooSmall {
            actual: buf.len(),
            required: buf.len() + 1,
        },
        _ => DecodeError::InvalidLength,
    })?;
    let body_len_usize = body_len as usize;
    if body_len_usize > limits.max_body_bytes {
        return Err(DecodeError::LimitsExceeded {
            kind: LimitKind::BodyBytes,
            limit: limits.max_body_bytes,
            actual: body_len_usize,
        });
    }

    let body_start = 2 + reader.position();
    let actual_len = buf.len() - body_start;
    if actual_len != body_len_usize {
        return Err(DecodeError::BodyLengthMismatch {
            header_len: body_len,
            actual_len,
        });
    }

    Ok(WireFrame {
        tag,
        body: &buf[body_start..],
    })
}

/// Appends one frame carrying `body` to `out`. Returns the bytes written.
///
/// The frame is checked against the same `limits` [`decode_frame`] enforces,
/// so a frame that encodes is one a peer with equal limits accepts. Nothing
/// is written on error.
pub fn encode_frame(
    tag: MessageTag,
    body: &[u8],
    limits: &Limits,
    out: &mut Vec<u8>,
) -> Result<usize, EncodeError> {
    let len_u32 = u32::try_from(body.len())
        .map_err(|_| EncodeError::LengthOverflow { length: body.len() })?;
    if body.len() > limits.max_body_bytes {
        return Err(EncodeError::LimitsExceeded {
            kind: LimitKind::BodyBytes,
            limit: limits.max_body_bytes,
            actual: body.len(),
        });
    }
    let frame_len = 2 + bytestream::varu32_len(len_u32) + body.len();
    if frame_len > limits.max_frame_bytes {
        return Err(EncodeError::LimitsExceeded {
            kind: LimitKind::FrameBytes,
            limit: limits.max_frame_bytes,
            actual: frame_len,
        });
    }

    let mut writer = ByteWriter::with_capacity(frame_len);
    writer.write_u8(VERSION);
    writer.write_u8(tag.raw());
    writer.write_varu32(len_u32);
    writer.write_bytes(body);

    let written = writer.len();
    writer.finish_into(out);
    Ok(written)
}
