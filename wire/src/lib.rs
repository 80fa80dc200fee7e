//! Message framing and transport boundary for the claimsync protocol.
//!
//! This crate handles the binary frame around every protocol message: a
//! version byte, a message tag and a length-prefixed body. It does not know
//! about records or cells, only the structure of frames and how they reach
//! their recipients.
//!
//! # Design Principles
//!
//! - **Versioned frames** - Every frame starts with [`VERSION`].
//! - **Bounded decoding** - Length fields are validated against [`Limits`] before use.
//! - **Isolated delivery** - A [`TransportError`] always names exactly one recipient.

mod error;
mod frame;
mod header;
mod limits;
mod transport;

pub use error::{DecodeError, EncodeError, LimitKind, TransportError, WireResult};
pub use frame::{decode_frame, encode_frame, WireFrame};
pub use header::{Direction, MessageTag, MAX_HEADER_SIZE, MIN_FRAME_SIZE, VERSION};
pub use limits::Limits;
pub use transport::{ChannelTransport, ChannelUplink, SinkEndpoint, SinkId, Transport, Uplink};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        // Verify all expected items are exported
        let _ = VERSION;
        let _ = MIN_FRAME_SIZE;
        let _ = MAX_HEADER_SIZE;
        let _ = Limits::default();
        let _ = MessageTag::Snapshot;
        let _ = Direction::SourceToSink;
        let _ = SinkId(0);

        // Error types
        let _: WireResult<()> = Ok(());
    }

    #[test]
    fn limits_default_is_reasonable() {
        let limits = Limits::default();
        assert!(
            limits.max_frame_bytes >= 64 * 1024,
            "should allow snapshots of a few thousand cells"
        );
        assert!(limits.max_body_bytes + MAX_HEADER_SIZE <= limits.max_frame_bytes);
    }

    #[test]
    fn frame_over_channel_transport() {
        let mut transport = ChannelTransport::new();
        let endpoint = transport.connect(SinkId(1));

        let mut bytes = Vec::new();
        encode_frame(MessageTag::CellUnclaim, &[0, 0], &Limits::default(), &mut bytes).unwrap();
        transport.send(SinkId(1), &bytes).unwrap();

        let received = endpoint.inbound.try_recv().unwrap();
        let frame = decode_frame(&received, &Limits::default()).unwrap();
        assert_eq!(frame.tag, MessageTag::CellUnclaim);
        assert_eq!(frame.body, &[0, 0]);
    }
}
