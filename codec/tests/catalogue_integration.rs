//! Message catalogue behaviour at the public API boundary.

use codec::{
    decode_message, encode_message, CellPos, ClaimedAreaRecord, CodecError, CodecLimits,
    LimitKind, Message, RecordId, Rgb, WireLimits,
};
use wire::{encode_frame, DecodeError, MessageTag};

fn encode(message: &Message) -> Vec<u8> {
    encode_message(message, &CodecLimits::unlimited(), &WireLimits::unlimited()).unwrap()
}

fn example_snapshot() -> Message {
    Message::Snapshot(vec![
        ClaimedAreaRecord::new("a1", "red").with_cells([(0, 0), (0, 1)]),
        ClaimedAreaRecord::new("a2", "blue").with_cells([(5, 5)]),
    ])
}

#[test]
fn snapshot_with_two_records_roundtrips_in_order() {
    let message = example_snapshot();
    let bytes = encode(&message);
    let decoded = decode_message(&bytes, &CodecLimits::default(), &WireLimits::default()).unwrap();
    let Message::Snapshot(records) = decoded else {
        panic!("expected snapshot");
    };
    assert_eq!(records[0].id, RecordId::from("a1"));
    assert_eq!(records[1].id, RecordId::from("a2"));
    assert_eq!(records[1].claimed_cells.len(), 1);
}

#[test]
fn snapshot_record_limit_applies() {
    let records = (0..33)
        .map(|i| ClaimedAreaRecord::new(format!("r{i}"), "n"))
        .collect();
    let bytes = encode(&Message::Snapshot(records));
    let err =
        decode_message(&bytes, &CodecLimits::for_testing(), &WireLimits::default()).unwrap_err();
    assert!(matches!(
        err,
        CodecError::LimitsExceeded {
            kind: LimitKind::RecordsPerSnapshot,
            ..
        }
    ));
}

#[test]
fn wire_body_limit_applies_before_parsing() {
    let record = ClaimedAreaRecord::new("big", "big").with_cells((0..2000).map(|x| (x, 0)));
    let bytes = encode(&Message::Upsert(record));
    let err =
        decode_message(&bytes, &CodecLimits::unlimited(), &WireLimits::for_testing()).unwrap_err();
    assert!(matches!(
        err,
        CodecError::Wire(DecodeError::LimitsExceeded { .. })
    ));
}

#[test]
fn empty_body_for_record_message_is_eof() {
    let mut bytes = Vec::new();
    encode_frame(MessageTag::Upsert, &[], &WireLimits::default(), &mut bytes).unwrap();
    let err = decode_message(&bytes, &CodecLimits::default(), &WireLimits::default()).unwrap_err();
    assert!(matches!(err, CodecError::Stream(_)));
}

#[test]
fn request_snapshot_with_body_is_rejected() {
    let mut bytes = Vec::new();
    encode_frame(MessageTag::RequestSnapshot, &[0], &WireLimits::default(), &mut bytes).unwrap();
    let err = decode_message(&bytes, &CodecLimits::default(), &WireLimits::default()).unwrap_err();
    assert_eq!(
        err,
        CodecError::TrailingBytes {
            tag: MessageTag::RequestSnapshot,
            remaining: 1
        }
    );
}

#[test]
fn upsert_carries_every_field() {
    let record = ClaimedAreaRecord::new("f-17", "warzone")
        .with_display_name("\u{a7}4warzone")
        .with_category(codec::Category::Contested)
        .with_color(Some(Rgb::new(255, 0, 0)))
        .with_cells([(-1, -1), (1_000_000, -1_000_000)]);
    let bytes = encode(&Message::Upsert(record.clone()));
    let decoded = decode_message(&bytes, &CodecLimits::default(), &WireLimits::default()).unwrap();
    assert_eq!(decoded, Message::Upsert(record));
}

#[test]
fn small_coordinates_encode_compactly() {
    let near = encode(&Message::CellUnclaim(CellPos::new(-3, 5)));
    let far = encode(&Message::CellUnclaim(CellPos::new(-3_000_000, 5_000_000)));
    assert_eq!(near.len(), 5);
    assert!(far.len() > near.len());
}

#[test]
fn snapshot_limit_applies_on_encode() {
    let records: Vec<_> = (0..33)
        .map(|i| ClaimedAreaRecord::new(format!("r{i}"), "n"))
        .collect();
    let err = encode_message(
        &Message::Snapshot(records),
        &CodecLimits::for_testing(),
        &WireLimits::default(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        CodecError::LimitsExceeded {
            kind: LimitKind::RecordsPerSnapshot,
            limit: 32,
            actual: 33,
        }
    );
}

#[test]
fn oversized_snapshot_is_refused_by_encoder_not_peer() {
    // Every record is within the codec limits; only the aggregate is too big.
    let records: Vec<_> = (0..20)
        .map(|i| {
            ClaimedAreaRecord::new(format!("f{i}"), "n").with_cells((0..200).map(|c| (i, c)))
        })
        .collect();
    let limits = CodecLimits::for_testing();
    let err = encode_message(&Message::Snapshot(records), &limits, &WireLimits::for_testing())
        .unwrap_err();
    assert!(matches!(
        err,
        CodecError::Encode(wire::EncodeError::LimitsExceeded {
            kind: wire::LimitKind::BodyBytes,
            ..
        })
    ));
}
