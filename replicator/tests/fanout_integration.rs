use codec::{decode_message, CellPos, CodecLimits, Message, WireLimits};
use replicator::{AuthoritativeStore, FactionStore, Formatting, SourceReplicator};
use wire::{ChannelTransport, SinkEndpoint, SinkId, Uplink};

fn decode_all(endpoint: &SinkEndpoint) -> Vec<Message> {
    endpoint
        .inbound
        .try_iter()
        .map(|bytes| {
            decode_message(&bytes, &CodecLimits::default(), &WireLimits::default()).unwrap()
        })
        .collect()
}

#[test]
fn store_mutations_reach_all_sinks_in_order() {
    let mut store = FactionStore::new();
    let mut replicator = SourceReplicator::new(ChannelTransport::new());
    let a = replicator.transport_mut().connect(SinkId(1));
    let b = replicator.transport_mut().connect(SinkId(2));
    replicator.on_sink_connected(SinkId(1), &store).unwrap();
    replicator.on_sink_connected(SinkId(2), &store).unwrap();

    let (red, events) = store.create("red", Some(Formatting::Red)).unwrap();
    replicator.handle_store_events(&events).unwrap();
    let events = store.claim(&red, CellPos::new(0, 0)).unwrap();
    replicator.handle_store_events(&events).unwrap();
    let events = store.remove(&red).unwrap();
    replicator.handle_store_events(&events).unwrap();

    for endpoint in [&a, &b] {
        let messages = decode_all(endpoint);
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0], Message::Snapshot(Vec::new()));
        assert!(matches!(messages[1], Message::Upsert(_)));
        assert!(matches!(messages[2], Message::CellClaim { .. }));
        assert_eq!(messages[3], Message::Delete(red.clone()));
    }
}

#[test]
fn uplink_request_gets_current_state() {
    let mut store = FactionStore::new();
    let mut replicator = SourceReplicator::new(ChannelTransport::new());
    let mut endpoint = replicator.transport_mut().connect(SinkId(7));
    replicator.on_sink_connected(SinkId(7), &store).unwrap();

    let (id, _) = store.create("blue", None).unwrap();
    store.claim(&id, CellPos::new(5, 5)).unwrap();

    let request = codec::encode_message(
        &Message::RequestSnapshot,
        &codec::CodecLimits::default(),
        &wire::Limits::default(),
    )
    .unwrap();
    endpoint.uplink.send_to_source(&request).unwrap();
    for (from, bytes) in replicator.transport().drain_uplink() {
        replicator.handle_sink_message(from, &bytes, &store);
    }

    let messages = decode_all(&endpoint);
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1], Message::Snapshot(store.list_records()));
}

#[test]
fn closed_channel_is_isolated() {
    let store = FactionStore::new();
    let mut replicator = SourceReplicator::new(ChannelTransport::new());
    let live = replicator.transport_mut().connect(SinkId(1));
    let dead = replicator.transport_mut().connect(SinkId(2));
    replicator.on_sink_connected(SinkId(1), &store).unwrap();
    replicator.on_sink_connected(SinkId(2), &store).unwrap();
    drop(dead);

    let report = replicator
        .on_cell_unclaimed(CellPos::new(0, 0))
        .unwrap();
    assert_eq!(report.delivered, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].sink(), SinkId(2));
    assert_eq!(decode_all(&live).len(), 2);
}
