#![no_main]

use std::time::{Duration, Instant};

use libfuzzer_sys::fuzz_target;
use mirror::{SessionConfig, SinkSession};
use wire::{ChannelTransport, SinkId};

fuzz_target!(|data: &[u8]| {
    let mut channels = ChannelTransport::new();
    let mut endpoint = channels.connect(SinkId(0));
    let mut session = SinkSession::new(SessionConfig::for_testing());
    let start = Instant::now();
    let _ = session.on_connected(start, &mut endpoint.uplink);

    let mut idx = 0usize;
    let mut tick = 0u64;
    while idx < data.len() && idx < 4096 {
        let len = (data[idx] as usize % 120).saturating_add(1);
        idx += 1;
        let end = (idx + len).min(data.len());
        let frame = &data[idx..end];
        idx = end;

        let _ = session.on_payload(frame);
        tick += 1;
        session.poll(start + Duration::from_millis(tick * 100), &mut endpoint.uplink);
        assert!(session.registry().is_consistent());
    }
    let _ = channels.drain_uplink();
});
