use wire::{ChannelTransport, SinkId, Transport, TransportError};

/// A [`ChannelTransport`] that loses every n-th delivery to one sink.
#[derive(Debug)]
pub struct FaultyTransport {
    channels: ChannelTransport,
    faulty: Option<SinkId>,
    fail_every: u32,
    attempts: u64,
    dropped: u64,
}

impl FaultyTransport {
    #[must_use]
    pub fn new(channels: ChannelTransport, faulty: Option<SinkId>, fail_every: u32) -> Self {
        Self {
            channels,
            faulty,
            fail_every: fail_every.max(1),
            attempts: 0,
            dropped: 0,
        }
    }

    #[must_use]
    pub const fn channels(&self) -> &ChannelTransport {
        &self.channels
    }

    pub fn channels_mut(&mut self) -> &mut ChannelTransport {
        &mut self.channels
    }

    #[must_use]
    pub const fn faulty(&self) -> Option<SinkId> {
        self.faulty
    }

    /// Stops losing deliveries.
    pub fn heal(&mut self) {
        self.faulty = None;
    }

    /// Deliveries lost so far.
    #[must_use]
    pub const fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl Transport for FaultyTransport {
    fn send(&mut self, sink: SinkId, bytes: &[u8]) -> Result<(), TransportError> {
        if self.faulty == Some(sink) {
            self.attempts += 1;
            if self.attempts % u64::from(self.fail_every) == 0 {
                self.dropped += 1;
                return Err(TransportError::Rejected {
                    sink,
                    reason: "simulated loss".to_string(),
                });
            }
        }
        self.channels.send(sink, bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loses_every_nth_delivery_to_faulty_sink_only() {
        let mut channels = ChannelTransport::new();
        let healthy = channels.connect(SinkId(0));
        let faulty = channels.connect(SinkId(1));
        let mut transport = FaultyTransport::new(channels, Some(SinkId(1)), 2);

        for _ in 0..4 {
            transport.send(SinkId(0), b"x").unwrap();
        }
        let results: Vec<_> = (0..4).map(|_| transport.send(SinkId(1), b"y").is_ok()).collect();

        assert_eq!(results, [true, false, true, false]);
        assert_eq!(transport.dropped(), 2);
        assert_eq!(healthy.inbound.try_iter().count(), 4);
        assert_eq!(faulty.inbound.try_iter().count(), 2);
    }

    #[test]
    fn heal_restores_delivery() {
        let mut channels = ChannelTransport::new();
        let endpoint = channels.connect(SinkId(3));
        let mut transport = FaultyTransport::new(channels, Some(SinkId(3)), 1);
        assert!(transport.send(SinkId(3), b"a").is_err());
        transport.heal();
        transport.send(SinkId(3), b"b").unwrap();
        assert_eq!(endpoint.inbound.try_iter().collect::<Vec<_>>(), vec![b"b".to_vec()]);
    }
}
