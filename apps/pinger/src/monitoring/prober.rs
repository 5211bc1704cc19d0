use std::io;
use std::net::IpAddr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;

use surge_ping::{Client, Config, ICMP, PingIdentifier, PingSequence, SurgeError};
use thiserror::Error;
use tracing::warn;

/// Echo payload sent with every probe. Small enough to never fragment.
pub const PROBE_PAYLOAD: [u8; 32] = [b'a'; 32];

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("no reply within {0:?}")]
    Timeout(Duration),
    #[error("probe failed: {0}")]
    Failed(String),
}

/// A liveness check against a single address.
///
/// Network failures are returned as [`ProbeError`] and never panic.
#[async_trait::async_trait]
pub trait Prober: Send + Sync {
    /// Probe `address`, returning the measured round-trip time.
    async fn probe(&self, address: IpAddr, timeout: Duration) -> Result<Duration, ProbeError>;
}

/// ICMP echo prober
///
/// Unprivileged (datagram) ICMP sockets match replies on address and
/// sequence number only, so every probe takes its own sequence number.
pub struct IcmpProber {
    v4: Client,
    v6: Option<Client>,
    sequence: AtomicU16,
}

impl IcmpProber {
    /// Open the ICMP sockets. Fails when the process may not open an IPv4
    /// ICMP socket; a missing IPv6 stack only disables IPv6 targets.
    pub fn new() -> io::Result<Self> {
        let v4 = Client::new(&Config::default())?;
        let v6 = Client::new(&Config::builder().kind(ICMP::V6).build())
            .inspect_err(|e| warn!("IPv6 ICMP unavailable, IPv6 targets will report unreachable: {e}"))
            .ok();

        Ok(Self { v4, v6, sequence: AtomicU16::new(0) })
    }

    fn next_sequence(&self) -> PingSequence {
        PingSequence(self.sequence.fetch_add(1, Ordering::Relaxed))
    }

    fn client_for(&self, address: IpAddr) -> Option<&Client> {
        match address {
            IpAddr::V4(_) => Some(&self.v4),
            IpAddr::V6(_) => self.v6.as_ref(),
        }
    }
}

#[async_trait::async_trait]
impl Prober for IcmpProber {
    async fn probe(&self, address: IpAddr, timeout: Duration) -> Result<Duration, ProbeError> {
        let client = self
            .client_for(address)
            .ok_or_else(|| ProbeError::Failed("no ICMP socket for address family".into()))?;

        let mut pinger = client.pinger(address, PingIdentifier(rand::random())).await;
        pinger.timeout(timeout);

        match pinger.ping(self.next_sequence(), &PROBE_PAYLOAD).await {
            Ok((_packet, rtt)) => Ok(rtt),
            Err(SurgeError::Timeout { .. }) => Err(ProbeError::Timeout(timeout)),
            Err(e) => Err(ProbeError::Failed(e.to_string())),
        }
    }
}
