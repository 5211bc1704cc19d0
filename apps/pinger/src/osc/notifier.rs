use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use tokio::net::UdpSocket;
use tracing::{debug, warn};

use super::message::status_messages;
use crate::error::ConfigError;
use crate::monitoring::types::ProbeOutcome;

/// Where status messages go. Every address shares the same UDP port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerSet {
    addresses: Vec<IpAddr>,
    port: u16,
}

impl ListenerSet {
    pub fn new(addresses: Vec<IpAddr>, port: u16) -> Result<Self, ConfigError> {
        if addresses.is_empty() {
            return Err(ConfigError::NoListeners);
        }
        if port == 0 {
            return Err(ConfigError::PortOutOfRange(0));
        }

        Ok(Self { addresses, port })
    }

    pub fn addresses(&self) -> &[IpAddr] {
        &self.addresses
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn endpoints(&self) -> impl Iterator<Item = SocketAddr> + '_ {
        self.addresses.iter().map(|ip| SocketAddr::new(*ip, self.port))
    }

    /// True when any IPv4 listener looks like a broadcast address.
    pub fn needs_broadcast(&self) -> bool {
        self.addresses.iter().any(|ip| match ip {
            IpAddr::V4(v4) => is_broadcast_candidate(*v4),
            IpAddr::V6(_) => false,
        })
    }
}

/// Without the netmask a subnet broadcast can't be told apart from a host,
/// so any all-ones octet counts.
fn is_broadcast_candidate(ip: Ipv4Addr) -> bool {
    ip.octets().contains(&255)
}

/// Counts of datagrams handed to the socket for one outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    pub sent: usize,
    pub failed: usize,
}

/// Sends status messages to every listener over UDP.
pub struct StatusNotifier {
    v4: Option<UdpSocket>,
    v6: Option<UdpSocket>,
    listeners: Vec<SocketAddr>,
}

impl StatusNotifier {
    /// Open one socket per address family in use. Broadcast mode is set here,
    /// once, before anything is sent.
    pub async fn bind(listeners: &ListenerSet) -> io::Result<Self> {
        let has_v4 = listeners.addresses().iter().any(IpAddr::is_ipv4);
        let has_v6 = listeners.addresses().iter().any(IpAddr::is_ipv6);

        let v4 = if has_v4 {
            let socket = UdpSocket::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))).await?;
            if listeners.needs_broadcast() {
                socket.set_broadcast(true)?;
                debug!("Broadcast enabled on status socket");
            }
            Some(socket)
        } else {
            None
        };

        let v6 = if has_v6 {
            Some(UdpSocket::bind(SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))).await?)
        } else {
            None
        };

        Ok(Self { v4, v6, listeners: listeners.endpoints().collect() })
    }

    /// Wrap an already bound IPv4 socket as-is, skipping broadcast setup.
    #[cfg(test)]
    fn with_v4_socket(socket: UdpSocket, listeners: &ListenerSet) -> Self {
        Self { v4: Some(socket), v6: None, listeners: listeners.endpoints().collect() }
    }

    pub fn broadcast_enabled(&self) -> io::Result<bool> {
        self.v4.as_ref().map_or(Ok(false), UdpSocket::broadcast)
    }

    /// Send the status messages for `outcome` to every listener, in order.
    ///
    /// A failed send is logged and counted; remaining sends still go out.
    pub async fn notify(&self, outcome: &ProbeOutcome) -> Delivery {
        let packets: Vec<_> = status_messages(outcome)
            .into_iter()
            .map(|m| {
                let packet = m.encode();
                (m.address().to_string(), packet)
            })
            .collect();
        let mut delivery = Delivery::default();

        for listener in &self.listeners {
            let socket = match listener {
                SocketAddr::V4(_) => self.v4.as_ref(),
                SocketAddr::V6(_) => self.v6.as_ref(),
            };
            let Some(socket) = socket else {
                delivery.failed += packets.len();
                continue;
            };

            for (address, packet) in &packets {
                match socket.send_to(packet, *listener).await {
                    Ok(_) => {
                        debug!(%listener, %address, "Sent status message");
                        delivery.sent += 1;
                    }
                    Err(e) => {
                        warn!(%listener, %address, "Failed to send status message: {e}");
                        delivery.failed += 1;
                    }
                }
            }
        }

        delivery
    }
}
