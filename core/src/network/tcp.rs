//! TCP-connect reachability probing.
//!
//! A host counts as reachable when any of the configured ports accepts a
//! connection before the deadline. A refused connection and a silent timeout
//! both end up as unreachable.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use beacon_common::network::host::ProbeResult;
use tokio::net::TcpStream;
use tokio::task::JoinSet;
use tokio::time::timeout;

/// Checks whether a single address answers on the network.
///
/// Implementations must never block past `deadline` and must not share
/// mutable state between probes of different addresses.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, addr: Ipv4Addr, deadline: Duration) -> ProbeResult;
}

#[derive(Debug, Clone)]
pub struct TcpProber {
    ports: Vec<u16>,
}

impl TcpProber {
    pub fn new(ports: Vec<u16>) -> Self {
        Self { ports }
    }

    pub fn ports(&self) -> &[u16] {
        &self.ports
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, addr: Ipv4Addr, deadline: Duration) -> ProbeResult {
        if connect_probe(addr, &self.ports, deadline).await {
            ProbeResult::reachable(addr)
        } else {
            ProbeResult::unreachable(addr)
        }
    }
}

/// Knocks on every port at once; the first accepted connection wins.
pub async fn connect_probe(addr: Ipv4Addr, ports: &[u16], deadline: Duration) -> bool {
    let mut attempts: JoinSet<bool> = JoinSet::new();
    for &port in ports {
        let socket_addr = SocketAddr::new(addr.into(), port);
        attempts.spawn(async move { TcpStream::connect(socket_addr).await.is_ok() });
    }

    let first_accept = async {
        while let Some(joined) = attempts.join_next().await {
            if let Ok(true) = joined {
                return true;
            }
        }
        false
    };

    timeout(deadline, first_accept).await.unwrap_or(false)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
