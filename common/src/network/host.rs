use std::net::Ipv4Addr;

/// Outcome of probing a single address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProbeResult {
    pub addr: Ipv4Addr,
    pub reachable: bool,
    pub hostname: Option<String>,
}

impl ProbeResult {
    pub fn reachable(addr: Ipv4Addr) -> Self {
        Self {
            addr,
            reachable: true,
            hostname: None,
        }
    }

    pub fn unreachable(addr: Ipv4Addr) -> Self {
        Self {
            addr,
            reachable: false,
            hostname: None,
        }
    }

    pub fn with_hostname(self, hostname: Option<String>) -> Self {
        Self { hostname, ..self }
    }
}
