use pnet::datalink::NetworkInterface;
use pnet::ipnetwork::{IpNetwork, Ipv4Network};

/// IPv4 views of a datalink interface.
pub trait InterfaceAddressing {
    fn ipv4_networks(&self) -> impl Iterator<Item = Ipv4Network> + '_;

    /// The network this interface would scan: private before public, never loopback.
    fn lan_network(&self) -> Option<Ipv4Network> {
        let usable = |net: &Ipv4Network| !net.ip().is_loopback();
        self.ipv4_networks()
            .filter(usable)
            .find(|net| net.ip().is_private())
            .or_else(|| self.ipv4_networks().find(usable))
    }
}

impl InterfaceAddressing for NetworkInterface {
    fn ipv4_networks(&self) -> impl Iterator<Item = Ipv4Network> + '_ {
        self.ips.iter().filter_map(|net| match net {
            IpNetwork::V4(v4) => Some(*v4),
            IpNetwork::V6(_) => None,
        })
    }
}
