use std::net::{IpAddr, Ipv4Addr, UdpSocket};

use pnet::datalink::{self, NetworkInterface};
#[cfg(target_os = "linux")]
use linux_impl::{is_physical, is_wireless};
#[cfg(not(target_os = "linux"))]
use fallback_impl::{is_physical, is_wireless};

use crate::error::{BeaconError, Result};
use crate::utils::interface::InterfaceAddressing;

/// Address used only to ask the kernel which source IP it would route through.
const ROUTE_PROBE_TARGET: Ipv4Addr = Ipv4Addr::new(8, 8, 8, 8);

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ViabilityError {
    /// The interface is operationally down.
    IsDown,
    /// Loopback cannot reach anything on the LAN.
    IsLoopback,
    /// The interface is a point-to-point link (e.g., a VPN).
    IsPointToPoint,
    /// The interface carries no usable IPv4 address.
    NoIpv4,
}

/// Finds the IPv4 address of this host on its primary LAN.
///
/// Interfaces are inspected first; if none qualifies, the kernel's routing
/// decision for an outbound datagram is used instead.
pub fn local_ipv4() -> Result<Ipv4Addr> {
    let interfaces: Vec<NetworkInterface> = datalink::interfaces()
        .into_iter()
        .filter(|interface| is_viable_lan_interface(interface).is_ok())
        .collect();

    if let Some(net) = select_best_lan_interface(interfaces, is_wired)
        .and_then(|interface| interface.lan_network())
    {
        return Ok(net.ip());
    }

    match resolve_route_source_ip(ROUTE_PROBE_TARGET) {
        Some(IpAddr::V4(ip)) if !ip.is_loopback() && !ip.is_unspecified() => Ok(ip),
        _ => Err(BeaconError::NoLocalAddress),
    }
}

fn is_viable_lan_interface(interface: &NetworkInterface) -> std::result::Result<(), ViabilityError> {
    if !interface.is_up() {
        return Err(ViabilityError::IsDown);
    }
    if interface.is_loopback() {
        return Err(ViabilityError::IsLoopback);
    }
    if interface.is_point_to_point() {
        return Err(ViabilityError::IsPointToPoint);
    }
    if interface.lan_network().is_none() {
        return Err(ViabilityError::NoIpv4);
    }
    Ok(())
}

fn select_best_lan_interface(
    interfaces: Vec<NetworkInterface>,
    is_wired: impl Fn(&NetworkInterface) -> bool,
) -> Option<NetworkInterface> {
    match interfaces.len() {
        0 => None,
        1 => interfaces.into_iter().next(),
        _ => interfaces
            .iter()
            .find(|&interface| is_wired(interface))
            .or(interfaces.first())
            .cloned(),
    }
}

fn resolve_route_source_ip(target: Ipv4Addr) -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect((target, 53)).ok()?;
    socket.local_addr().ok().map(|s| s.ip())
}

fn is_wired(interface: &NetworkInterface) -> bool {
    is_physical(interface) && !is_wireless(interface)
}

#[cfg(target_os = "linux")]
mod linux_impl {
    use super::*;
    use std::path::Path;

    pub fn is_physical(interface: &NetworkInterface) -> bool {
        Path::new(&format!("/sys/class/net/{}/device", interface.name)).exists()
    }

    pub fn is_wireless(interface: &NetworkInterface) -> bool {
        Path::new(&format!("/sys/class/net/{}/wireless", interface.name)).exists()
    }
}

#[cfg(not(target_os = "linux"))]
mod fallback_impl {
    use super::*;

    pub fn is_physical(interface: &NetworkInterface) -> bool {
        interface.mac.is_some()
    }

    pub fn is_wireless(interface: &NetworkInterface) -> bool {
        interface.name.starts_with("wl")
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
