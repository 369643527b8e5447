//! # Scan Target Model
//!
//! Defines the possible inputs for a scan.
//!
//! A target can be:
//! * The local LAN (the /24 around this host, detected automatically).
//! * A single IPv4 address (host).
//! * An IPv4 Range (e.g., `192.168.1.1-100`).
//! * A CIDR block (e.g., `192.168.1.0/24`).
//! * A start address and a count (e.g., `10.0.1.0+8`).

use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::{BeaconError, Result};
use crate::network::range::{self, AddressRange, Ipv4Range};

/// Represents a distinct target to be scanned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// Scan the subnet this host lives on.
    LAN,
    /// Scan a single specific host.
    Host { target_addr: Ipv4Addr },
    /// Scan a range of IPv4 addresses.
    Range { ipv4_range: Ipv4Range },
}

impl FromStr for Target {
    type Err = String;

    /// Parses a string into a `Target`.
    ///
    /// Supported formats:
    /// * **Keyword**: "lan" (case-insensitive).
    /// * **Host**: Single IPv4 address (e.g., "192.168.1.5").
    /// * **Range**: "Start-End" (e.g., "192.168.1.1-50", "192.168.1.1-192.168.1.50").
    /// * **CIDR**: "Network/Prefix" (e.g., "192.168.1.0/24").
    /// * **Count**: "Start+Count" (e.g., "10.0.1.0+8").
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();

        if s.eq_ignore_ascii_case("lan") {
            return Ok(Target::LAN);
        }

        if let Some(target) = parse_host(s) {
            return Ok(target);
        }

        if let Some(target) = parse_ip_range(s)? {
            return Ok(target);
        }

        if let Some(target) = parse_cidr_range(s)? {
            return Ok(target);
        }

        if let Some(target) = parse_counted_range(s)? {
            return Ok(target);
        }

        Err(format!("invalid target: {s}"))
    }
}

impl Target {
    /// Converts the target into a scan range; `None` stands for the local subnet.
    pub fn to_range(&self) -> Result<Option<AddressRange>> {
        match self {
            Target::LAN => Ok(None),
            Target::Host { target_addr } => AddressRange::new(*target_addr, 1).map(Some),
            Target::Range { ipv4_range } => {
                if ipv4_range.is_empty() {
                    return Err(BeaconError::InvalidTarget {
                        input: format!("{}-{}", ipv4_range.start_addr, ipv4_range.end_addr),
                        reason: "range ends before it starts".to_string(),
                    });
                }
                AddressRange::try_from(*ipv4_range).map(Some)
            }
        }
    }
}

/// Parses a single IP address.
fn parse_host(s: &str) -> Option<Target> {
    s.parse::<Ipv4Addr>()
        .ok()
        .map(|target_addr| Target::Host { target_addr })
}

/// Parses a range string like "1.1.1.1-2.2.2.2" or "1.1.1.1-50".
fn parse_ip_range(s: &str) -> std::result::Result<Option<Target>, String> {
    let Some((start_str, end_str)) = s.split_once('-') else {
        return Ok(None);
    };

    let start_addr = start_str
        .parse::<Ipv4Addr>()
        .map_err(|e| format!("Invalid start IP in range '{start_str}': {e}"))?;

    let end_addr = parse_range_end_addr(end_str, &start_addr, s)?;

    let ipv4_range = Ipv4Range::new(start_addr, end_addr);
    Ok(Some(Target::Range { ipv4_range }))
}

/// Helper to parse the end address of a range.
///
/// Handles abbreviated forms like "192.168.1.1-50" (implies 192.168.1.50)
/// and full forms like "192.168.1.1-192.168.1.255".
fn parse_range_end_addr(
    end_str: &str,
    start_addr: &Ipv4Addr,
    original_s: &str,
) -> std::result::Result<Ipv4Addr, String> {
    if let Ok(full_addr) = end_str.parse::<Ipv4Addr>() {
        return Ok(full_addr);
    }

    if end_str.is_empty() {
        return Err(format!("End range cannot be empty: {original_s}"));
    }

    let mut end_octets = start_addr.octets();
    let partial_octets: Vec<u8> = end_str
        .split('.')
        .map(|octet_str| octet_str.parse::<u8>())
        .collect::<std::result::Result<Vec<u8>, _>>()
        .map_err(|e| format!("Invalid end range '{end_str}': {e}"))?;

    if partial_octets.len() > 4 {
        return Err(format!("End range has too many octets: {end_str}"));
    }

    let start_index = 4 - partial_octets.len();
    end_octets[start_index..].copy_from_slice(&partial_octets);

    Ok(Ipv4Addr::from(end_octets))
}

/// Parses CIDR notation like "192.168.1.0/24".
fn parse_cidr_range(s: &str) -> std::result::Result<Option<Target>, String> {
    let Some((ip_str, prefix_str)) = s.split_once('/') else {
        return Ok(None);
    };

    let ipv4_addr = ip_str
        .parse::<Ipv4Addr>()
        .map_err(|e| format!("Invalid IP in CIDR '{ip_str}': {e}"))?;

    let prefix = prefix_str
        .parse::<u8>()
        .map_err(|e| format!("Invalid prefix in CIDR '{prefix_str}': {e}"))?;

    let ipv4_range = range::cidr_range(ipv4_addr, prefix).map_err(|e| e.to_string())?;

    Ok(Some(Target::Range { ipv4_range }))
}

/// Parses "10.0.1.0+8", i.e. eight addresses starting at `10.0.1.0`.
fn parse_counted_range(s: &str) -> std::result::Result<Option<Target>, String> {
    let Some((ip_str, count_str)) = s.split_once('+') else {
        return Ok(None);
    };

    let start_addr = ip_str
        .parse::<Ipv4Addr>()
        .map_err(|e| format!("Invalid start IP '{ip_str}': {e}"))?;

    let count = count_str
        .parse::<u32>()
        .map_err(|e| format!("Invalid address count '{count_str}': {e}"))?;

    let range = AddressRange::new(start_addr, count).map_err(|e| e.to_string())?;

    Ok(Some(Target::Range {
        ipv4_range: Ipv4Range::from(range),
    }))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
