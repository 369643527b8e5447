//! Conversions between dotted IPv4 addresses and their 32-bit integer form.

use std::net::Ipv4Addr;

use crate::error::{BeaconError, Result};

pub fn to_u32(addr: Ipv4Addr) -> u32 {
    u32::from(addr)
}

pub fn from_u32(raw: u32) -> Ipv4Addr {
    Ipv4Addr::from(raw)
}

/// Offsets `addr` by `delta` addresses, failing instead of wrapping past `255.255.255.255`.
pub fn offset(addr: Ipv4Addr, delta: u32) -> Result<Ipv4Addr> {
    to_u32(addr)
        .checked_add(delta)
        .map(from_u32)
        .ok_or_else(|| BeaconError::Invariant(format!("{addr} + {delta} overflows IPv4 space")))
}

/// Parses strictly dotted-quad text, e.g. `"10.0.1.5"`.
pub fn parse(s: &str) -> Result<Ipv4Addr> {
    s.trim()
        .parse::<Ipv4Addr>()
        .map_err(|e| BeaconError::InvalidTarget {
            input: s.to_string(),
            reason: e.to_string(),
        })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
