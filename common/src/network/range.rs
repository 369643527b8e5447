use std::net::Ipv4Addr;

use pnet::ipnetwork::Ipv4Network;

use crate::error::{BeaconError, Result};
use crate::network::address;

/// Exclusive upper bound on the number of addresses in one scan.
pub const MAX_RANGE_LEN: u32 = 4096;

/// An inclusive slice of IPv4 addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl Ipv4Range {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        Self {
            start_addr,
            end_addr,
        }
    }

    pub fn to_iter(&self) -> impl Iterator<Item = Ipv4Addr> + use<> {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        (start..=end).map(Ipv4Addr::from)
    }

    pub fn len(&self) -> u64 {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        if end < start {
            0
        } else {
            u64::from(end - start) + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `count` consecutive addresses starting at `start`.
///
/// Always non-empty and shorter than [`MAX_RANGE_LEN`]; anything else is a
/// configuration error caught at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressRange {
    start: Ipv4Addr,
    count: u32,
}

impl AddressRange {
    pub fn new(start: Ipv4Addr, count: u32) -> Result<Self> {
        let invalid = || BeaconError::InvalidRange {
            start,
            count,
            max: MAX_RANGE_LEN,
        };
        if count == 0 || count >= MAX_RANGE_LEN {
            return Err(invalid());
        }
        if address::to_u32(start).checked_add(count - 1).is_none() {
            return Err(invalid());
        }
        Ok(Self { start, count })
    }

    pub fn start(&self) -> Ipv4Addr {
        self.start
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Last address inside the range.
    pub fn last(&self) -> Ipv4Addr {
        address::from_u32(address::to_u32(self.start) + (self.count - 1))
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        let raw = address::to_u32(addr);
        let start = address::to_u32(self.start);
        raw >= start && raw - start < self.count
    }

    pub fn to_iter(&self) -> impl Iterator<Item = Ipv4Addr> + use<> {
        Ipv4Range::from(*self).to_iter()
    }

    /// Number of addresses each batch receives when split into at most `max_batches`.
    pub fn batch_len(&self, max_batches: usize) -> u32 {
        let max_batches = u32::try_from(max_batches.max(1)).unwrap_or(u32::MAX);
        self.count.div_ceil(max_batches)
    }

    /// Splits the range into consecutive batches of [`batch_len`](Self::batch_len)
    /// addresses; only the last one may be shorter.
    pub fn partition(&self, max_batches: usize) -> Result<Vec<Ipv4Range>> {
        let batch_len = self.batch_len(max_batches);
        let mut batches = Vec::with_capacity(self.count.div_ceil(batch_len) as usize);
        let mut offset: u32 = 0;

        while offset < self.count {
            let len = batch_len.min(self.count - offset);
            let first = address::offset(self.start, offset)?;
            let last = address::offset(first, len - 1)?;
            batches.push(Ipv4Range::new(first, last));
            offset += len;
        }
        Ok(batches)
    }
}

impl From<AddressRange> for Ipv4Range {
    fn from(range: AddressRange) -> Self {
        Ipv4Range::new(range.start(), range.last())
    }
}

impl TryFrom<Ipv4Range> for AddressRange {
    type Error = BeaconError;

    fn try_from(range: Ipv4Range) -> Result<Self> {
        let len = range.len();
        let count = u32::try_from(len).unwrap_or(u32::MAX);
        AddressRange::new(range.start_addr, count)
    }
}

pub fn cidr_range(ip: Ipv4Addr, prefix: u8) -> anyhow::Result<Ipv4Range> {
    let network = Ipv4Network::new(ip, prefix)?;
    let start = network.network();
    let end = network.broadcast();

    Ok(Ipv4Range::new(start, end))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
