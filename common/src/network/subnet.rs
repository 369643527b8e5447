use std::net::Ipv4Addr;

use pnet::ipnetwork::Ipv4Network;

use crate::error::{BeaconError, Result};

/// A subnet mask built from a prefix length between 1 and 31.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubnetMask {
    bits: u8,
}

impl SubnetMask {
    pub fn new(bits: u8) -> Result<Self> {
        if !(1..=31).contains(&bits) {
            return Err(BeaconError::InvalidPrefix(bits));
        }
        Ok(Self { bits })
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    pub fn mask(&self) -> u32 {
        u32::MAX << (32 - self.bits)
    }

    /// Number of addresses in a subnet of this size.
    pub fn size(&self) -> u64 {
        1u64 << (32 - self.bits)
    }

    /// First address of the subnet that contains `addr`.
    pub fn apply(&self, addr: Ipv4Addr) -> Ipv4Addr {
        Ipv4Network::new(addr, self.bits)
            .map(|net| net.network())
            .unwrap_or_else(|_| Ipv4Addr::from(u32::from(addr) & self.mask()))
    }
}

pub fn subnet_base(addr: Ipv4Addr, bits: u8) -> Result<Ipv4Addr> {
    Ok(SubnetMask::new(bits)?.apply(addr))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subnet_base_matches_known_prefixes() {
        let high = Ipv4Addr::new(255, 254, 253, 252);
        assert_eq!(subnet_base(high, 24).unwrap(), Ipv4Addr::new(255, 254, 253, 0));
        assert_eq!(subnet_base(high, 16).unwrap(), Ipv4Addr::new(255, 254, 0, 0));
        assert_eq!(subnet_base(high, 8).unwrap(), Ipv4Addr::new(255, 0, 0, 0));

        let low = Ipv4Addr::new(1, 2, 3, 4);
        assert_eq!(subnet_base(low, 24).unwrap(), Ipv4Addr::new(1, 2, 3, 0));
        assert_eq!(subnet_base(low, 16).unwrap(), Ipv4Addr::new(1, 2, 0, 0));
        assert_eq!(subnet_base(low, 8).unwrap(), Ipv4Addr::new(1, 0, 0, 0));
    }

    #[test]
    fn subnet_base_clears_exactly_the_host_bits() {
        let samples = [0u32, 1, 0x0102_0304, 0x0a00_01ff, 0xc0a8_0164, 0xfffe_fdfc, u32::MAX];
        for bits in 1..=31u8 {
            let host_bits = 32 - u32::from(bits);
            for raw in samples {
                let base = u32::from(subnet_base(Ipv4Addr::from(raw), bits).unwrap());
                assert_eq!(base & ((1u32 << host_bits) - 1), 0, "/{bits} of {raw:#x}");
                assert_eq!(base >> host_bits, raw >> host_bits, "/{bits} of {raw:#x}");
            }
        }
    }

    #[test]
    fn rejects_prefix_outside_supported_widths() {
        assert!(matches!(SubnetMask::new(0), Err(BeaconError::InvalidPrefix(0))));
        assert!(matches!(SubnetMask::new(32), Err(BeaconError::InvalidPrefix(32))));
        assert!(SubnetMask::new(1).is_ok());
        assert!(SubnetMask::new(31).is_ok());
    }

    #[test]
    fn size_follows_prefix() {
        assert_eq!(SubnetMask::new(24).unwrap().size(), 256);
        assert_eq!(SubnetMask::new(31).unwrap().size(), 2);
    }
}
