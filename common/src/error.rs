use std::net::Ipv4Addr;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BeaconError>;

#[derive(Debug, Error)]
pub enum BeaconError {
    /// The range is empty, too large for one scan, or runs past `255.255.255.255`.
    #[error("invalid address range: {count} addresses from {start} (expected 0 < count < {max})")]
    InvalidRange {
        start: Ipv4Addr,
        count: u32,
        max: u32,
    },

    /// Subnet bit-width outside of `1..=31`.
    #[error("invalid subnet prefix /{0} (expected 1..=31)")]
    InvalidPrefix(u8),

    #[error("invalid target '{input}': {reason}")]
    InvalidTarget { input: String, reason: String },

    #[error("could not determine a local IPv4 address")]
    NoLocalAddress,

    /// No candidate port produced a usable service URL for the host.
    #[error("could not resolve service at {host}")]
    Unresolvable { host: String },

    #[error("failed to fetch {source_name}: {reason}")]
    Fetch { source_name: String, reason: String },

    #[error("malformed JSON from {source_name}: {reason}")]
    Parse { source_name: String, reason: String },

    /// A JSON value is present but cannot be read as the requested type.
    #[error("expected {expected}: {found}")]
    Coercion { expected: &'static str, found: String },

    /// Internal consistency failure, unreachable with valid inputs.
    #[error("internal invariant violated: {0}")]
    Invariant(String),
}
