//! # beacon-core
//!
//! The moving parts of service discovery:
//!
//! * [`scanner`] probes an address range concurrently and reports reachable hosts.
//! * [`resolver`] turns one host into a service descriptor over HTTP+JSON.
//! * [`directory`] chains both into a single discovery pass.
//! * [`network`] holds the I/O boundaries (reachability probes, JSON fetching).

pub mod directory;
pub mod network;
pub mod resolver;
pub mod scanner;

pub use directory::ServiceDirectory;
pub use resolver::{Resolution, ResolverSettings, ResolverTarget, ServiceDescriptor, ServiceResolver};
pub use scanner::SubnetScanner;

pub use reqwest::Url;
