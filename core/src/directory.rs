//! # Service Directory
//!
//! Implements the "find every service on the subnet" use case.
//!
//! The directory chains the two halves of discovery:
//! 1. the [`SubnetScanner`] narrows an address range down to reachable hosts,
//! 2. one [`ServiceResolver`] per reachable host asks for its descriptor.
//!
//! Hosts that answer the probe but publish no descriptor are dropped.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use beacon_common::config::Config;
use beacon_common::error::{BeaconError, Result};
use beacon_common::network::range::AddressRange;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

use crate::network::http::JsonFetcher;
use crate::resolver::{ResolverSettings, ServiceResolver};
use crate::scanner::{SubnetScanner, local_range};

pub struct ServiceDirectory {
    scanner: SubnetScanner,
    settings: ResolverSettings,
    max_concurrent: usize,
}

impl ServiceDirectory {
    pub fn new(scanner: SubnetScanner, settings: ResolverSettings) -> Self {
        let max_concurrent = scanner.max_batches();
        Self {
            scanner,
            settings,
            max_concurrent,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(SubnetScanner::from_config(cfg), ResolverSettings::from(cfg))
    }

    pub fn scanner(&self) -> &SubnetScanner {
        &self.scanner
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Scans `range` (the local /24 when `None`) and returns a resolver for
    /// every host that published a descriptor, sorted by address.
    ///
    /// `timeout` bounds each probe and each descriptor fetch.
    pub async fn discover(
        &self,
        range: Option<AddressRange>,
        timeout: Duration,
    ) -> Result<Vec<ServiceResolver>> {
        let range = match range {
            Some(range) => range,
            None => local_range()?,
        };
        // Hostnames play no part in service resolution.
        let hosts = self.scanner.sweep(range, timeout).await?;
        debug!("{} reachable hosts, resolving services", hosts.len());

        let addrs: Vec<Ipv4Addr> = hosts.iter().map(|host| host.addr).collect();
        let settings = self.settings.clone().with_timeout(timeout);
        self.resolve_hosts(addrs, settings).await
    }

    async fn resolve_hosts(
        &self,
        addrs: Vec<Ipv4Addr>,
        settings: ResolverSettings,
    ) -> Result<Vec<ServiceResolver>> {
        let fetcher = JsonFetcher::new()?;
        let permits = Arc::new(Semaphore::new(self.max_concurrent));
        let mut resolutions: JoinSet<Result<Option<ServiceResolver>>> = JoinSet::new();

        for addr in addrs {
            let permits = Arc::clone(&permits);
            let settings = settings.clone();
            let fetcher = fetcher.clone();
            resolutions.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| BeaconError::Invariant(format!("resolver pool closed: {e}")))?;

                let mut resolver = ServiceResolver::for_address(addr, settings).with_fetcher(fetcher);
                let found = resolver.descriptor().await.is_some();
                Ok(found.then_some(resolver))
            });
        }

        let mut services: Vec<ServiceResolver> = Vec::new();
        while let Some(joined) = resolutions.join_next().await {
            let resolved = joined.map_err(|e| BeaconError::Invariant(format!("resolver task failed: {e}")))?;
            if let Some(resolver) = resolved? {
                services.push(resolver);
            }
        }

        services.sort_by_key(|resolver| resolver.address());
        Ok(services)
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
