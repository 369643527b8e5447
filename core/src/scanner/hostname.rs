use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use beacon_common::network::host::ProbeResult;
use hickory_resolver::TokioAsyncResolver;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::debug;

/// Reverse lookup of a single address.
///
/// Implementations return `None` on any failure and never block past `deadline`.
#[async_trait]
pub trait HostnameLookup: Send + Sync {
    async fn lookup(&self, addr: Ipv4Addr, deadline: Duration) -> Option<String>;
}

/// PTR lookups through the system resolver configuration.
#[derive(Clone)]
pub struct HostnameResolver {
    resolver: TokioAsyncResolver,
}

impl HostnameResolver {
    pub fn from_system_conf() -> anyhow::Result<Self> {
        let resolver = TokioAsyncResolver::tokio_from_system_conf()?;
        Ok(Self { resolver })
    }
}

#[async_trait]
impl HostnameLookup for HostnameResolver {
    async fn lookup(&self, addr: Ipv4Addr, deadline: Duration) -> Option<String> {
        let ip = IpAddr::V4(addr);
        match timeout(deadline, self.resolver.reverse_lookup(ip)).await {
            Ok(Ok(lookup)) => lookup
                .iter()
                .find_map(|name| normalize_hostname(&name.to_string())),
            Ok(Err(e)) => {
                debug!("No PTR record for {ip}: {e}");
                None
            }
            Err(_elapsed) => None,
        }
    }
}

/// Attaches hostnames to `hosts`, at most `max_concurrent` lookups at a time.
///
/// Order is preserved. Hosts whose lookup fails keep `hostname = None`.
pub async fn attach_hostnames(
    lookup: Arc<dyn HostnameLookup>,
    hosts: Vec<ProbeResult>,
    deadline: Duration,
    max_concurrent: usize,
) -> Vec<ProbeResult> {
    let permits = Arc::new(Semaphore::new(max_concurrent.clamp(1, Semaphore::MAX_PERMITS)));
    let mut lookups: JoinSet<(usize, Option<String>)> = JoinSet::new();

    for (idx, host) in hosts.iter().enumerate() {
        let lookup = Arc::clone(&lookup);
        let permits = Arc::clone(&permits);
        let addr = host.addr;
        lookups.spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return (idx, None);
            };
            (idx, lookup.lookup(addr, deadline).await)
        });
    }

    let mut names: Vec<Option<String>> = vec![None; hosts.len()];
    while let Some(joined) = lookups.join_next().await {
        if let Ok((idx, hostname)) = joined {
            names[idx] = hostname;
        }
    }

    hosts
        .into_iter()
        .zip(names)
        .map(|(host, hostname)| host.with_hostname(hostname))
        .collect()
}

/// Strips the trailing root label from a PTR name.
fn normalize_hostname(name: &str) -> Option<String> {
    let trimmed = name.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
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
