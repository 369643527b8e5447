//! Concurrent **reachability scanning** of an IPv4 address range.
//!
//! The range is cut into at most `max_batches` consecutive slices. Each slice
//! becomes one tokio task that probes its addresses one after another with the
//! per-host timeout, so the number of probes in flight never exceeds the batch
//! count no matter how large the range is.
//!
//! Batches share nothing but the result channel (their return value), a stop
//! flag, and a progress counter that is only reported, never read back.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use beacon_common::config::Config;
use beacon_common::error::{BeaconError, Result};
use beacon_common::network::host::ProbeResult;
use beacon_common::network::range::{AddressRange, Ipv4Range, MAX_RANGE_LEN};
use beacon_common::network::{interface, subnet::SubnetMask};
use beacon_common::{info, warn};
use tokio::task::JoinSet;
use tracing::debug;

use crate::network::tcp::{Prober, TcpProber};

mod hostname;

pub use hostname::{HostnameLookup, HostnameResolver, attach_hostnames};

/// Prefix of the subnet scanned when no explicit range is given.
pub const LOCAL_PREFIX: u8 = 24;
/// Addresses scanned from the local subnet base (`.0` through `.254`).
pub const LOCAL_SCAN_LEN: u32 = 255;

pub type HostFoundCallback = Arc<dyn Fn(usize) + Send + Sync>;

pub struct SubnetScanner {
    prober: Arc<dyn Prober>,
    max_batches: usize,
    stop_signal: Arc<AtomicBool>,
    on_host_found: Option<HostFoundCallback>,
    hostnames: Option<Arc<dyn HostnameLookup>>,
}

impl SubnetScanner {
    pub fn new(prober: Arc<dyn Prober>) -> Self {
        Self {
            prober,
            max_batches: beacon_common::config::DEFAULT_MAX_BATCHES,
            stop_signal: Arc::new(AtomicBool::new(false)),
            on_host_found: None,
            hostnames: None,
        }
    }

    /// TCP-probing scanner with the batch cap and DNS behaviour taken from `cfg`.
    pub fn from_config(cfg: &Config) -> Self {
        let prober = Arc::new(TcpProber::new(cfg.probe_ports.clone()));
        let mut scanner = Self::new(prober).with_max_batches(cfg.max_batches);

        if !cfg.no_dns {
            match HostnameResolver::from_system_conf() {
                Ok(resolver) => scanner = scanner.with_hostnames(Arc::new(resolver)),
                Err(e) => warn!("Reverse DNS disabled: {e}"),
            }
        }
        scanner
    }

    /// Caps concurrent batches. More batches than a range can hold are never useful.
    pub fn with_max_batches(mut self, max_batches: usize) -> Self {
        self.max_batches = max_batches.clamp(1, MAX_RANGE_LEN as usize);
        self
    }

    /// Shares a flag that, once set, makes every batch stop after its current probe.
    pub fn with_stop_signal(mut self, stop_signal: Arc<AtomicBool>) -> Self {
        self.stop_signal = stop_signal;
        self
    }

    /// Called with the running total every time a batch finds a reachable host.
    pub fn on_host_found(mut self, callback: HostFoundCallback) -> Self {
        self.on_host_found = Some(callback);
        self
    }

    pub fn with_hostnames(mut self, lookup: Arc<dyn HostnameLookup>) -> Self {
        self.hostnames = Some(lookup);
        self
    }

    pub fn max_batches(&self) -> usize {
        self.max_batches
    }

    pub fn stop_signal(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_signal)
    }

    /// Probes every address of `range` and returns the reachable ones, sorted by address.
    ///
    /// Reachable hosts get a reverse-DNS hostname when a lookup is configured.
    pub async fn scan(&self, range: AddressRange, timeout: Duration) -> Result<Vec<ProbeResult>> {
        let hosts = self.sweep(range, timeout).await?;
        match &self.hostnames {
            Some(lookup) => Ok(attach_hostnames(Arc::clone(lookup), hosts, timeout, self.max_batches).await),
            None => Ok(hosts),
        }
    }

    /// Like [`scan`](Self::scan), without hostname lookups.
    pub async fn sweep(&self, range: AddressRange, timeout: Duration) -> Result<Vec<ProbeResult>> {
        let batches: Vec<Ipv4Range> = range.partition(self.max_batches)?;
        debug!(
            "Scanning {} addresses from {} in {} batches",
            range.count(),
            range.start(),
            batches.len()
        );

        let found = Arc::new(AtomicUsize::new(0));
        let mut workers: JoinSet<Vec<ProbeResult>> = JoinSet::new();

        for batch in batches {
            let prober = Arc::clone(&self.prober);
            let stop_signal = Arc::clone(&self.stop_signal);
            let found = Arc::clone(&found);
            let on_host_found = self.on_host_found.clone();

            workers.spawn(async move {
                let mut hits: Vec<ProbeResult> = Vec::new();
                for ip in batch.to_iter() {
                    if stop_signal.load(Ordering::Relaxed) {
                        break;
                    }
                    let result = prober.probe(ip, timeout).await;
                    if result.reachable {
                        let total = found.fetch_add(1, Ordering::Relaxed) + 1;
                        if let Some(callback) = &on_host_found {
                            callback(total);
                        }
                        hits.push(result);
                    }
                }
                hits
            });
        }

        let mut hosts: Vec<ProbeResult> = Vec::new();
        while let Some(joined) = workers.join_next().await {
            let hits = joined.map_err(|e| BeaconError::Invariant(format!("scan batch failed: {e}")))?;
            hosts.extend(hits);
        }

        hosts.sort_by_key(|host| host.addr);
        hosts.dedup_by_key(|host| host.addr);
        Ok(hosts)
    }

    /// Scans the /24 this machine lives on.
    pub async fn scan_local(&self, timeout: Duration) -> Result<Vec<ProbeResult>> {
        let range = local_range()?;
        info!("Searching for hosts from {} to {}", range.start(), range.last());
        self.scan(range, timeout).await
    }
}

/// The range [`SubnetScanner::scan_local`] covers.
pub fn local_range() -> Result<AddressRange> {
    let local: Ipv4Addr = interface::local_ipv4()?;
    let base = SubnetMask::new(LOCAL_PREFIX)?.apply(local);
    AddressRange::new(base, LOCAL_SCAN_LEN)
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
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Answers from a fixed set of live addresses and records what it was asked.
    struct FixtureProber {
        live: HashSet<Ipv4Addr>,
        probed: Mutex<Vec<Ipv4Addr>>,
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
        delay: Duration,
    }

    impl FixtureProber {
        fn new(live: impl IntoIterator<Item = Ipv4Addr>) -> Self {
            Self {
                live: live.into_iter().collect(),
                probed: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                peak_in_flight: AtomicUsize::new(0),
                delay: Duration::from_millis(1),
            }
        }

        fn probed(&self) -> Vec<Ipv4Addr> {
            self.probed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Prober for FixtureProber {
        async fn probe(&self, addr: Ipv4Addr, _deadline: Duration) -> ProbeResult {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
            self.probed.lock().unwrap().push(addr);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.live.contains(&addr) {
                ProbeResult::reachable(addr)
            } else {
                ProbeResult::unreachable(addr)
            }
        }
    }

    const TIMEOUT: Duration = Duration::from_millis(500);

    #[tokio::test]
    async fn finds_the_single_reachable_host() {
        let target = Ipv4Addr::new(10, 0, 1, 5);
        let prober = Arc::new(FixtureProber::new([target]));
        let scanner = SubnetScanner::new(prober.clone());

        let range = AddressRange::new(Ipv4Addr::new(10, 0, 1, 0), 8).unwrap();
        let hosts = scanner.scan(range, TIMEOUT).await.unwrap();

        let addrs: Vec<Ipv4Addr> = hosts.iter().map(|h| h.addr).collect();
        assert_eq!(addrs, vec![target]);
        assert!(hosts[0].reachable);
        assert_eq!(prober.probed().len(), 8);
    }

    #[tokio::test]
    async fn every_reachable_host_appears_exactly_once() {
        let range = AddressRange::new(Ipv4Addr::new(192, 168, 4, 0), 1000).unwrap();
        let prober = Arc::new(FixtureProber::new(range.to_iter()));
        let scanner = SubnetScanner::new(prober.clone());

        let hosts = scanner.scan(range, TIMEOUT).await.unwrap();
        assert_eq!(hosts.len(), 1000);

        let unique: HashSet<Ipv4Addr> = hosts.iter().map(|h| h.addr).collect();
        assert_eq!(unique.len(), 1000);
        assert!(hosts.windows(2).all(|w| w[0].addr < w[1].addr));

        let mut probed = prober.probed();
        probed.sort();
        probed.dedup();
        assert_eq!(probed.len(), 1000, "no address may be probed twice");
    }

    #[tokio::test]
    async fn unreachable_range_yields_nothing() {
        let prober = Arc::new(FixtureProber::new([]));
        let scanner = SubnetScanner::new(prober);
        let range = AddressRange::new(Ipv4Addr::new(10, 9, 0, 0), 64).unwrap();
        assert!(scanner.scan(range, TIMEOUT).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrency_never_exceeds_batch_cap() {
        let range = AddressRange::new(Ipv4Addr::new(10, 1, 0, 0), 400).unwrap();
        let prober = Arc::new(FixtureProber::new([]));
        let scanner = SubnetScanner::new(prober.clone()).with_max_batches(16);

        scanner.scan(range, TIMEOUT).await.unwrap();
        let peak = prober.peak_in_flight.load(Ordering::SeqCst);
        assert!(peak <= 16, "peak concurrency was {peak}");
        assert_eq!(prober.probed().len(), 400);
    }

    #[tokio::test]
    async fn stop_signal_halts_batches_early() {
        let range = AddressRange::new(Ipv4Addr::new(10, 2, 0, 0), 512).unwrap();
        let prober = Arc::new(FixtureProber::new(range.to_iter()));
        let stop = Arc::new(AtomicBool::new(false));
        let stop_from_callback = Arc::clone(&stop);

        let scanner = SubnetScanner::new(prober.clone())
            .with_max_batches(2)
            .with_stop_signal(Arc::clone(&stop))
            .on_host_found(Arc::new(move |total: usize| {
                if total >= 10 {
                    stop_from_callback.store(true, Ordering::Relaxed);
                }
            }));

        let hosts = scanner.scan(range, TIMEOUT).await.unwrap();
        assert!(hosts.len() >= 10);
        assert!(hosts.len() < 512);
        assert!(prober.probed().len() < 512);
    }

    #[test]
    fn batch_cap_is_clamped_to_a_usable_range() {
        let prober = Arc::new(FixtureProber::new([]));
        assert_eq!(SubnetScanner::new(prober.clone()).with_max_batches(0).max_batches(), 1);
        assert_eq!(
            SubnetScanner::new(prober).with_max_batches(usize::MAX).max_batches(),
            MAX_RANGE_LEN as usize
        );
    }

    #[tokio::test]
    async fn huge_batch_cap_still_scans() {
        let target = Ipv4Addr::new(10, 0, 1, 5);
        let prober = Arc::new(FixtureProber::new([target]));
        let scanner = SubnetScanner::new(prober).with_max_batches(usize::MAX);

        let range = AddressRange::new(Ipv4Addr::new(10, 0, 1, 0), 8).unwrap();
        let hosts = scanner.scan(range, TIMEOUT).await.unwrap();
        assert_eq!(hosts.len(), 1);
    }

    /// Names every host `fixture` and counts lookups.
    #[derive(Default)]
    struct CountingLookup {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl HostnameLookup for CountingLookup {
        async fn lookup(&self, _addr: Ipv4Addr, _deadline: Duration) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Some("fixture".to_string())
        }
    }

    #[tokio::test]
    async fn scan_attaches_hostnames_but_sweep_does_not() {
        let live = [Ipv4Addr::new(10, 4, 0, 1), Ipv4Addr::new(10, 4, 0, 2)];
        let lookup = Arc::new(CountingLookup::default());
        let scanner = SubnetScanner::new(Arc::new(FixtureProber::new(live))).with_hostnames(lookup.clone());
        let range = AddressRange::new(Ipv4Addr::new(10, 4, 0, 0), 4).unwrap();

        let swept = scanner.sweep(range, TIMEOUT).await.unwrap();
        assert_eq!(swept.len(), 2);
        assert!(swept.iter().all(|h| h.hostname.is_none()));
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);

        let scanned = scanner.scan(range, TIMEOUT).await.unwrap();
        assert!(scanned.iter().all(|h| h.hostname.as_deref() == Some("fixture")));
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn progress_callback_counts_every_hit() {
        let live = [Ipv4Addr::new(10, 3, 0, 1), Ipv4Addr::new(10, 3, 0, 9)];
        let prober = Arc::new(FixtureProber::new(live));
        let last_total = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&last_total);

        let scanner = SubnetScanner::new(prober).on_host_found(Arc::new(move |total: usize| {
            seen.fetch_max(total, Ordering::SeqCst);
        }));

        let range = AddressRange::new(Ipv4Addr::new(10, 3, 0, 0), 16).unwrap();
        scanner.scan(range, TIMEOUT).await.unwrap();
        assert_eq!(last_total.load(Ordering::SeqCst), 2);
    }
}
