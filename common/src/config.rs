use std::time::Duration;

/// Per-host timeout applied to probes and service fetches.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);
/// Upper bound on concurrently running scan batches.
pub const DEFAULT_MAX_BATCHES: usize = 256;
/// Candidate service ports, tried in order.
pub const DEFAULT_SERVICE_PORTS: [u16; 2] = [8080, 80];
/// Well-known resource every service publishes its descriptor at.
pub const DEFAULT_SERVICE_PATH: &str = "/firerest/config.json";
/// Ports a TCP reachability probe knocks on.
pub const DEFAULT_PROBE_PORTS: [u16; 4] = [8080, 80, 443, 22];

#[derive(Debug, Clone)]
pub struct Config {
    /// Disables reverse DNS lookups for reachable hosts.
    pub no_dns: bool,
    /// Output verbosity, `0` prints everything.
    pub quiet: u8,
    /// Disables the key listener that allows stopping a scan early.
    pub disable_input: bool,
    pub timeout: Duration,
    pub max_batches: usize,
    pub probe_ports: Vec<u16>,
    pub service_ports: Vec<u16>,
    pub service_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            no_dns: false,
            quiet: 0,
            disable_input: false,
            timeout: DEFAULT_TIMEOUT,
            max_batches: DEFAULT_MAX_BATCHES,
            probe_ports: DEFAULT_PROBE_PORTS.to_vec(),
            service_ports: DEFAULT_SERVICE_PORTS.to_vec(),
            service_path: DEFAULT_SERVICE_PATH.to_string(),
        }
    }
}
