pub mod discover;
pub mod resolve;
pub mod scan;

use std::time::Duration;

use beacon_common::config::{self, Config};
use beacon_common::network::target::Target;
use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "beacon", version)]
#[command(about = "Finds self-describing HTTP services on the local network.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Per-host timeout for probes and descriptor fetches, in milliseconds
    #[arg(long, global = true, value_name = "MS", default_value_t = 500)]
    pub timeout: u64,

    /// Skip reverse DNS lookups of reachable hosts
    #[arg(long, global = true)]
    pub no_dns: bool,

    /// Print less; repeat for even less
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,

    /// Do not listen for 'q' to stop early
    #[arg(long, global = true)]
    pub no_input: bool,

    /// Upper bound on concurrently probed hosts
    #[arg(long, global = true, value_name = "N", default_value_t = config::DEFAULT_MAX_BATCHES)]
    pub batches: usize,

    /// Candidate service port, tried in the given order (default 8080, 80)
    #[arg(short, long = "port", global = true, value_name = "PORT")]
    pub ports: Vec<u16>,

    /// Resource path of the service descriptor
    #[arg(long, global = true, value_name = "PATH")]
    pub path: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find hosts that publish a service descriptor
    #[command(alias = "d")]
    Discover {
        /// lan, an address, a range (a.b.c.d-e), a CIDR block or a.b.c.d+count
        #[arg(default_value = "lan")]
        target: Target,
    },
    /// List reachable hosts without asking for services
    #[command(alias = "s")]
    Scan {
        #[arg(default_value = "lan")]
        target: Target,
    },
    /// Fetch the descriptor of a single host or URL
    #[command(alias = "r")]
    Resolve {
        /// An IPv4 address or a full descriptor URL
        target: String,
        /// Dump the descriptor as JSON
        #[arg(long)]
        raw: bool,
    },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn to_config(&self) -> Config {
        let defaults = Config::default();
        Config {
            no_dns: self.no_dns,
            quiet: self.quiet,
            disable_input: self.no_input,
            timeout: Duration::from_millis(self.timeout),
            max_batches: self.batches.max(1),
            probe_ports: defaults.probe_ports,
            service_ports: if self.ports.is_empty() {
                defaults.service_ports
            } else {
                self.ports.clone()
            },
            service_path: self.path.clone().unwrap_or(defaults.service_path),
        }
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
