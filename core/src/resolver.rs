//! Per-host **service resolution**.
//!
//! A [`ServiceResolver`] locates the service descriptor a host publishes at a
//! well-known path and keeps the last one it fetched. It distinguishes a host
//! that was never asked ([`Resolution::Unattempted`]) from one that was asked
//! and had nothing to say ([`Resolution::Failed`]).
//!
//! For a bare address the candidate ports are tried in order and the first
//! one that produces a syntactically valid URL is used. The service is not
//! contacted while choosing, so a service living only on a later candidate
//! port is not found.

use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;

use beacon_common::config::{self, Config};
use beacon_common::error::{BeaconError, Result};
use beacon_common::json::JsonNode;
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

use crate::network::http::{JsonFetcher, JsonSource};

/// Top-level section of a descriptor that names the service itself.
pub const SERVICE_SECTION: &str = "FireREST";

/// The JSON document a service publishes about itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDescriptor {
    value: Value,
}

impl ServiceDescriptor {
    pub fn root(&self) -> JsonNode<'_> {
        JsonNode::new(&self.value)
    }

    pub fn get(&self, key: &str) -> JsonNode<'_> {
        self.root().get(key)
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Reads `key` from the [`SERVICE_SECTION`], e.g. `title` or `version`.
    pub fn service_field(&self, key: &str) -> Option<String> {
        self.get(SERVICE_SECTION).get(key).as_string(None).ok().flatten()
    }
}

impl TryFrom<Value> for ServiceDescriptor {
    type Error = String;

    fn try_from(value: Value) -> std::result::Result<Self, Self::Error> {
        if value.is_object() {
            Ok(Self { value })
        } else {
            Err(format!("expected a JSON object, found {value}"))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverTarget {
    /// Location of the descriptor is known up front.
    Url(Url),
    /// Only the host is known; the URL is built from candidate ports.
    Address(Ipv4Addr),
}

impl fmt::Display for ResolverTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolverTarget::Url(url) => write!(f, "{url}"),
            ResolverTarget::Address(addr) => write!(f, "{addr}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Resolution {
    #[default]
    Unattempted,
    Resolved(ServiceDescriptor),
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverSettings {
    pub timeout: Duration,
    /// Candidate ports, in order of preference.
    pub ports: Vec<u16>,
    pub path: String,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            timeout: config::DEFAULT_TIMEOUT,
            ports: config::DEFAULT_SERVICE_PORTS.to_vec(),
            path: config::DEFAULT_SERVICE_PATH.to_string(),
        }
    }
}

impl From<&Config> for ResolverSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            timeout: cfg.timeout,
            ports: cfg.service_ports.clone(),
            path: cfg.service_path.clone(),
        }
    }
}

impl ResolverSettings {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ServiceResolver {
    target: ResolverTarget,
    url: Option<Url>,
    attempts: u32,
    resolution: Resolution,
    settings: ResolverSettings,
    fetcher: Option<JsonFetcher>,
}

impl ServiceResolver {
    pub fn new(target: ResolverTarget, settings: ResolverSettings) -> Self {
        let url = match &target {
            ResolverTarget::Url(url) => Some(url.clone()),
            ResolverTarget::Address(_) => None,
        };
        Self {
            target,
            url,
            attempts: 0,
            resolution: Resolution::Unattempted,
            settings,
            fetcher: None,
        }
    }

    /// Fetches through `fetcher` instead of a client of its own.
    pub fn with_fetcher(mut self, fetcher: JsonFetcher) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn for_address(addr: Ipv4Addr, settings: ResolverSettings) -> Self {
        Self::new(ResolverTarget::Address(addr), settings)
    }

    pub fn for_url(url: Url, settings: ResolverSettings) -> Self {
        Self::new(ResolverTarget::Url(url), settings)
    }

    pub fn target(&self) -> &ResolverTarget {
        &self.target
    }

    /// Address this resolver was created for, if it was not given a URL.
    pub fn address(&self) -> Option<Ipv4Addr> {
        match self.target {
            ResolverTarget::Address(addr) => Some(addr),
            ResolverTarget::Url(_) => None,
        }
    }

    /// Descriptor URL, known once a resolution attempt built it.
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// Number of times [`resolve`](Self::resolve) has run, failures included.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Fetches the descriptor again, replacing whatever was stored before.
    ///
    /// Never short-circuits: a resolved service is asked again because its
    /// configuration may have changed.
    pub async fn resolve(&mut self) -> Result<()> {
        self.attempts += 1;
        self.resolution = Resolution::Failed;

        let url = self.service_url()?;
        debug!("Resolving {} (attempt {})", url, self.attempts);

        let source = JsonSource::Url(url);
        let fetcher = self.fetcher()?;
        let value = fetcher.fetch(&source, self.settings.timeout).await?;
        let descriptor = ServiceDescriptor::try_from(value).map_err(|reason| BeaconError::Parse {
            source_name: source.to_string(),
            reason,
        })?;

        self.resolution = Resolution::Resolved(descriptor);
        Ok(())
    }

    /// Cached descriptor, resolving once if no attempt was ever made.
    ///
    /// A failed automatic attempt is treated as "no service here".
    pub async fn descriptor(&mut self) -> Option<&ServiceDescriptor> {
        if self.attempts == 0 {
            if let Err(e) = self.resolve().await {
                debug!("No service at {}: {e}", self.target);
            }
        }
        self.cached_descriptor()
    }

    /// Descriptor from the last attempt, without touching the network.
    pub fn cached_descriptor(&self) -> Option<&ServiceDescriptor> {
        match &self.resolution {
            Resolution::Resolved(descriptor) => Some(descriptor),
            Resolution::Unattempted | Resolution::Failed => None,
        }
    }

    /// Client kept across attempts, built on first use.
    fn fetcher(&mut self) -> Result<JsonFetcher> {
        match &self.fetcher {
            Some(fetcher) => Ok(fetcher.clone()),
            None => {
                let fetcher = JsonFetcher::new()?;
                self.fetcher = Some(fetcher.clone());
                Ok(fetcher)
            }
        }
    }

    fn service_url(&mut self) -> Result<Url> {
        if let Some(url) = &self.url {
            return Ok(url.clone());
        }

        let host = self.target.to_string();
        let url = candidate_url(&host, &self.settings.ports, &self.settings.path)
            .ok_or(BeaconError::Unresolvable { host })?;
        self.url = Some(url.clone());
        Ok(url)
    }
}

/// First candidate port that yields a well-formed URL.
fn candidate_url(host: &str, ports: &[u16], path: &str) -> Option<Url> {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };

    ports.iter().find_map(|port| {
        Url::parse(&format!("http://{host}:{port}{path}"))
            .map_err(|e| debug!("Rejected candidate port {port} for {host}: {e}"))
            .ok()
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
