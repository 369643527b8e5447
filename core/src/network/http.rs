//! Deadline-bounded JSON retrieval from an HTTP URL or a local file.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use beacon_common::error::{BeaconError, Result};
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonSource {
    Url(Url),
    File(PathBuf),
}

impl fmt::Display for JsonSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonSource::Url(url) => write!(f, "{url}"),
            JsonSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// JSON retrieval over one pooled HTTP client.
///
/// Cloning is cheap and shares the pool. Deadlines are set per request.
#[derive(Debug, Clone)]
pub struct JsonFetcher {
    client: reqwest::Client,
}

impl JsonFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| BeaconError::Fetch {
                source_name: "http client".to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { client })
    }

    /// Loads and parses JSON from `source`, giving up after `deadline`.
    pub async fn fetch(&self, source: &JsonSource, deadline: Duration) -> Result<Value> {
        let text = match source {
            JsonSource::Url(url) => self.get_text(url, deadline).await?,
            JsonSource::File(path) => read_text(path, deadline).await?,
        };

        serde_json::from_str(&text).map_err(|e| BeaconError::Parse {
            source_name: source.to_string(),
            reason: e.to_string(),
        })
    }

    async fn get_text(&self, url: &Url, deadline: Duration) -> Result<String> {
        let fetch_error = |reason: String| BeaconError::Fetch {
            source_name: url.to_string(),
            reason,
        };

        debug!("Requesting {url}");
        let text = async {
            self.client
                .get(url.clone())
                .timeout(deadline)
                .send()
                .await?
                .error_for_status()?
                .text()
                .await
        };

        match tokio::time::timeout(deadline, text).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(fetch_error(e.to_string())),
            Err(_elapsed) => Err(fetch_error(format!("timed out after {deadline:?}"))),
        }
    }
}

async fn read_text(path: &Path, deadline: Duration) -> Result<String> {
    let fetch_error = |reason: String| BeaconError::Fetch {
        source_name: path.display().to_string(),
        reason,
    };

    match tokio::time::timeout(deadline, tokio::fs::read_to_string(path)).await {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(fetch_error(e.to_string())),
        Err(_elapsed) => Err(fetch_error(format!("timed out after {deadline:?}"))),
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
