#![cfg(test)]
use std::net::Ipv4Addr;
use std::time::Duration;

use beacon_common::config::Config;
use beacon_common::error::BeaconError;
use beacon_common::network::range::AddressRange;
use beacon_core::{ResolverSettings, ServiceDirectory, ServiceResolver, SubnetScanner, Url};

use super::fixture::{ServiceFixture, descriptor};

const LOCALHOST: Ipv4Addr = Ipv4Addr::LOCALHOST;
const TIMEOUT: Duration = Duration::from_millis(500);

fn loopback_config(port: u16) -> Config {
    Config {
        no_dns: true,
        disable_input: true,
        probe_ports: vec![port],
        service_ports: vec![port],
        ..Config::default()
    }
}

/// The scanner finds a loopback host that accepts TCP connections.
#[tokio::test]
async fn scan_single_loopback() -> anyhow::Result<()> {
    let service = ServiceFixture::start(LOCALHOST, "loopback").await?;
    let scanner = SubnetScanner::from_config(&loopback_config(service.port()));

    let hosts = scanner.scan(AddressRange::new(LOCALHOST, 1)?, TIMEOUT).await?;

    assert_eq!(hosts.len(), 1, "No hosts found when scanning localhost");
    assert_eq!(hosts[0].addr, LOCALHOST);
    assert!(hosts[0].reachable);
    assert_eq!(hosts[0].hostname, None, "no_dns must skip reverse lookups");
    Ok(())
}

/// On Linux every 127/8 address reaches a socket bound to the wildcard address.
#[cfg(target_os = "linux")]
#[tokio::test]
async fn scan_range_loopback() -> anyhow::Result<()> {
    use beacon_common::network::target::Target;
    use beacon_core::network::tcp::TcpProber;
    use std::sync::Arc;

    let service = ServiceFixture::start(Ipv4Addr::UNSPECIFIED, "wildcard").await?;
    let scanner = SubnetScanner::new(Arc::new(TcpProber::new(vec![service.port()]))).with_max_batches(2);

    let range = "127.0.0.1+4".parse::<Target>().map_err(anyhow::Error::msg)?;
    let range = range.to_range()?.expect("explicit range");
    let hosts = scanner.scan(range, TIMEOUT).await?;

    let addrs: Vec<Ipv4Addr> = hosts.iter().map(|h| h.addr).collect();
    assert_eq!(
        addrs,
        vec![
            Ipv4Addr::new(127, 0, 0, 1),
            Ipv4Addr::new(127, 0, 0, 2),
            Ipv4Addr::new(127, 0, 0, 3),
            Ipv4Addr::new(127, 0, 0, 4),
        ]
    );
    Ok(())
}

/// Only the host that publishes a descriptor survives discovery.
#[tokio::test]
async fn directory_discovers_loopback_service() -> anyhow::Result<()> {
    let service = ServiceFixture::start(LOCALHOST, "bench camera").await?;
    let directory = ServiceDirectory::from_config(&loopback_config(service.port()));

    let range = AddressRange::new(LOCALHOST, 2)?;
    let services = directory.discover(Some(range), TIMEOUT).await?;

    assert_eq!(services.len(), 1);
    let found = &services[0];
    assert_eq!(found.address(), Some(LOCALHOST));
    assert_eq!(found.attempts(), 1);

    let descriptor = found.cached_descriptor().expect("resolved descriptor");
    assert_eq!(
        descriptor.get("FireREST").get("title").as_string(None)?,
        Some("bench camera".to_string())
    );
    assert_eq!(service.hits(), 1);
    Ok(())
}

#[tokio::test]
async fn directory_with_no_reachable_hosts_is_empty() -> anyhow::Result<()> {
    let closed = {
        let listener = tokio::net::TcpListener::bind((LOCALHOST, 0)).await?;
        listener.local_addr()?.port()
    };
    let directory = ServiceDirectory::from_config(&loopback_config(closed));

    let services = directory.discover(Some(AddressRange::new(LOCALHOST, 1)?), TIMEOUT).await?;
    assert!(services.is_empty());
    Ok(())
}

#[tokio::test]
async fn resolver_by_url_and_by_address_agree() -> anyhow::Result<()> {
    let service = ServiceFixture::start(LOCALHOST, "twin").await?;
    let settings = ResolverSettings {
        ports: vec![service.port()],
        ..ResolverSettings::default()
    };

    let mut by_address = ServiceResolver::for_address(LOCALHOST, settings.clone());
    let url = Url::parse(&format!("http://127.0.0.1:{}/firerest/config.json", service.port()))?;
    let mut by_url = ServiceResolver::for_url(url, settings);

    let a = by_address.descriptor().await.cloned().expect("address resolves");
    let b = by_url.descriptor().await.cloned().expect("url resolves");
    assert_eq!(a, b);
    assert_eq!(a.value(), &descriptor("twin"));
    assert_eq!(by_address.url(), by_url.url());
    Ok(())
}

#[tokio::test]
async fn resolve_refetches_every_time() -> anyhow::Result<()> {
    let service = ServiceFixture::start(LOCALHOST, "counter").await?;
    let settings = ResolverSettings {
        ports: vec![service.port()],
        ..ResolverSettings::default()
    };
    let mut resolver = ServiceResolver::for_address(LOCALHOST, settings);
    assert_eq!(resolver.attempts(), 0);

    for expected in 1..=3 {
        resolver.resolve().await?;
        assert_eq!(resolver.attempts(), expected);
    }
    assert_eq!(service.hits(), 3);
    Ok(())
}

#[tokio::test]
async fn non_object_descriptor_counts_as_no_service() -> anyhow::Result<()> {
    let service = ServiceFixture::serve(LOCALHOST, serde_json::json!("just a string")).await?;
    let settings = ResolverSettings {
        ports: vec![service.port()],
        ..ResolverSettings::default()
    };
    let mut resolver = ServiceResolver::for_address(LOCALHOST, settings);

    assert!(matches!(resolver.resolve().await, Err(BeaconError::Parse { .. })));
    assert!(resolver.descriptor().await.is_none());
    assert_eq!(resolver.attempts(), 1);
    Ok(())
}
