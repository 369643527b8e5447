use anyhow::Context;
use beacon_common::{config::Config, network::address, success};
use beacon_core::Url;
use beacon_core::resolver::{ResolverSettings, ResolverTarget, ServiceResolver};
use colored::*;

use crate::terminal::{colors, format, print};

pub async fn resolve(target: &str, raw: bool, cfg: &Config) -> anyhow::Result<()> {
    print::header("service resolution", cfg.quiet);
    let target = parse_target(target)?;

    let mut resolver = ServiceResolver::new(target, ResolverSettings::from(cfg));
    resolver
        .resolve()
        .await
        .with_context(|| format!("could not resolve {}", resolver.target()))?;

    let Some(descriptor) = resolver.cached_descriptor() else {
        anyhow::bail!("{} returned no descriptor", resolver.target());
    };

    if raw {
        let json = serde_json::to_string_pretty(descriptor.value()).context("could not render descriptor")?;
        print::print(&json);
        return Ok(());
    }

    if cfg.quiet < 2 {
        print::tree_head(0, &format::service_name(&resolver));
        print::as_tree_one_level(format::service_to_details(&resolver));
    }
    if cfg.quiet == 0 {
        print::fat_separator();
        print::aligned_line("Attempts", resolver.attempts().to_string().color(colors::ACCENT));
    } else {
        success!("Resolved {}", resolver.target());
    }
    Ok(())
}

/// A full URL is used as-is; anything else must be an IPv4 address.
fn parse_target(input: &str) -> anyhow::Result<ResolverTarget> {
    if input.contains("://") {
        let url = Url::parse(input).with_context(|| format!("invalid URL: {input}"))?;
        return Ok(ResolverTarget::Url(url));
    }
    Ok(ResolverTarget::Address(address::parse(input)?))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
