use beacon_common::network::host::ProbeResult;
use beacon_core::resolver::{SERVICE_SECTION, ServiceDescriptor, ServiceResolver};
use colored::*;

use crate::terminal::colors;

pub type Detail = (String, ColoredString);

pub fn host_to_details(host: &ProbeResult) -> Vec<Detail> {
    vec![("IPv4".to_string(), host.addr.to_string().color(colors::IPV4_ADDR))]
}

pub fn host_name(host: &ProbeResult) -> String {
    host.hostname.clone().unwrap_or_else(|| "No hostname".to_string())
}

/// Tree heading of a service: its title, else where it lives.
pub fn service_name(resolver: &ServiceResolver) -> String {
    resolver
        .cached_descriptor()
        .and_then(|descriptor| descriptor.service_field("title"))
        .unwrap_or_else(|| resolver.target().to_string())
}

pub fn service_to_details(resolver: &ServiceResolver) -> Vec<Detail> {
    let mut details: Vec<Detail> = Vec::new();

    if let Some(addr) = resolver.address() {
        details.push(("IPv4".to_string(), addr.to_string().color(colors::IPV4_ADDR)));
    }
    if let Some(url) = resolver.url() {
        details.push(("URL".to_string(), url.to_string().color(colors::URL)));
    }
    if let Some(descriptor) = resolver.cached_descriptor() {
        details.extend(descriptor_to_details(descriptor));
    }
    details
}

fn descriptor_to_details(descriptor: &ServiceDescriptor) -> Vec<Detail> {
    let mut details: Vec<Detail> = Vec::new();

    if let Some(provider) = descriptor.service_field("provider") {
        details.push(("Provider".to_string(), provider.normal()));
    }
    if let Some(version) = descriptor.service_field("version") {
        details.push(("Version".to_string(), version.color(colors::VERSION)));
    }

    let sections: Vec<&str> = descriptor
        .value()
        .as_object()
        .map(|root| {
            root.keys()
                .map(String::as_str)
                .filter(|key| *key != SERVICE_SECTION)
                .collect()
        })
        .unwrap_or_default();
    if !sections.is_empty() {
        details.push(("Sections".to_string(), sections.join(", ").normal()));
    }
    details
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
