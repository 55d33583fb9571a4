//! Private, loopback and link-local address detection.

use ipnet::IpNet;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;
use url::Host;

static BLOCKED_CIDRS: LazyLock<Vec<IpNet>> = LazyLock::new(|| {
    [
        "0.0.0.0/8",      // "this" network
        "10.0.0.0/8",     // RFC 1918
        "100.64.0.0/10",  // carrier-grade NAT
        "127.0.0.0/8",    // loopback
        "169.254.0.0/16", // link-local / cloud metadata
        "172.16.0.0/12",  // RFC 1918
        "192.168.0.0/16", // RFC 1918
        "::/128",         // unspecified
        "::1/128",        // loopback
        "fc00::/7",       // unique local
        "fe80::/10",      // link-local
    ]
    .iter()
    .map(|cidr| cidr.parse().unwrap())
    .collect()
});

/// Literal prefixes checked against the hostname text, so that names like
/// `127.0.0.1.nip.io` are refused before DNS is consulted.
const PRIVATE_HOST_PREFIXES: &[&str] = &["127.", "10.", "192.168.", "0.", "169.254."];

pub fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_private_v4(v4),
        IpAddr::V6(v6) => is_private_v6(v6),
    }
}

fn is_private_v4(ip: Ipv4Addr) -> bool {
    ip.is_unspecified()
        || ip.is_broadcast()
        || BLOCKED_CIDRS.iter().any(|cidr| cidr.contains(&IpAddr::V4(ip)))
}

fn is_private_v6(ip: Ipv6Addr) -> bool {
    if let Some(mapped) = ip.to_ipv4_mapped() {
        return is_private_v4(mapped);
    }
    BLOCKED_CIDRS.iter().any(|cidr| cidr.contains(&IpAddr::V6(ip)))
}

/// Checks a parsed URL host.
pub fn is_private_host(host: &Host<&str>) -> bool {
    match host {
        Host::Ipv4(ip) => is_private_v4(*ip),
        Host::Ipv6(ip) => is_private_v6(*ip),
        Host::Domain(domain) => is_private_hostname(domain),
    }
}

/// Checks the literal hostname text.
pub fn is_private_hostname(hostname: &str) -> bool {
    let host = hostname
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim_end_matches('.')
        .to_ascii_lowercase();

    if host == "localhost" || host.ends_with(".localhost") {
        return true;
    }

    if let Ok(ip) = host.parse::<IpAddr>() {
        return is_private_ip(ip);
    }

    if PRIVATE_HOST_PREFIXES.iter().any(|prefix| host.starts_with(prefix)) {
        return true;
    }

    is_rfc1918_172(&host)
}

fn is_rfc1918_172(host: &str) -> bool {
    let Some(rest) = host.strip_prefix("172.") else {
        return false;
    };
    rest.split('.')
        .next()
        .and_then(|octet| octet.parse::<u8>().ok())
        .is_some_and(|octet| (16..=31).contains(&octet))
}
