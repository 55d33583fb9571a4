//! The trust gate: nothing is fetched unless it passes here first.
//!
//! Checks run against the literal URL (private-address, scheme, allowlist)
//! and then, in [`TrustGate::validate_resolved`], against the addresses the
//! host resolves to.

pub mod errors;
pub mod network;
pub mod resolver;

pub use errors::RejectReason;
pub use resolver::{HostResolver, StaticResolver, SystemResolver};

use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use crate::sources::{SourceEntry, SourceRegistry};

/// A URL that passed the gate. Only the gate can build one.
#[derive(Debug, Clone)]
pub struct ValidatedUrl {
    url: Url,
    matched_source: SourceEntry,
    resolved: Vec<SocketAddr>,
}

impl ValidatedUrl {
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    pub fn matched_source(&self) -> &SourceEntry {
        &self.matched_source
    }

    /// Addresses checked during DNS re-validation; empty if only the
    /// literal checks ran.
    pub fn resolved(&self) -> &[SocketAddr] {
        &self.resolved
    }
}

#[derive(Clone)]
pub struct TrustGate {
    registry: Arc<SourceRegistry>,
    resolver: Arc<dyn HostResolver>,
}

impl TrustGate {
    pub fn new(registry: Arc<SourceRegistry>, resolver: Arc<dyn HostResolver>) -> Self {
        Self { registry, resolver }
    }

    pub fn with_system_resolver(registry: Arc<SourceRegistry>) -> Self {
        Self::new(registry, Arc::new(SystemResolver))
    }

    /// Literal checks only: private address, then scheme, then allowlist.
    pub fn validate(&self, url: &str) -> Result<ValidatedUrl, RejectReason> {
        let result = self.validate_literal(url);
        if let Err(reason) = &result {
            warn!(url = %url, reason = reason.as_str(), "link rejected");
        }
        result
    }

    /// Literal checks followed by DNS resolution. Every resolved address
    /// must be public.
    pub async fn validate_resolved(&self, url: &str) -> Result<ValidatedUrl, RejectReason> {
        let mut validated = self.validate(url)?;

        let host = validated.host().to_string();
        let port = validated.url.port_or_known_default().unwrap_or(443);

        let addrs = match self.resolver.resolve(&host, port).await {
            Ok(addrs) if !addrs.is_empty() => addrs,
            Ok(_) => {
                warn!(url = %url, host = %host, "link host resolved to no addresses");
                return Err(RejectReason::UnresolvableHost);
            }
            Err(e) => {
                warn!(url = %url, host = %host, error = %e, "link host failed to resolve");
                return Err(RejectReason::UnresolvableHost);
            }
        };

        if let Some(addr) = addrs.iter().find(|addr| network::is_private_ip(addr.ip())) {
            warn!(
                url = %url,
                host = %host,
                resolved = %addr.ip(),
                reason = RejectReason::PrivateAddress.as_str(),
                "link host resolved to a private address"
            );
            return Err(RejectReason::PrivateAddress);
        }

        debug!(host = %host, addrs = ?addrs, "link host resolved");
        validated.resolved = addrs;
        Ok(validated)
    }

    fn validate_literal(&self, url: &str) -> Result<ValidatedUrl, RejectReason> {
        let parsed = Url::parse(url.trim()).map_err(|_| RejectReason::InvalidUrl)?;

        check_private(&parsed)?;
        check_scheme(&parsed)?;
        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(RejectReason::InvalidUrl);
        }
        let matched_source = self.check_allowlist(&parsed)?.clone();

        Ok(ValidatedUrl {
            url: parsed,
            matched_source,
            resolved: Vec::new(),
        })
    }

    /// The host (minus `www.`) must be a registry domain or a subdomain of one.
    pub fn check_allowlist(&self, url: &Url) -> Result<&SourceEntry, RejectReason> {
        url.host_str()
            .and_then(|host| self.registry.lookup(host))
            .ok_or(RejectReason::DomainNotAllowlisted)
    }

    pub fn registry(&self) -> &Arc<SourceRegistry> {
        &self.registry
    }
}

/// Rejects literal loopback, private and link-local hosts.
pub fn check_private(url: &Url) -> Result<(), RejectReason> {
    match url.host() {
        Some(host) if network::is_private_host(&host) => Err(RejectReason::PrivateAddress),
        _ => Ok(()),
    }
}

/// Only `https` is fetched.
pub fn check_scheme(url: &Url) -> Result<(), RejectReason> {
    if url.scheme() == "https" {
        Ok(())
    } else {
        Err(RejectReason::NonHttps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn registry() -> Arc<SourceRegistry> {
        let entries = ["reuters.com", "example-trusted.com"]
            .into_iter()
            .map(|domain| {
                SourceEntry::new(domain, "محلي", "Foreign", vec![format!("according to {domain}")])
                    .unwrap()
            })
            .collect();
        Arc::new(SourceRegistry::new(entries).unwrap())
    }

    fn gate(resolver: StaticResolver) -> TrustGate {
        TrustGate::new(registry(), Arc::new(resolver))
    }

    fn public_ip() -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34))
    }

    #[test]
    fn test_private_addresses_rejected_before_anything_else() {
        let gate = gate(StaticResolver::new());
        for url in [
            "http://127.0.0.1/x",
            "https://192.168.1.5/y",
            "https://localhost/z",
            "https://10.0.0.8/admin",
            "https://169.254.169.254/latest/meta-data/",
            "https://[::1]/",
            "http://172.20.1.1/",
            "https://0.0.0.0/",
        ] {
            assert_eq!(gate.validate(url).unwrap_err(), RejectReason::PrivateAddress, "{url}");
        }
    }

    #[test]
    fn test_non_https_rejected_even_when_allowlisted() {
        let gate = gate(StaticResolver::new());
        assert_eq!(
            gate.validate("http://www.reuters.com/world/story").unwrap_err(),
            RejectReason::NonHttps
        );
        assert_eq!(gate.validate("ftp://reuters.com/file").unwrap_err(), RejectReason::NonHttps);
        assert_eq!(gate.validate("file:///etc/passwd").unwrap_err(), RejectReason::NonHttps);
        assert_eq!(
            gate.validate("data:text/html,<h1>hi</h1>").unwrap_err(),
            RejectReason::NonHttps
        );
    }

    #[test]
    fn test_domain_allowlist() {
        let gate = gate(StaticResolver::new());
        assert_eq!(
            gate.validate("https://evil.example.com/phish").unwrap_err(),
            RejectReason::DomainNotAllowlisted
        );
        assert_eq!(
            gate.validate("https://reuters.com.evil.net/").unwrap_err(),
            RejectReason::DomainNotAllowlisted
        );
        assert_eq!(
            gate.validate("https://fakereuters.com/").unwrap_err(),
            RejectReason::DomainNotAllowlisted
        );
    }

    #[test]
    fn test_subdomain_accepted() {
        let gate = gate(StaticResolver::new());
        let validated = gate.validate("https://news.example-trusted.com/a/b").unwrap();
        assert_eq!(validated.matched_source().domain(), "example-trusted.com");
        assert_eq!(validated.url().scheme(), "https");
        assert!(validated.resolved().is_empty());

        let validated = gate.validate("https://www.reuters.com/world/story-123").unwrap();
        assert_eq!(validated.matched_source().domain(), "reuters.com");
    }

    #[test]
    fn test_invalid_and_credentialed_urls() {
        let gate = gate(StaticResolver::new());
        assert_eq!(gate.validate("not a url").unwrap_err(), RejectReason::InvalidUrl);
        assert_eq!(
            gate.validate("https://user:pw@www.reuters.com/").unwrap_err(),
            RejectReason::InvalidUrl
        );
    }

    #[test]
    fn test_independent_checks() {
        let url = Url::parse("http://www.reuters.com/").unwrap();
        assert!(check_private(&url).is_ok());
        assert_eq!(check_scheme(&url).unwrap_err(), RejectReason::NonHttps);
        assert!(gate(StaticResolver::new()).check_allowlist(&url).is_ok());
    }

    #[tokio::test]
    async fn test_validate_resolved_accepts_public_address() {
        let gate = gate(StaticResolver::new().with_host("www.reuters.com", public_ip()));
        let validated = gate
            .validate_resolved("https://www.reuters.com/world/story-123")
            .await
            .unwrap();
        assert_eq!(validated.resolved().len(), 1);
        assert_eq!(validated.resolved()[0].port(), 443);
    }

    #[tokio::test]
    async fn test_validate_resolved_blocks_dns_rebinding() {
        let resolver = StaticResolver::new()
            .with_host("www.reuters.com", public_ip())
            .with_host("www.reuters.com", IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)));
        let gate = gate(resolver);
        assert_eq!(
            gate.validate_resolved("https://www.reuters.com/x").await.unwrap_err(),
            RejectReason::PrivateAddress
        );
    }

    #[tokio::test]
    async fn test_validate_resolved_unresolvable() {
        let gate = gate(StaticResolver::new());
        assert_eq!(
            gate.validate_resolved("https://www.reuters.com/x").await.unwrap_err(),
            RejectReason::UnresolvableHost
        );
    }
}
