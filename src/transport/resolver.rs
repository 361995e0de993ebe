//! Domain name resolution

use async_trait::async_trait;
use std::fmt::Debug;
use std::io;
use std::net::IpAddr;

/// Resolves a DOMAINNAME request target to an IP address
#[async_trait]
pub trait DomainResolver: Send + Sync + Debug {
    /// Resolve `domain` to a single IP address
    async fn resolve(&self, domain: &str) -> io::Result<IpAddr>;
}

/// Resolver backed by the operating system (`getaddrinfo` via tokio)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

#[async_trait]
impl DomainResolver for SystemResolver {
    async fn resolve(&self, domain: &str) -> io::Result<IpAddr> {
        tokio::net::lookup_host((domain, 0))
            .await?
            .next()
            .map(|addr| addr.ip())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no addresses found for domain: {}", domain),
                )
            })
    }
}
