// # IP Source Trait
//
// Defines the interface for determining the public IPv4 address to publish.
//
// ## Implementations
//
// - `StaticIpSource` (this module): an address supplied on the command line
// - `HttpIpSource` (`ddns-ip-http` crate): a public address-echo service

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for IP source implementations
///
/// The address is resolved once per run and applied to every mapping entry.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current public IPv4 address
    ///
    /// # Returns
    ///
    /// - `Ok(Ipv4Addr)`: The address to publish
    /// - `Err(Error::Resolution)`: If the address cannot be determined
    async fn current(&self) -> Result<Ipv4Addr, crate::Error>;

    /// Name of the source (for logging)
    fn source_name(&self) -> &'static str;
}

/// An IP source that always returns an externally supplied address
#[derive(Debug, Clone, Copy)]
pub struct StaticIpSource {
    ip: Ipv4Addr,
}

impl StaticIpSource {
    pub fn new(ip: Ipv4Addr) -> Self {
        Self { ip }
    }
}

#[async_trait]
impl IpSource for StaticIpSource {
    async fn current(&self) -> Result<Ipv4Addr, crate::Error> {
        Ok(self.ip)
    }

    fn source_name(&self) -> &'static str {
        "static"
    }
}
