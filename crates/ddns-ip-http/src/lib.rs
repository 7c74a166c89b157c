// # HTTP IP Source
//
// This crate provides the address-echo IP source for the DDNS updater.
//
// ## Purpose
//
// A host behind NAT cannot see its public address on any local interface,
// so the address to publish is asked from a public "what is my IP" service
// (ipify by default), requested in JSON form:
//
// ```text
// GET https://api.ipify.org?format=json
// {"ip":"203.0.113.7"}
// ```
//
// Only IPv4 is accepted. Any failure is a resolution error, which aborts
// the run: without an address there is nothing to publish.

use ddns_core::config::{AddressEchoConfig, DEFAULT_ADDRESS_ECHO_URL};
use ddns_core::traits::IpSource;
use ddns_core::{Error, Result};

use serde::Deserialize;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Default request timeout for the address-echo service
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Body returned by the address-echo service
#[derive(Debug, Deserialize)]
struct EchoResponse {
    ip: Option<String>,
}

/// Address-echo IP source
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// Service URL (without the `format` query)
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: Service URL (e.g., "https://api.ipify.org")
    /// - `timeout`: Request timeout
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Create a source from the `AddressEcho` configuration section
    pub fn from_config(config: &AddressEchoConfig) -> Result<Self> {
        Self::new(config.url.clone(), config.timeout())
    }

    /// Service URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch current IP from the address-echo service
    async fn fetch_ip(&self) -> Result<Ipv4Addr> {
        tracing::debug!("Querying address-echo service {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .query(&[("format", "json")])
            .send()
            .await
            .map_err(|e| Error::resolution(format!("Request to {} failed: {}", self.url, e)))?;

        if !response.status().is_success() {
            return Err(Error::resolution(format!(
                "Address-echo service returned HTTP {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::resolution(format!("Failed to read response: {}", e)))?;

        parse_echo_response(&body)
    }
}

impl Default for HttpIpSource {
    fn default() -> Self {
        Self {
            url: DEFAULT_ADDRESS_ECHO_URL.to_string(),
            client: reqwest::Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }
}

/// Extract the IPv4 address from an address-echo JSON body
fn parse_echo_response(body: &str) -> Result<Ipv4Addr> {
    let echo: EchoResponse = serde_json::from_str(body)
        .map_err(|e| Error::resolution(format!("Invalid JSON from address-echo service: {}", e)))?;

    let ip = echo
        .ip
        .ok_or_else(|| Error::resolution("Address-echo response has no 'ip' field"))?;

    ip.trim()
        .parse()
        .map_err(|_| Error::resolution(format!("Expected an IPv4 address, got: {}", ip)))
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        let ip = self.fetch_ip().await?;
        tracing::info!("Public address from {}: {}", self.url, ip);
        Ok(ip)
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}

/// Determine the address to publish
///
/// An explicitly supplied address wins; otherwise `source` is asked.
pub async fn resolve(explicit: Option<Ipv4Addr>, source: &dyn IpSource) -> Result<Ipv4Addr> {
    match explicit {
        Some(ip) => {
            tracing::info!("Using supplied address {}", ip);
            Ok(ip)
        }
        None => source.current().await,
    }
}
