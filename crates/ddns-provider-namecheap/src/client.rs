//! Authenticated transport to the Namecheap XML API
//!
//! Every call is a form-encoded HTTPS POST carrying the credentials. The
//! registrar reports its own failures with HTTP 200 and an XML error
//! document, so anything below HTTP level (connection, timeout, non-2xx) is
//! a transport error and never confused with a registrar error.

use crate::codec::{self, Command, Params};
use ddns_core::{Credentials, DomainName, Error, RecordSet, RegistrarConfig, Result};
use reqwest::StatusCode;
use std::time::Duration;

/// Production API endpoint
pub const PRODUCTION_ENDPOINT: &str = "https://api.namecheap.com/xml.response";

/// Sandbox API endpoint
pub const SANDBOX_ENDPOINT: &str = "https://api.sandbox.namecheap.com/xml.response";

/// Default HTTP timeout for API requests (30 seconds)
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest slice of an error body quoted in error messages
const MAX_QUOTED_BODY: usize = 512;

/// Namecheap API client
///
/// Holds immutable credentials; the Debug output never shows the API key.
#[derive(Debug, Clone)]
pub struct NamecheapClient {
    credentials: Credentials,
    endpoint: String,
    client: reqwest::Client,
}

impl NamecheapClient {
    /// Create a client for `endpoint` with an explicit per-call timeout
    pub fn new(credentials: Credentials, endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            credentials,
            endpoint: endpoint.into(),
            client,
        })
    }

    /// Create a client from the registrar section of the configuration
    pub fn from_config(credentials: &Credentials, registrar: &RegistrarConfig) -> Result<Self> {
        let endpoint = match (&registrar.endpoint, registrar.sandbox) {
            (Some(endpoint), _) => endpoint.clone(),
            (None, true) => SANDBOX_ENDPOINT.to_string(),
            (None, false) => PRODUCTION_ENDPOINT.to_string(),
        };

        Self::new(credentials.clone(), endpoint, registrar.timeout())
    }

    /// Endpoint every call is sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Credentials every call is authenticated with
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Issue `getHosts` for `domain` and return the raw response
    pub async fn fetch_records(&self, domain: &DomainName) -> Result<String> {
        let params = codec::encode(domain, Command::GetHosts, &self.credentials, &RecordSet::new());
        self.call(Command::GetHosts, domain, &params).await
    }

    /// Issue `setHosts` for `domain` with the complete record set and return
    /// the raw response
    pub async fn submit_records(&self, domain: &DomainName, records: &RecordSet) -> Result<String> {
        let params = codec::encode(domain, Command::SetHosts, &self.credentials, records);
        self.call(Command::SetHosts, domain, &params).await
    }

    async fn call(&self, command: Command, domain: &DomainName, params: &Params) -> Result<String> {
        tracing::debug!("POST {} {} for {}", self.endpoint, command, domain);

        let response = self
            .client
            .post(&self.endpoint)
            .form(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::transport(format!("{} for {} timed out: {}", command, domain, e))
                } else {
                    Error::transport(format!("{} for {} failed: {}", command, domain, e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(status_error(command, status, &error_text));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("Failed to read {} response: {}", command, e)))?;

        tracing::debug!("{} for {} returned {} bytes", command, domain, body.len());
        Ok(body)
    }
}

fn status_error(command: Command, status: StatusCode, body: &str) -> Error {
    let body: String = body.chars().take(MAX_QUOTED_BODY).collect();

    match status.as_u16() {
        401 | 403 => Error::transport(format!(
            "{} refused: authentication or IP whitelisting problem. Status: {}",
            command, status
        )),
        429 => Error::transport(format!(
            "{} rate limited. Please retry later. Status: {}",
            command, status
        )),
        500..=599 => Error::transport(format!(
            "Namecheap server error (transient) on {}: {} - {}",
            command, status, body
        )),
        _ => Error::transport(format!("{} failed: {} - {}", command, status, body)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials::new("alice", "secret_key_12345", "alice", "203.0.113.7")
    }

    #[test]
    fn endpoint_selection() {
        let production = NamecheapClient::from_config(&credentials(), &RegistrarConfig::default()).unwrap();
        assert_eq!(production.endpoint(), PRODUCTION_ENDPOINT);

        let sandbox = RegistrarConfig {
            sandbox: true,
            ..RegistrarConfig::default()
        };
        let client = NamecheapClient::from_config(&credentials(), &sandbox).unwrap();
        assert_eq!(client.endpoint(), SANDBOX_ENDPOINT);

        let explicit = RegistrarConfig {
            sandbox: true,
            endpoint: Some("http://127.0.0.1:9/xml.response".to_string()),
            ..RegistrarConfig::default()
        };
        let client = NamecheapClient::from_config(&credentials(), &explicit).unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:9/xml.response");
    }

    #[test]
    fn api_key_not_exposed_in_debug() {
        let client = NamecheapClient::new(credentials(), PRODUCTION_ENDPOINT, DEFAULT_HTTP_TIMEOUT).unwrap();

        let debug_str = format!("{:?}", client);
        assert!(!debug_str.contains("secret_key_12345"));
        assert!(debug_str.contains("NamecheapClient"));
    }

    #[test]
    fn status_errors_are_transport_errors() {
        for code in [401u16, 403, 404, 429, 500, 503] {
            let status = StatusCode::from_u16(code).unwrap();
            let err = status_error(Command::GetHosts, status, "body");
            assert!(matches!(err, Error::Transport(_)), "{code}");
        }
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let body = "x".repeat(10_000);
        let err = status_error(Command::SetHosts, StatusCode::BAD_GATEWAY, &body);
        assert!(err.to_string().len() < 1_000);
    }
}
