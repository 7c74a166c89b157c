//! Configuration types for the DDNS updater
//!
//! The configuration file is TOML with one section per concern:
//!
//! ```toml
//! [NamecheapAPI]
//! api_user = "alice"
//! api_key = "0123456789abcdef"
//! username = "alice"
//! client_ip = "203.0.113.7"
//!
//! [Domains]
//! subdomains = "home:example.com, api:example.com"
//!
//! [AddressEcho]
//! url = "https://api.ipify.org"
//! ```
//!
//! Credentials may also come from the environment (`DDNS_NAMECHEAP_*`),
//! which overrides the file. Everything is validated before the first
//! network call; any problem is an [`Error::Config`].

use crate::error::{Error, Result};
use crate::record::{DomainName, MappingEntry};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Environment variable overriding `NamecheapAPI.api_user`
pub const ENV_API_USER: &str = "DDNS_NAMECHEAP_API_USER";
/// Environment variable overriding `NamecheapAPI.api_key`
pub const ENV_API_KEY: &str = "DDNS_NAMECHEAP_API_KEY";
/// Environment variable overriding `NamecheapAPI.username`
pub const ENV_USERNAME: &str = "DDNS_NAMECHEAP_USERNAME";
/// Environment variable overriding `NamecheapAPI.client_ip`
pub const ENV_CLIENT_IP: &str = "DDNS_NAMECHEAP_CLIENT_IP";

/// Default address-echo service
pub const DEFAULT_ADDRESS_ECHO_URL: &str = "https://api.ipify.org";

/// Registrar API credentials, required on every call
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// API user
    #[serde(default)]
    pub api_user: String,

    /// API key
    /// ⚠️ NEVER log this value
    #[serde(default)]
    pub api_key: String,

    /// Account the domains belong to
    #[serde(default, rename = "username")]
    pub account_username: String,

    /// Whitelisted client IP the registrar expects
    #[serde(default)]
    pub client_ip: String,
}

impl Credentials {
    pub fn new(
        api_user: impl Into<String>,
        api_key: impl Into<String>,
        account_username: impl Into<String>,
        client_ip: impl Into<String>,
    ) -> Self {
        Self {
            api_user: api_user.into(),
            api_key: api_key.into(),
            account_username: account_username.into(),
            client_ip: client_ip.into(),
        }
    }

    /// Strip surrounding whitespace from every field
    pub fn trim(&mut self) {
        for field in [
            &mut self.api_user,
            &mut self.api_key,
            &mut self.account_username,
            &mut self.client_ip,
        ] {
            let trimmed = field.trim();
            if trimmed.len() != field.len() {
                *field = trimmed.to_string();
            }
        }
    }

    /// Validate that every field is present and the client IP is IPv4
    ///
    /// Values are checked as they will be sent, so padded values are
    /// rejected; [`Credentials::trim`] normalises them.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("api_user", &self.api_user),
            ("api_key", &self.api_key),
            ("username", &self.account_username),
            ("client_ip", &self.client_ip),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(Error::config(format!(
                    "NamecheapAPI.{} is required (or set it via the environment)",
                    name
                )));
            }
        }

        if self.client_ip.parse::<Ipv4Addr>().is_err() {
            return Err(Error::config(format!(
                "NamecheapAPI.client_ip must be an IPv4 address. Got: {}",
                self.client_ip
            )));
        }

        Ok(())
    }
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_user", &self.api_user)
            .field("api_key", &"<REDACTED>")
            .field("account_username", &self.account_username)
            .field("client_ip", &self.client_ip)
            .finish()
    }
}

/// Registrar transport settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrarConfig {
    /// Use the registrar's sandbox environment
    #[serde(default)]
    pub sandbox: bool,

    /// Per-call timeout in seconds
    #[serde(default = "default_registrar_timeout_secs")]
    pub timeout_secs: u64,

    /// Explicit API endpoint, overriding `sandbox`
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl RegistrarConfig {
    /// Per-call timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for RegistrarConfig {
    fn default() -> Self {
        Self {
            sandbox: false,
            timeout_secs: default_registrar_timeout_secs(),
            endpoint: None,
        }
    }
}

/// Address-echo service settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressEchoConfig {
    /// Service URL, queried with `?format=json`
    #[serde(default = "default_address_echo_url")]
    pub url: String,

    /// Request timeout in seconds
    #[serde(default = "default_address_echo_timeout_secs")]
    pub timeout_secs: u64,
}

impl AddressEchoConfig {
    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for AddressEchoConfig {
    fn default() -> Self {
        Self {
            url: default_address_echo_url(),
            timeout_secs: default_address_echo_timeout_secs(),
        }
    }
}

/// Validated configuration of one updater run
#[derive(Debug, Clone)]
pub struct UpdaterConfig {
    /// Registrar credentials
    pub credentials: Credentials,

    /// Registrar transport settings
    pub registrar: RegistrarConfig,

    /// Address-echo settings
    pub address_echo: AddressEchoConfig,

    /// Records this run is responsible for, in configuration order
    pub mappings: Vec<MappingEntry>,

    /// Entries from `Domains.subdomains` that were skipped
    pub skipped_entries: Vec<String>,
}

/// On-disk layout
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(rename = "NamecheapAPI")]
    namecheap: NamecheapSection,

    #[serde(rename = "Domains")]
    domains: DomainsSection,

    #[serde(rename = "AddressEcho", default)]
    address_echo: AddressEchoConfig,
}

#[derive(Debug, Deserialize)]
struct NamecheapSection {
    #[serde(flatten)]
    credentials: Credentials,

    #[serde(flatten)]
    registrar: RegistrarConfig,
}

#[derive(Debug, Deserialize)]
struct DomainsSection {
    #[serde(default)]
    subdomains: String,
}

impl UpdaterConfig {
    /// Load, apply environment overrides and validate
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Cannot read configuration file {}: {}",
                path.display(),
                e
            ))
        })?;

        let mut config = Self::from_toml_str(&contents)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        debug!(
            "Loaded configuration from {} ({} mapping(s))",
            path.display(),
            config.mappings.len()
        );
        Ok(config)
    }

    /// Parse a TOML document without validating it
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents)
            .map_err(|e| Error::config(format!("Invalid configuration: {}", e)))?;

        let parsed = parse_subdomains(&file.domains.subdomains)?;

        let mut credentials = file.namecheap.credentials;
        credentials.trim();

        Ok(Self {
            credentials,
            registrar: file.namecheap.registrar,
            address_echo: file.address_echo,
            mappings: parsed.entries,
            skipped_entries: parsed.skipped,
        })
    }

    /// Override credentials from the environment
    ///
    /// `lookup` returns the value of an environment variable; empty values
    /// are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let overrides = [
            (ENV_API_USER, &mut self.credentials.api_user),
            (ENV_API_KEY, &mut self.credentials.api_key),
            (ENV_USERNAME, &mut self.credentials.account_username),
            (ENV_CLIENT_IP, &mut self.credentials.client_ip),
        ];

        for (key, slot) in overrides {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                debug!("Using {} from the environment", key);
                *slot = value.trim().to_string();
            }
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.credentials.validate()?;

        if self.mappings.is_empty() {
            return Err(Error::config(
                "Domains.subdomains must contain at least one subdomain:domain entry",
            ));
        }

        validate_timeout("NamecheapAPI.timeout_secs", self.registrar.timeout_secs)?;
        validate_timeout("AddressEcho.timeout_secs", self.address_echo.timeout_secs)?;

        if let Some(endpoint) = &self.registrar.endpoint {
            validate_url("NamecheapAPI.endpoint", endpoint)?;
        }
        validate_url("AddressEcho.url", &self.address_echo.url)?;

        Ok(())
    }
}

fn validate_timeout(name: &str, secs: u64) -> Result<()> {
    if !(1..=300).contains(&secs) {
        return Err(Error::config(format!(
            "{} must be between 1 and 300 seconds. Got: {}",
            name, secs
        )));
    }
    Ok(())
}

fn validate_url(name: &str, url: &str) -> Result<()> {
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(Error::config(format!(
            "{} must use HTTP or HTTPS scheme. Got: {}",
            name, url
        )));
    }
    if url.starts_with("http://") {
        warn!("{} uses HTTP (not HTTPS)", name);
    }
    Ok(())
}

/// Result of parsing `Domains.subdomains`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedMappings {
    /// Valid entries, in order, without duplicates
    pub entries: Vec<MappingEntry>,
    /// Entries that were skipped with a warning
    pub skipped: Vec<String>,
}

/// Parse a comma-separated list of `subdomain:parent_domain` entries
///
/// Entries without a colon or with an empty subdomain are skipped with a
/// warning. A parent domain that is not exactly two labels is fatal, since
/// it cannot be addressed by the registrar.
pub fn parse_subdomains(input: &str) -> Result<ParsedMappings> {
    let mut parsed = ParsedMappings::default();

    for raw in input.split(',') {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }

        let Some((subdomain, domain)) = raw.split_once(':') else {
            warn!("Invalid subdomain entry '{}' (expected subdomain:domain), skipping", raw);
            parsed.skipped.push(raw.to_string());
            continue;
        };

        let subdomain = subdomain.trim();
        if subdomain.is_empty() {
            warn!("Subdomain entry '{}' has an empty subdomain, skipping", raw);
            parsed.skipped.push(raw.to_string());
            continue;
        }

        let domain = DomainName::parse(domain)
            .map_err(|e| Error::config(format!("Subdomain entry '{}': {}", raw, e)))?;

        let entry = MappingEntry::new(subdomain, domain);
        if parsed.entries.contains(&entry) {
            debug!("Duplicate subdomain entry '{}' ignored", raw);
            continue;
        }
        parsed.entries.push(entry);
    }

    Ok(parsed)
}

fn default_registrar_timeout_secs() -> u64 {
    30
}

fn default_address_echo_url() -> String {
    DEFAULT_ADDRESS_ECHO_URL.to_string()
}

fn default_address_echo_timeout_secs() -> u64 {
    10
}
