// # ddns-update - Namecheap dynamic DNS updater
//
// One-shot command: publish the current public IPv4 address as the A record
// of every configured subdomain, then exit. Schedule it with cron or a
// systemd timer.
//
// This binary is a thin integration layer: argument parsing, logging setup,
// wiring of config, provider and address source. All update logic lives in
// ddns-core.
//
// ## Usage
//
// ```bash
// ddns-update                       # address from the address-echo service
// ddns-update 203.0.113.7           # publish this address
// ddns-update --config /etc/ddns/config.toml --dry-run
// ```
//
// ## Environment
//
// - `DDNS_CONFIG`: configuration file (default `config.toml`)
// - `DDNS_MODE=dry-run`: same as `--dry-run`
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error
// - `DDNS_NAMECHEAP_API_USER`, `DDNS_NAMECHEAP_API_KEY`,
//   `DDNS_NAMECHEAP_USERNAME`, `DDNS_NAMECHEAP_CLIENT_IP`: override the
//   `[NamecheapAPI]` credentials

use clap::Parser;
use clap::error::ErrorKind;
use ddns_core::{DdnsEngine, EngineOptions, RunReport, UpdaterConfig};
use ddns_ip_http::HttpIpSource;
use ddns_provider_namecheap::NamecheapProvider;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Value of `DDNS_MODE` that enables dry-run
const DRY_RUN_MODE: &str = "dry-run";

/// Exit codes for the possible run outcomes
///
/// - 0: Every entry was updated (or already current)
/// - 1: Configuration or usage error
/// - 2: Address resolution or runtime error
/// - 3: One or more entries failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    /// All entries succeeded
    Success = 0,
    /// Configuration error or bad arguments
    ConfigError = 1,
    /// No address to publish, or the runtime failed
    RuntimeError = 2,
    /// At least one entry failed
    UpdateFailed = 3,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl From<&RunReport> for DdnsExitCode {
    fn from(report: &RunReport) -> Self {
        if report.all_succeeded() {
            DdnsExitCode::Success
        } else {
            DdnsExitCode::UpdateFailed
        }
    }
}

/// Publish this host's public IPv4 address to Namecheap DNS
#[derive(Debug, Parser)]
#[command(name = "ddns-update", version, about)]
struct Cli {
    /// Address to publish; asked from the address-echo service when omitted
    ip: Option<Ipv4Addr>,

    /// Configuration file
    #[arg(short, long, env = "DDNS_CONFIG", default_value = "config.toml")]
    config: PathBuf,

    /// Fetch records and log the update without submitting it
    #[arg(long)]
    dry_run: bool,

    /// Submit even when the record already holds the address
    #[arg(long)]
    force: bool,

    /// Log level
    #[arg(long, env = "DDNS_LOG_LEVEL", default_value = "info")]
    log_level: Level,
}

impl Cli {
    /// Dry-run requested by flag or by `DDNS_MODE`
    fn dry_run(&self, mode: Option<&str>) -> bool {
        self.dry_run || mode.is_some_and(|m| m.trim().eq_ignore_ascii_case(DRY_RUN_MODE))
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => DdnsExitCode::Success,
                _ => DdnsExitCode::ConfigError,
            }
            .into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let dry_run = cli.dry_run(std::env::var("DDNS_MODE").ok().as_deref());

    let config = match UpdaterConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    info!(
        "Starting ddns-update: {} record(s), config {}",
        config.mappings.len(),
        cli.config.display()
    );

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run(cli, config, dry_run)).into()
}

/// Resolve the address and update every mapping entry
async fn run(cli: Cli, config: UpdaterConfig, dry_run: bool) -> DdnsExitCode {
    let provider = match NamecheapProvider::from_config(&config, dry_run) {
        Ok(provider) => provider,
        Err(e) => {
            error!("Failed to create Namecheap provider: {}", e);
            return DdnsExitCode::ConfigError;
        }
    };

    let source = match HttpIpSource::from_config(&config.address_echo) {
        Ok(source) => source,
        Err(e) => {
            error!("Failed to create address source: {}", e);
            return DdnsExitCode::ConfigError;
        }
    };

    let address = match ddns_ip_http::resolve(cli.ip, &source).await {
        Ok(address) => address,
        Err(e) => {
            error!("Could not determine the address to publish: {}", e);
            return DdnsExitCode::RuntimeError;
        }
    };

    let options = EngineOptions { force: cli.force };
    let (engine, _events) = match DdnsEngine::new(Box::new(provider), config.mappings, options) {
        Ok(parts) => parts,
        Err(e) => {
            error!("Failed to create engine: {}", e);
            return DdnsExitCode::ConfigError;
        }
    };

    let report = engine.run(address).await;

    info!(
        "Finished: {} succeeded, {} failed{}",
        report.succeeded(),
        report.failed(),
        if dry_run { " (dry run)" } else { "" }
    );

    DdnsExitCode::from(&report)
}
