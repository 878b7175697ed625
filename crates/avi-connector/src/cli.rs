//! Command-line arguments and process startup.

use crate::config::ConnectorConfig;
use crate::{routes, server, telemetry};
use anyhow::{Context, Result};
use avi_discovery::DiscoveryService;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Certificate discovery connector for VMware NSX Advanced Load Balancer
///
/// Serves the connector API consumed by the certificate management
/// platform. Flags override the configuration file.
#[derive(Parser, Debug)]
#[command(name = "vmware-avi-connector")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file
    #[arg(
        short,
        long,
        env = "AVI_CONNECTOR_CONFIG",
        default_value = "connector.toml"
    )]
    pub config: PathBuf,

    /// Listen address
    #[arg(short, long, env = "AVI_CONNECTOR_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Controller request timeout in seconds
    #[arg(long, env = "AVI_CONNECTOR_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Verify controller TLS certificates
    #[arg(long, env = "AVI_CONNECTOR_VERIFY_TLS")]
    pub verify_tls: bool,

    /// Controller requests per second
    #[arg(long, env = "AVI_CONNECTOR_RATE_LIMIT")]
    pub rate_limit: Option<u32>,

    /// Log as JSON lines
    #[arg(long, env = "AVI_CONNECTOR_JSON_LOGS")]
    pub json_logs: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,
}

impl Cli {
    /// Apply flag overrides on top of `config`.
    pub fn apply(&self, mut config: ConnectorConfig) -> ConnectorConfig {
        if let Some(listen) = self.listen {
            config.listen = listen;
        }
        if let Some(timeout) = self.timeout {
            config.controller.timeout_secs = timeout;
        }
        if self.verify_tls {
            config.controller.accept_invalid_certs = false;
        }
        if let Some(rate) = self.rate_limit {
            config.controller.requests_per_second = rate;
        }
        if self.json_logs {
            config.logging.json = true;
        }
        config
    }
}

/// Run the connector process.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = ConnectorConfig::load(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    let config = cli.apply(config);

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    telemetry::init(&config.logging)?;

    let client = config
        .controller
        .client()
        .context("failed to create the controller client")?;
    let app = routes::router(DiscoveryService::new(client));

    server::serve(config.listen, app).await?;
    Ok(())
}
