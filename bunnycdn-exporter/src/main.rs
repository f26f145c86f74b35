//! Prometheus exporter for BunnyCDN.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info, warn};

use bunnycdn_api::ApiClient;
use bunnycdn_exporter::{Exporter, ExporterConfig, HttpServer, MetricSet, init_tracing};

/// Prometheus exporter for BunnyCDN.
#[derive(Parser, Debug)]
#[command(name = "bunnycdn-exporter")]
#[command(about = "Export BunnyCDN statistics as Prometheus metrics")]
#[command(version)]
struct Args {
    /// Path to configuration file (JSON5 format).
    #[arg(short, long)]
    config: Option<String>,

    /// HTTP listen address (overrides config).
    #[arg(long)]
    listen: Option<String>,

    /// Path under which to expose metrics (overrides config).
    #[arg(long)]
    path: Option<String>,

    /// BunnyCDN API URI (overrides config).
    #[arg(long)]
    api_uri: Option<String>,

    /// BunnyCDN API key (overrides config).
    #[arg(long, env = "BUNNYCDN_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Skip TLS certificate verification of the API URI.
    #[arg(long)]
    no_ssl_verify: bool,

    /// Timeout for each API request, e.g. "10s" or "500ms" (overrides config).
    #[arg(long, value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn apply(self, config: &mut ExporterConfig) {
        if let Some(listen) = self.listen {
            config.prometheus.listen = listen;
        }
        if let Some(path) = self.path {
            config.prometheus.path = path;
        }
        if let Some(uri) = self.api_uri {
            config.api.uri = uri;
        }
        if let Some(key) = self.api_key {
            config.api.api_key = key;
        }
        if self.no_ssl_verify {
            config.api.ssl_verify = false;
        }
        if let Some(timeout) = self.timeout {
            config.api.timeout = timeout;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        ExporterConfig::load_from_file(config_path)?
    } else {
        ExporterConfig::default()
    };
    args.apply(&mut config);
    config.validate()?;

    init_tracing(&config.logging)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting BunnyCDN exporter");
    if config.api.api_key.is_empty() {
        warn!("No API key configured, requests to BunnyCDN will be rejected");
    }
    if !config.api.ssl_verify {
        warn!(uri = %config.api.uri, "TLS certificate verification disabled");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let client = ApiClient::new(&config.api)?;
    let metrics = Arc::new(MetricSet::standard(config.prometheus.prefix.clone()));
    let exporter = Arc::new(Exporter::new(client, metrics, config.scrape.clone()));
    info!(
        uri = %config.api.uri,
        metrics = exporter.describe().len(),
        "Exporter ready"
    );

    let listen_addr = config
        .prometheus
        .listen
        .parse::<std::net::SocketAddr>()
        .map_err(|e| anyhow::anyhow!("Invalid listen address: {}", e))?;

    let http_server = HttpServer::new(
        exporter.clone(),
        listen_addr,
        config.prometheus.path.clone(),
    );

    let http_shutdown = shutdown_rx.clone();
    let http_task = tokio::spawn(async move {
        if let Err(e) = http_server.run(http_shutdown).await {
            error!("HTTP server error: {}", e);
        }
    });

    // Wait for shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate() => {
            info!("Received SIGTERM, shutting down...");
        }
    }

    shutdown_tx.send(true)?;

    let _ = tokio::time::timeout(Duration::from_secs(5), http_task).await;

    let stats = exporter.stats().await;
    info!(
        total_scrapes = stats.total_scrapes,
        api_calls = stats.api_calls,
        errors = stats.errors,
        "Final statistics"
    );

    info!("Exporter stopped");
    Ok(())
}

#[cfg(unix)]
async fn terminate() {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!(error = %e, "Unable to listen for SIGTERM");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}
