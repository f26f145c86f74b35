//! Prometheus exporter for BunnyCDN.
//!
//! Every request to the metrics endpoint triggers one scrape of the BunnyCDN
//! API: the account's pull zones are listed, each zone's statistics for the
//! current day are fetched, and the figures are exposed as gauges.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │  BunnyCDN API   │<────│    Exporter     │<────│   HTTP Server   │
//! │ (zones, stats)  │     │    (scrape)     │     │   (/metrics)    │
//! └─────────────────┘     └─────────────────┘     └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```bash
//! BUNNYCDN_API_KEY=... bunnycdn-exporter --config config.json5
//! ```
//!
//! # Configuration
//!
//! See [`config::ExporterConfig`] for configuration options.

pub mod config;
pub mod http;
pub mod metrics;
pub mod registry;
pub mod scrape;

pub use config::ExporterConfig;
pub use http::HttpServer;
pub use metrics::{MetricDescriptor, MetricSet, Sample};
pub use scrape::{Exporter, ScrapeReport, ScrapeStats, SharedExporter};

use config::{LogFormat, LoggingConfig};

/// Initialize tracing from the logging configuration.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(config: &LoggingConfig) -> anyhow::Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(filter)
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json())
                .with(filter)
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;
        }
    }

    Ok(())
}
