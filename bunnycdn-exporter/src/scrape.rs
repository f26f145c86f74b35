//! Scrape coordination.
//!
//! A scrape lists the account's pull zones, fetches each zone's statistics
//! one after the other and turns them into [`Sample`]s. Scrapes are
//! serialized: the counters and the emitted samples of one scrape are never
//! interleaved with another's.

use std::sync::Arc;

use bunnycdn_api::{
    ApiClient, StatisticsSnapshot, TimeSeries, Zone, decompose_geo_distribution,
    extract_representative_value, representative_value,
};
use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::config::{MissingData, ScrapeConfig};
use crate::metrics::{MetricDescriptor, MetricSet, Sample};

/// Operational counters, shared across scrapes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeStats {
    /// Scrapes started.
    pub total_scrapes: u64,
    /// Requests issued to the BunnyCDN API.
    pub api_calls: u64,
    /// Failed API requests.
    pub errors: u64,
    /// Whether the last scrape could list the pull zones.
    pub up: bool,
}

/// Outcome of one scrape.
#[derive(Debug, Clone)]
pub struct ScrapeReport {
    /// Pull zone listing succeeded.
    pub success: bool,
    /// Statistics samples followed by the `up` gauge, the counters and the
    /// build info.
    pub samples: Vec<Sample>,
}

impl ScrapeReport {
    /// Samples of the metric called `name` (without namespace).
    pub fn samples_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Sample> + 'a {
        self.samples
            .iter()
            .filter(move |s| s.descriptor.name == name)
    }
}

/// Scrapes BunnyCDN on demand.
pub struct Exporter {
    client: ApiClient,
    metrics: Arc<MetricSet>,
    config: ScrapeConfig,
    /// Held for the whole scrape.
    stats: Mutex<ScrapeStats>,
}

/// Shareable exporter handle.
pub type SharedExporter = Arc<Exporter>;

impl Exporter {
    pub fn new(client: ApiClient, metrics: Arc<MetricSet>, config: ScrapeConfig) -> Self {
        Self {
            client,
            metrics,
            config,
            stats: Mutex::new(ScrapeStats::default()),
        }
    }

    pub fn metrics(&self) -> &Arc<MetricSet> {
        &self.metrics
    }

    /// Every metric this exporter may emit.
    pub fn describe(&self) -> Vec<&MetricDescriptor> {
        self.metrics.descriptors()
    }

    /// Current counters. Waits for a running scrape to finish.
    pub async fn stats(&self) -> ScrapeStats {
        self.stats.lock().await.clone()
    }

    /// Run one scrape.
    ///
    /// Never fails: API errors are logged and counted, and only a failed
    /// pull zone listing marks the scrape as unsuccessful.
    pub async fn scrape(&self) -> ScrapeReport {
        let mut stats = self.stats.lock().await;
        let mut samples = Vec::new();

        let success = self.scrape_api(&mut stats, &mut samples).await;
        stats.up = success;
        samples.extend(self.status_samples(&stats));

        ScrapeReport { success, samples }
    }

    async fn scrape_api(&self, stats: &mut ScrapeStats, samples: &mut Vec<Sample>) -> bool {
        stats.total_scrapes += 1;

        let zones = self.client.list_zones().await;
        stats.api_calls += 1;
        let zones = match zones {
            Ok(zones) => zones,
            Err(e) => {
                stats.errors += 1;
                error!(error = %e, "Unable to list pull zones");
                return false;
            }
        };

        // Account figures are identical in every snapshot; keep the latest.
        let mut account_snapshot = None;

        for zone in &zones {
            let result = self.client.statistics(Some(zone.id)).await;
            stats.api_calls += 1;
            match result {
                Ok(snapshot) => {
                    self.emit_zone(zone, &snapshot, samples);
                    account_snapshot = Some(snapshot);
                }
                Err(e) => {
                    stats.errors += 1;
                    error!(
                        zone_id = zone.id,
                        zone = %zone.name,
                        error = %e,
                        "Unable to collect pull zone statistics"
                    );
                }
            }
        }

        if account_snapshot.is_none() {
            let result = self.client.statistics(None).await;
            stats.api_calls += 1;
            match result {
                Ok(snapshot) => account_snapshot = Some(snapshot),
                Err(e) => {
                    stats.errors += 1;
                    error!(
                        error = %e,
                        zones = zones.len(),
                        "Unable to collect account statistics"
                    );
                }
            }
        }

        if let Some(snapshot) = &account_snapshot {
            self.emit_account(snapshot, samples);
        }

        debug!(
            zones = zones.len(),
            samples = samples.len(),
            "Scrape complete"
        );
        true
    }

    fn emit_zone(&self, zone: &Zone, snapshot: &StatisticsSnapshot, samples: &mut Vec<Sample>) {
        for metric in &self.metrics.zone {
            if let Some(value) = self.value_of((metric.series)(snapshot)) {
                samples.push(Sample::new(
                    &metric.descriptor,
                    vec![zone.name.clone()],
                    value,
                ));
            }
        }

        for location in decompose_geo_distribution(&snapshot.geo_traffic_distribution) {
            samples.push(Sample::new(
                &self.metrics.geo,
                vec![zone.name.clone(), location.region, location.location],
                location.requests,
            ));
        }
    }

    fn emit_account(&self, snapshot: &StatisticsSnapshot, samples: &mut Vec<Sample>) {
        for metric in &self.metrics.account {
            if let Some(value) = self.value_of((metric.series)(snapshot)) {
                samples.push(Sample::new(&metric.descriptor, Vec::new(), value));
            }
        }
    }

    fn value_of(&self, series: &TimeSeries) -> Option<f64> {
        match self.config.missing_data {
            MissingData::Sentinel => Some(extract_representative_value(series)),
            MissingData::Omit => representative_value(series),
        }
    }

    fn status_samples(&self, stats: &ScrapeStats) -> [Sample; 5] {
        let up = if stats.up { 1.0 } else { 0.0 };
        [
            Sample::new(&self.metrics.up, Vec::new(), up),
            Sample::new(
                &self.metrics.total_scrapes,
                Vec::new(),
                stats.total_scrapes as f64,
            ),
            Sample::new(&self.metrics.total_errors, Vec::new(), stats.errors as f64),
            Sample::new(&self.metrics.api_calls, Vec::new(), stats.api_calls as f64),
            Sample::new(&self.metrics.build_info, Vec::new(), 1.0),
        ]
    }
}
