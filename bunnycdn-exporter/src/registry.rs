//! Bridge between scrapes and the `prometheus-client` text encoder.

use std::fmt;
use std::sync::Arc;

use prometheus_client::collector::Collector;
use prometheus_client::encoding::{DescriptorEncoder, EncodeMetric, MetricEncoder, text};
use prometheus_client::metrics::MetricType;
use prometheus_client::metrics::counter::ConstCounter;
use prometheus_client::metrics::gauge::ConstGauge;
use prometheus_client::registry::Registry;

use crate::metrics::{MetricKind, MetricSet, Sample};
use crate::scrape::{Exporter, ScrapeReport};

/// Content type of the encoded exposition.
pub const CONTENT_TYPE: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

/// Scrape BunnyCDN and encode the result.
pub async fn collect(exporter: &Exporter) -> Result<String, fmt::Error> {
    let report = exporter.scrape().await;
    encode_report(exporter.metrics(), report)
}

/// Encode a scrape report in the OpenMetrics text format.
pub fn encode_report(metrics: &Arc<MetricSet>, report: ScrapeReport) -> Result<String, fmt::Error> {
    let mut registry = Registry::with_prefix(metrics.namespace.clone());
    registry.register_collector(Box::new(ReportCollector {
        metrics: Arc::clone(metrics),
        report,
    }));

    let mut body = String::new();
    text::encode(&mut body, &registry)?;
    Ok(body)
}

/// Exposes one finished scrape to a registry.
#[derive(Debug)]
struct ReportCollector {
    metrics: Arc<MetricSet>,
    report: ScrapeReport,
}

impl Collector for ReportCollector {
    fn encode(&self, mut encoder: DescriptorEncoder<'_>) -> Result<(), fmt::Error> {
        let mut encoded: Vec<&str> = Vec::new();

        for descriptor in self.metrics.descriptors() {
            // The error counts share one family.
            if encoded.contains(&descriptor.name.as_str()) {
                continue;
            }
            encoded.push(&descriptor.name);

            let samples: Vec<&Sample> = self
                .report
                .samples_named(&descriptor.name)
                .collect();
            if samples.is_empty() {
                continue;
            }

            let mut family = encoder.encode_descriptor(
                &descriptor.name,
                &descriptor.help,
                None,
                metric_type(descriptor.kind),
            )?;

            if descriptor.label_names.is_empty() && descriptor.const_labels.is_empty() {
                // Unlabelled metrics carry a single value per scrape.
                if let Some(sample) = samples.last() {
                    encode_value(descriptor.kind, sample.value, family)?;
                }
                continue;
            }

            for sample in samples {
                let labels = sample.labels();
                encode_value(descriptor.kind, sample.value, family.encode_family(&labels)?)?;
            }
        }

        Ok(())
    }
}

fn metric_type(kind: MetricKind) -> MetricType {
    match kind {
        MetricKind::Gauge => MetricType::Gauge,
        MetricKind::Counter => MetricType::Counter,
    }
}

fn encode_value(kind: MetricKind, value: f64, encoder: MetricEncoder<'_>) -> Result<(), fmt::Error> {
    match kind {
        MetricKind::Gauge => ConstGauge::new(value).encode(encoder),
        MetricKind::Counter => ConstCounter::new(value as u64).encode(encoder),
    }
}
