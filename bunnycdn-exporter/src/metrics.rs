//! Metric descriptors and the tables mapping them to statistics charts.

use std::collections::BTreeMap;
use std::sync::Arc;

use bunnycdn_api::{StatisticsSnapshot, TimeSeries};

/// Default metric namespace.
pub const DEFAULT_NAMESPACE: &str = "bunnycdn";

/// Label carrying the pull zone name.
pub const PULL_ZONE_LABEL: &str = "pull_zone";

/// Exposition type of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
}

/// Static shape of a metric series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDescriptor {
    /// Name without the namespace prefix.
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    /// Names of the labels whose values are supplied per sample.
    pub label_names: Vec<String>,
    /// Labels with the same value on every sample.
    pub const_labels: BTreeMap<String, String>,
}

impl MetricDescriptor {
    pub fn gauge(name: &str, help: &str) -> Self {
        Self::new(name, help, MetricKind::Gauge)
    }

    pub fn counter(name: &str, help: &str) -> Self {
        Self::new(name, help, MetricKind::Counter)
    }

    fn new(name: &str, help: &str, kind: MetricKind) -> Self {
        Self {
            name: name.to_string(),
            help: help.to_string(),
            kind,
            label_names: Vec::new(),
            const_labels: BTreeMap::new(),
        }
    }

    pub fn with_labels(mut self, names: &[&str]) -> Self {
        self.label_names = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn with_const_label(mut self, name: &str, value: &str) -> Self {
        self.const_labels.insert(name.to_string(), value.to_string());
        self
    }

}

/// Selects one chart of a statistics snapshot.
pub type SeriesAccessor = fn(&StatisticsSnapshot) -> &TimeSeries;

/// A metric whose value is read from one chart of a snapshot.
#[derive(Debug, Clone)]
pub struct SeriesMetric {
    pub descriptor: Arc<MetricDescriptor>,
    pub series: SeriesAccessor,
}

impl SeriesMetric {
    fn new(descriptor: MetricDescriptor, series: SeriesAccessor) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
            series,
        }
    }
}

/// The complete, fixed set of metrics the exporter can emit.
///
/// Built once at startup and shared read-only with the scrape coordinator.
#[derive(Debug)]
pub struct MetricSet {
    pub namespace: String,
    pub up: Arc<MetricDescriptor>,
    pub total_scrapes: Arc<MetricDescriptor>,
    pub total_errors: Arc<MetricDescriptor>,
    pub api_calls: Arc<MetricDescriptor>,
    /// Constant `1`, labelled with the exporter version.
    pub build_info: Arc<MetricDescriptor>,
    /// Account-wide gauges, without labels.
    pub account: Vec<SeriesMetric>,
    /// Per pull zone gauges, labelled by zone name.
    pub zone: Vec<SeriesMetric>,
    /// Requests per edge location, labelled by zone, region and location.
    pub geo: Arc<MetricDescriptor>,
}

impl MetricSet {
    /// The BunnyCDN metric set under `namespace`.
    pub fn standard(namespace: impl Into<String>) -> Self {
        let zone_gauge =
            |name: &str, help: &str| MetricDescriptor::gauge(name, help).with_labels(&[PULL_ZONE_LABEL]);
        let error_count = |code: &str| {
            zone_gauge("request_error_count", "Request error by code.").with_const_label("code", code)
        };

        Self {
            namespace: namespace.into(),
            up: Arc::new(MetricDescriptor::gauge(
                "up",
                "Was the last scrape of BunnyCDN successful.",
            )),
            // Counter names get the `_total` suffix when encoded.
            total_scrapes: Arc::new(MetricDescriptor::counter(
                "exporter_total_scrapes",
                "Current total BunnyCDN scrapes.",
            )),
            total_errors: Arc::new(MetricDescriptor::counter(
                "exporter_total_errors",
                "Number of errors while making API calls.",
            )),
            api_calls: Arc::new(MetricDescriptor::counter(
                "exporter_api_calls",
                "Number of calls made to BunnyCDN API.",
            )),
            build_info: Arc::new(
                MetricDescriptor::gauge(
                    "exporter_build_info",
                    "A metric with a constant '1' value labeled by the version of the exporter.",
                )
                .with_const_label("version", env!("CARGO_PKG_VERSION")),
            ),
            account: vec![
                SeriesMetric::new(
                    MetricDescriptor::gauge("account_balance", "Current account balance."),
                    |s| &s.user_balance_history,
                ),
                SeriesMetric::new(
                    MetricDescriptor::gauge("storage_used_bytes", "Storage usage in bytes."),
                    |s| &s.user_storage_used,
                ),
            ],
            zone: vec![
                SeriesMetric::new(
                    zone_gauge("origin_response_time_avg", "The average origin response time."),
                    |s| &s.origin_response_time,
                ),
                SeriesMetric::new(
                    zone_gauge(
                        "bandwidth_used_bytes_total",
                        "Total bandwidth used in bytes serving traffic.",
                    ),
                    |s| &s.bandwidth_used,
                ),
                SeriesMetric::new(
                    zone_gauge(
                        "bandwidth_cached_bytes_total",
                        "Total bandwidth used in bytes serving cached data.",
                    ),
                    |s| &s.bandwidth_cached,
                ),
                SeriesMetric::new(
                    zone_gauge("requests_served_total", "Number of requests served."),
                    |s| &s.requests_served,
                ),
                SeriesMetric::new(
                    zone_gauge("pull_requests_pulled", "Number of pull requests from origin."),
                    |s| &s.pull_requests_pulled,
                ),
                SeriesMetric::new(error_count("3xx"), |s| &s.error_3xx),
                SeriesMetric::new(error_count("4xx"), |s| &s.error_4xx),
                SeriesMetric::new(error_count("5xx"), |s| &s.error_5xx),
            ],
            geo: Arc::new(
                MetricDescriptor::gauge("requests_served", "Request by location.").with_labels(&[
                    PULL_ZONE_LABEL,
                    "region",
                    "location",
                ]),
            ),
        }
    }

    /// Every descriptor, in exposition order.
    pub fn descriptors(&self) -> Vec<&MetricDescriptor> {
        let mut all: Vec<&MetricDescriptor> = vec![
            self.up.as_ref(),
            self.total_scrapes.as_ref(),
            self.total_errors.as_ref(),
            self.api_calls.as_ref(),
            self.build_info.as_ref(),
        ];
        all.extend(self.account.iter().map(|m| m.descriptor.as_ref()));
        all.extend(self.zone.iter().map(|m| m.descriptor.as_ref()));
        all.push(self.geo.as_ref());
        all
    }
}

impl Default for MetricSet {
    fn default() -> Self {
        Self::standard(DEFAULT_NAMESPACE)
    }
}

/// One value emitted by a scrape.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub descriptor: Arc<MetricDescriptor>,
    /// Values for `descriptor.label_names`, in the same order.
    pub label_values: Vec<String>,
    pub value: f64,
}

impl Sample {
    pub fn new(descriptor: &Arc<MetricDescriptor>, label_values: Vec<String>, value: f64) -> Self {
        debug_assert_eq!(descriptor.label_names.len(), label_values.len());
        Self {
            descriptor: Arc::clone(descriptor),
            label_values,
            value,
        }
    }

    /// Variable labels followed by the descriptor's constant labels.
    pub fn labels(&self) -> Vec<(String, String)> {
        self.descriptor
            .label_names
            .iter()
            .cloned()
            .zip(self.label_values.iter().cloned())
            .chain(
                self.descriptor
                    .const_labels
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone())),
            )
            .collect()
    }

    /// Value of the label `name`, variable or constant.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.descriptor
            .label_names
            .iter()
            .position(|n| n == name)
            .and_then(|i| self.label_values.get(i))
            .or_else(|| self.descriptor.const_labels.get(name))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_set_shape() {
        let set = MetricSet::standard("bunnycdn");

        assert_eq!(set.account.len(), 2);
        assert_eq!(set.zone.len(), 8);
        assert!(set.account.iter().all(|m| m.descriptor.label_names.is_empty()));
        assert!(
            set.zone
                .iter()
                .all(|m| m.descriptor.label_names == vec![PULL_ZONE_LABEL.to_string()])
        );
        assert_eq!(set.geo.label_names, vec!["pull_zone", "region", "location"]);
        // up, three counters, build info, account, zone, geo
        assert_eq!(set.descriptors().len(), 5 + 2 + 8 + 1);
        assert_eq!(
            set.build_info.const_labels["version"],
            env!("CARGO_PKG_VERSION")
        );
    }

    #[test]
    fn test_error_counts_share_name() {
        let set = MetricSet::default();
        let codes: Vec<_> = set
            .zone
            .iter()
            .filter(|m| m.descriptor.name == "request_error_count")
            .map(|m| m.descriptor.const_labels["code"].clone())
            .collect();

        assert_eq!(codes, vec!["3xx", "4xx", "5xx"]);
    }

    #[test]
    fn test_accessors_select_matching_chart() {
        let mut snapshot = StatisticsSnapshot::default();
        snapshot.bandwidth_cached.insert("t".to_string(), 7.0);
        snapshot.user_storage_used.insert("t".to_string(), 9.0);

        let set = MetricSet::default();
        let cached = set
            .zone
            .iter()
            .find(|m| m.descriptor.name == "bandwidth_cached_bytes_total")
            .unwrap();
        let storage = set
            .account
            .iter()
            .find(|m| m.descriptor.name == "storage_used_bytes")
            .unwrap();

        assert_eq!((cached.series)(&snapshot).get("t"), Some(&7.0));
        assert_eq!((storage.series)(&snapshot).get("t"), Some(&9.0));
    }

    #[test]
    fn test_sample_labels() {
        let set = MetricSet::default();
        let error_5xx = &set.zone[7].descriptor;
        let sample = Sample::new(error_5xx, vec!["zone-a".to_string()], 3.0);

        assert_eq!(
            sample.labels(),
            vec![
                ("pull_zone".to_string(), "zone-a".to_string()),
                ("code".to_string(), "5xx".to_string()),
            ]
        );
        assert_eq!(sample.label("pull_zone"), Some("zone-a"));
        assert_eq!(sample.label("code"), Some("5xx"));
        assert_eq!(sample.label("region"), None);
    }
}
