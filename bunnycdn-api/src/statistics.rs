//! Statistics snapshots for a pull zone or the whole account.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Result;

/// Path of the statistics endpoint.
pub const STATISTICS_PATH: &str = "/statistics";

/// A chart returned by the statistics endpoint, keyed by timestamp label.
///
/// Keys are ISO-8601 timestamps, so key order is chronological.
pub type TimeSeries = BTreeMap<String, f64>;

/// Statistics for one pull zone or for the whole account.
///
/// Missing or `null` charts decode as empty series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    #[serde(rename = "OriginResponseTimeChart", default, deserialize_with = "null_as_empty")]
    pub origin_response_time: TimeSeries,
    #[serde(rename = "BandwidthUsedChart", default, deserialize_with = "null_as_empty")]
    pub bandwidth_used: TimeSeries,
    #[serde(rename = "BandwidthCachedChart", default, deserialize_with = "null_as_empty")]
    pub bandwidth_cached: TimeSeries,
    #[serde(rename = "CacheHitRateChart", default, deserialize_with = "null_as_empty")]
    pub cache_hit_rate: TimeSeries,
    #[serde(rename = "RequestsServedChart", default, deserialize_with = "null_as_empty")]
    pub requests_served: TimeSeries,
    #[serde(rename = "PullRequestsPulledChart", default, deserialize_with = "null_as_empty")]
    pub pull_requests_pulled: TimeSeries,
    #[serde(rename = "UserBalanceHistoryChart", default, deserialize_with = "null_as_empty")]
    pub user_balance_history: TimeSeries,
    #[serde(rename = "UserStorageUsedChart", default, deserialize_with = "null_as_empty")]
    pub user_storage_used: TimeSeries,
    /// Requests keyed by `"<Region>: <Location>"`.
    #[serde(rename = "GeoTrafficDistribution", default, deserialize_with = "null_as_empty")]
    pub geo_traffic_distribution: TimeSeries,
    #[serde(rename = "Error3xxChart", default, deserialize_with = "null_as_empty")]
    pub error_3xx: TimeSeries,
    #[serde(rename = "Error4xxChart", default, deserialize_with = "null_as_empty")]
    pub error_4xx: TimeSeries,
    #[serde(rename = "Error5xxChart", default, deserialize_with = "null_as_empty")]
    pub error_5xx: TimeSeries,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<TimeSeries, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<TimeSeries>::deserialize(deserializer)?.unwrap_or_default())
}

/// Build the statistics request path for a single day.
///
/// Both ends of the date window are `date`; `zone_id` scopes the request to
/// one pull zone, `None` asks for account-wide figures.
pub fn statistics_path(date: NaiveDate, zone_id: Option<i64>) -> String {
    let day = date.format("%Y-%m-%d");
    let mut path = format!("{STATISTICS_PATH}?dateFrom={day}&dateTo={day}&loadErrors=true");
    if let Some(id) = zone_id {
        path.push_str(&format!("&pullZone={id}"));
    }
    path
}

impl ApiClient {
    /// Fetch today's statistics (UTC), for one zone or the whole account.
    pub async fn statistics(&self, zone_id: Option<i64>) -> Result<StatisticsSnapshot> {
        let path = statistics_path(Utc::now().date_naive(), zone_id);
        let snapshot = self.get_json(&path).await?;
        debug!(zone_id = ?zone_id, "Fetched statistics");
        Ok(snapshot)
    }
}
