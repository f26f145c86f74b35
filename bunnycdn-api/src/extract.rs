//! Reduction of statistics charts to exportable values.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::statistics::TimeSeries;

/// Value reported for a chart with no entries.
pub const NO_DATA: f64 = -1.0;

/// Requests served from one edge location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub region: String,
    pub location: String,
    pub requests: f64,
}

/// Pick the single value that represents a chart.
///
/// Statistics are requested for the current day only, so a chart normally
/// holds at most one entry. If several are present the most recent one
/// (greatest timestamp key) wins. Returns `None` for an empty chart.
pub fn representative_value(series: &TimeSeries) -> Option<f64> {
    if series.len() > 1 {
        debug!(
            entries = series.len(),
            "Chart holds more than one entry, using the most recent"
        );
    }
    series.last_key_value().map(|(_, value)| *value)
}

/// Like [`representative_value`], with [`NO_DATA`] for an empty chart.
pub fn extract_representative_value(series: &TimeSeries) -> f64 {
    representative_value(series).unwrap_or(NO_DATA)
}

/// Split `"<Region>: <Location>"` keys into one [`GeoLocation`] per entry.
///
/// Only the first colon separates region from location. Keys without a
/// colon are skipped. Keys that only differ in whitespace around the
/// separator name the same location; their requests are summed.
pub fn decompose_geo_distribution(series: &TimeSeries) -> Vec<GeoLocation> {
    let mut locations: Vec<GeoLocation> = Vec::with_capacity(series.len());

    for (key, requests) in series {
        let Some((region, location)) = key.split_once(':') else {
            warn!(key = %key, "Skipping geo traffic entry without region separator");
            continue;
        };
        let (region, location) = (region.trim(), location.trim());

        if let Some(existing) = locations
            .iter_mut()
            .find(|l| l.region == region && l.location == location)
        {
            warn!(key = %key, region, location, "Merging duplicate geo traffic entry");
            existing.requests += *requests;
            continue;
        }

        locations.push(GeoLocation {
            region: region.to_string(),
            location: location.to_string(),
            requests: *requests,
        });
    }

    locations
}
