//! BunnyCDN API client.
//!
//! This crate provides typed access to the parts of the BunnyCDN API the
//! exporter reads:
//!
//! - [`client`] - Authenticated GET requests against the API base URI
//! - [`zones`] - Pull zone listing
//! - [`statistics`] - Daily statistics snapshots, per zone or account-wide
//! - [`extract`] - Reduction of charts to single values and geo decomposition
//! - [`config`] - Connection settings
//! - [`error`] - Error types

pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod statistics;
pub mod zones;

pub use client::ApiClient;
pub use config::ApiConfig;
pub use error::{ApiError, Result};
pub use extract::{
    GeoLocation, NO_DATA, decompose_geo_distribution, extract_representative_value,
    representative_value,
};
pub use statistics::{StatisticsSnapshot, TimeSeries, statistics_path};
pub use zones::Zone;
