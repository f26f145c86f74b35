use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection settings for the BunnyCDN API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URI of the API (default: "https://bunnycdn.com/api").
    #[serde(default = "default_uri")]
    pub uri: String,

    /// Account API key, sent as the `AccessKey` header.
    #[serde(default)]
    pub api_key: String,

    /// Verify the TLS certificate of the API endpoint.
    #[serde(default = "default_ssl_verify")]
    pub ssl_verify: bool,

    /// Timeout applied to every request, e.g. "10s" or "500ms".
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

fn default_uri() -> String {
    "https://bunnycdn.com/api".to_string()
}

fn default_ssl_verify() -> bool {
    true
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

impl ApiConfig {
    /// Whether `uri` is an absolute http(s) URI.
    pub fn has_valid_uri(&self) -> bool {
        reqwest::Url::parse(&self.uri).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            api_key: String::new(),
            ssl_verify: default_ssl_verify(),
            timeout: default_timeout(),
        }
    }
}
