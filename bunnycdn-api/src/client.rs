//! Authenticated HTTP access to the BunnyCDN API.

use std::fmt;

use reqwest::Response;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::config::ApiConfig;
use crate::error::{ApiError, Result};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Header carrying the account API key.
pub const ACCESS_KEY_HEADER: &str = "AccessKey";

/// Client for the BunnyCDN API.
///
/// Every request carries the account key and asks for JSON. The configured
/// timeout bounds each request individually; nothing is retried.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_uri: String,
    api_key: String,
}

impl ApiClient {
    /// Create a client from the API configuration.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.ssl_verify)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            http,
            base_uri: config.uri.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Base URI requests are resolved against.
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Issue a GET for `path` (relative to the base URI, query included).
    ///
    /// Returns the response with its body unread. Non-2xx statuses are
    /// turned into [`ApiError::Status`].
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_uri, path);
        trace!(%url, "GET");

        let response = self
            .http
            .get(&url)
            .header(ACCESS_KEY_HEADER, &self.api_key)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        Ok(response)
    }

    /// Issue a GET for `path` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.get(path).await?;
        let url = response.url().to_string();

        let body = response
            .bytes()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;

        serde_json::from_slice(&body).map_err(|source| ApiError::Parse { url, source })
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_uri", &self.base_uri)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = ApiConfig {
            uri: "https://bunnycdn.com/api/".to_string(),
            ..Default::default()
        };
        let client = ApiClient::new(&config).unwrap();

        assert_eq!(client.base_uri(), "https://bunnycdn.com/api");
    }

    #[test]
    fn test_debug_hides_key() {
        let config = ApiConfig {
            api_key: "super-secret".to_string(),
            ..Default::default()
        };
        let client = ApiClient::new(&config).unwrap();

        let debug = format!("{:?}", client);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("bunnycdn.com"));
    }
}
