//! Pull zone enumeration.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Result;

/// Path of the pull zone listing endpoint.
pub const PULL_ZONE_PATH: &str = "/pullzone";

/// A pull zone configured on the account.
///
/// Only the identifier and name are read; everything else in the API's zone
/// record is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Zone {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Name")]
    pub name: String,
}

impl ApiClient {
    /// List every pull zone of the account in a single request.
    ///
    /// An account without zones yields an empty list, including when the API
    /// answers with `null`.
    pub async fn list_zones(&self) -> Result<Vec<Zone>> {
        let zones: Option<Vec<Zone>> = self.get_json(PULL_ZONE_PATH).await?;
        let zones = zones.unwrap_or_default();
        debug!(count = zones.len(), "Listed pull zones");
        Ok(zones)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ignores_extra_fields() {
        let json = r#"[{"Id": 34567, "Name": "pullzonename2", "OriginUrl": "https://example.com", "Enabled": true}]"#;
        let zones: Vec<Zone> = serde_json::from_str(json).unwrap();

        assert_eq!(
            zones,
            vec![Zone {
                id: 34567,
                name: "pullzonename2".to_string()
            }]
        );
    }

    #[test]
    fn test_decode_missing_name_fails() {
        let json = r#"[{"Id": 1}]"#;
        assert!(serde_json::from_str::<Vec<Zone>>(json).is_err());
    }
}
