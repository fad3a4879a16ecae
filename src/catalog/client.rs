//! MusicBrainz HTTP client
//!
//! Issues throttled GET requests against the MusicBrainz web service and
//! hands back the decoded JSON body untouched.
//! See: https://musicbrainz.org/doc/MusicBrainz_API
//!
//! IMPORTANT: MusicBrainz requires a User-Agent header and rate limits to 1 req/sec.

use std::time::Duration;

use serde_json::Value;

use super::domain::CatalogError;
use super::throttle::Throttle;
use crate::config::CatalogConfig;

/// MusicBrainz API client
pub struct MusicBrainzClient {
    http_client: reqwest::Client,
    base_url: String,
    throttle: Throttle,
}

/// User agent string - MusicBrainz requires this
pub const USER_AGENT: &str = concat!(
    "tagprobe/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/tagprobe/tagprobe)"
);

impl MusicBrainzClient {
    /// Create a client from catalog settings
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| CatalogError::Client(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            throttle: Throttle::new(Duration::from_millis(config.rate_limit_ms)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `<base_url>/<endpoint>` with `fmt=json` and the given parameters.
    ///
    /// Returns `Ok(None)` when the body is not JSON (wrong content type or
    /// undecodable); the body text is logged. Transport failures are errors.
    pub async fn get_data(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Option<Value>, CatalogError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        self.throttle.wait().await;
        tracing::debug!(url = %url, ?params, "Querying MusicBrainz API");

        let response = self
            .http_client
            .get(&url)
            .query(params)
            .query(&[("fmt", "json")])
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        Ok(decode_body(endpoint, status, &content_type, &body))
    }
}

/// Decode a response body, logging and discarding anything that isn't JSON.
fn decode_body(
    endpoint: &str,
    status: reqwest::StatusCode,
    content_type: &str,
    body: &str,
) -> Option<Value> {
    if !content_type.contains("json") {
        tracing::error!(
            endpoint,
            %status,
            content_type,
            "Unexpected content type from MusicBrainz - {}",
            body
        );
        return None;
    }

    match serde_json::from_str(body) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::error!(endpoint, %status, "{} - {}", e, body);
            None
        }
    }
}
