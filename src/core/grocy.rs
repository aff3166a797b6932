//! HTTP client for the downstream Grocy REST API.
//!
//! Tool handlers treat this as an opaque "call this endpoint, get JSON back"
//! contract: the client owns the API-key header, TLS verification, and the
//! response-size ceiling; handlers own the endpoint paths and body shapes.

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{debug, warn};

use super::config::GrocyConfig;

/// Header carrying the Grocy API key.
const API_KEY_HEADER: &str = "GROCY-API-KEY";

/// Errors from downstream Grocy calls.
#[derive(Debug, thiserror::Error)]
pub enum GrocyError {
    /// Failed to construct the HTTP client or request URL.
    #[error("Grocy client setup failed: {0}")]
    Setup(String),

    /// Transport-level failure (connection refused, timeout, TLS).
    #[error("Grocy request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Grocy answered with a non-success status.
    #[error("Grocy returned {status}: {body}")]
    Api { status: StatusCode, body: String },

    /// Response body exceeded the configured size ceiling.
    #[error("Grocy response of {actual} bytes exceeds the {limit}-byte limit")]
    ResponseTooLarge { limit: usize, actual: usize },

    /// Response body was not valid JSON.
    #[error("Grocy returned invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Client for the Grocy REST API.
#[derive(Debug, Clone)]
pub struct GrocyClient {
    http: reqwest::Client,
    base_url: String,
    response_size_limit: usize,
}

impl GrocyClient {
    /// Build a client from the resolved `grocy` config section.
    pub fn new(config: &GrocyConfig) -> Result<Self, GrocyError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|e| GrocyError::Setup(format!("invalid API key: {e}")))?;
            headers.insert(API_KEY_HEADER, value);
        } else {
            warn!("No Grocy API key configured; downstream calls will likely be rejected");
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| GrocyError::Setup(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            response_size_limit: config.response_size_limit,
        })
    }

    /// The resolved base URL (without trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET an endpoint and decode the JSON body.
    pub async fn get_json(&self, path: &str) -> Result<Value, GrocyError> {
        let url = self.endpoint(path);
        debug!("GET {}", url);
        let response = self.http.get(&url).send().await?;
        self.decode(response).await
    }

    /// GET an endpoint with query parameters and decode the JSON body.
    pub async fn get_json_query(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Value, GrocyError> {
        let url = self.endpoint(path);
        debug!("GET {} (with {} query params)", url, query.len());
        let response = self.http.get(&url).query(query).send().await?;
        self.decode(response).await
    }

    /// POST a JSON body to an endpoint.
    ///
    /// Grocy action endpoints often answer 204 with no body; those decode to
    /// `Value::Null`.
    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Value, GrocyError> {
        let url = self.endpoint(path);
        debug!("POST {}", url);
        let response = self.http.post(&url).json(body).send().await?;
        self.decode(response).await
    }

    async fn decode(&self, response: reqwest::Response) -> Result<Value, GrocyError> {
        let status = response.status();

        if let Some(length) = response.content_length() {
            if length as usize > self.response_size_limit {
                return Err(GrocyError::ResponseTooLarge {
                    limit: self.response_size_limit,
                    actual: length as usize,
                });
            }
        }

        let bytes = response.bytes().await?;
        if bytes.len() > self.response_size_limit {
            return Err(GrocyError::ResponseTooLarge {
                limit: self.response_size_limit,
                actual: bytes.len(),
            });
        }

        if !status.is_success() {
            return Err(GrocyError::Api {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        if bytes.is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> GrocyClient {
        GrocyClient::new(&GrocyConfig {
            base_url: base_url.to_string(),
            api_key: Some("test-key".to_string()),
            verify_tls: true,
            response_size_limit: 1024,
        })
        .unwrap()
    }

    #[test]
    fn trailing_slash_normalized() {
        let client = test_client("http://grocy.home/api/");
        assert_eq!(client.base_url(), "http://grocy.home/api");
        assert_eq!(client.endpoint("/stock"), "http://grocy.home/api/stock");
        assert_eq!(client.endpoint("stock"), "http://grocy.home/api/stock");
    }

    #[test]
    fn invalid_api_key_rejected() {
        let result = GrocyClient::new(&GrocyConfig {
            api_key: Some("bad\nkey".to_string()),
            ..Default::default()
        });
        assert!(matches!(result, Err(GrocyError::Setup(_))));
    }

    #[test]
    fn missing_api_key_is_allowed() {
        // Setup succeeds; the server warns and Grocy rejects calls itself.
        let result = GrocyClient::new(&GrocyConfig::default());
        assert!(result.is_ok());
    }
}
