//! Timeline REST Client
//!
//! HTTP client for the history endpoints.

use reqwest::Client;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::response::{decode_response, timeline_detail_url, timeline_list_url};
use crate::config::ServerConfig;
use crate::model::{LocationEvent, Timeline};

/// Client for `GET /timeline` and `GET /timeline/detail`
#[derive(Debug, Clone)]
pub struct TimelineClient {
    client: Client,
    base_url: String,
}

impl TimelineClient {
    /// Create a client for the configured API
    pub fn new(config: &ServerConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// All timelines, newest first as the server orders them
    pub async fn list_timelines(&self) -> Result<Vec<Timeline>, ApiError> {
        self.get(&timeline_list_url(&self.base_url)).await
    }

    /// Recorded locations of one timeline
    pub async fn timeline_detail(&self, timeline_id: &str) -> Result<Vec<LocationEvent>, ApiError> {
        self.get(&timeline_detail_url(&self.base_url, timeline_id))
            .await
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        tracing::debug!(url = %url, "GET");

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(url = %url, status = status.as_u16(), "Request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        decode_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_config() {
        let config = ServerConfig {
            api_url: "http://api.example.com".to_string(),
            ..ServerConfig::default()
        };
        let client = TimelineClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://api.example.com");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_error_fetching() {
        let config = ServerConfig {
            api_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 2,
            ..ServerConfig::default()
        };
        let client = TimelineClient::new(&config).unwrap();
        let err = client.list_timelines().await.unwrap_err();
        assert_eq!(err.user_message(), "Error fetching data");
    }
}
