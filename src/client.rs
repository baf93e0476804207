//! HTTP transport for the identity service

use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

use crate::error::{MarketError, Result};

/// Raw reply: status code and body text
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<R: DeserializeOwned>(&self) -> Result<R> {
        serde_json::from_str(&self.body).map_err(|_| {
            MarketError::invalid_response(format!(
                "Invalid response ({}): {}",
                self.status, self.body
            ))
        })
    }
}

/// Base HTTP client for JSON endpoints
#[derive(Debug, Clone)]
pub struct BaseClient {
    client: Client,
}

impl BaseClient {
    /// `timeout` of `None` waits as long as the server does
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self { client })
    }

    pub async fn post_json<T: Serialize + ?Sized>(&self, url: &str, payload: &T) -> Result<RawResponse> {
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_response_json_error_mentions_body() {
        let raw = RawResponse {
            status: 502,
            body: "<html>bad gateway</html>".to_string(),
        };
        assert!(!raw.is_success());
        let err = raw.json::<serde_json::Value>().unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::InvalidResponse);
        assert!(err.to_string().contains("bad gateway"));
    }

    #[tokio::test]
    async fn test_refused_connection_maps_to_network_error() {
        // Port 9 (discard) is closed on test hosts.
        let client = BaseClient::new(Some(Duration::from_secs(2))).unwrap();
        let err = client
            .post_json("http://127.0.0.1:9/accounts:signInWithPassword", &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
