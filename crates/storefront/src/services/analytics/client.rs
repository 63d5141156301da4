//! HTTP client for the tracking endpoint.

use thiserror::Error;
use url::Url;

use super::AnalyticsEvent;

/// Errors delivering a tracking event.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// Posts tracking events as JSON.
#[derive(Debug, Clone)]
pub struct TrackingClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl TrackingClient {
    /// Create a client for `endpoint`.
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    /// Send one event. The response body is ignored.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the endpoint rejects it.
    pub async fn send(&self, event: &AnalyticsEvent) -> Result<(), AnalyticsError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(event)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AnalyticsError::Api {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        Ok(())
    }
}
