use crate::adaptive_card::CardEnvelope;
use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use shared_kernel::http_client::{HttpClient, HttpClientError, StatusCode};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};
use url::Url;

#[derive(Error, Debug)]
pub enum SendError {
    #[error("The webhook rejected the notification with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("Timed out while sending the notification")]
    Timeout,
    #[error("Failed to send the notification")]
    Transport(#[source] HttpClientError),
    #[error("The webhook endpoint is not a valid url")]
    InvalidEndpoint(#[source] url::ParseError),
    #[error("Failed to render the notification card")]
    Serialization(#[from] serde_json::Error),
}

impl From<HttpClientError> for SendError {
    fn from(err: HttpClientError) -> Self {
        match err {
            HttpClientError::Timeout { .. } => SendError::Timeout,
            other => SendError::Transport(other),
        }
    }
}

#[async_trait]
pub trait DeliveryStrategy: Send + Sync {
    async fn deliver(&self, card: &CardEnvelope) -> Result<(), SendError>;
}

/// POSTs cards to a Power Automate HTTP trigger. One attempt, no retries.
///
/// The endpoint is only parsed when a card is delivered.
pub struct WebhookDelivery {
    client: HttpClient,
    endpoint: Secret<String>,
}

impl WebhookDelivery {
    pub fn new(endpoint: Secret<String>, timeout: Duration) -> Result<Self, SendError> {
        let client = HttpClient::new(timeout, HashMap::new()).map_err(SendError::Transport)?;
        Ok(Self { client, endpoint })
    }

    fn endpoint_url(&self) -> Result<Url, SendError> {
        Url::parse(self.endpoint.expose_secret().trim()).map_err(SendError::InvalidEndpoint)
    }
}

fn is_accepted(status: StatusCode) -> bool {
    status == StatusCode::OK || status == StatusCode::ACCEPTED
}

#[async_trait]
impl DeliveryStrategy for WebhookDelivery {
    #[tracing::instrument(err, skip_all, level = "info")]
    async fn deliver(&self, card: &CardEnvelope) -> Result<(), SendError> {
        let endpoint = self.endpoint_url()?;
        let response = self.client.post_json(&endpoint, card).await?;

        if is_accepted(response.status) {
            info!(status = response.status.as_u16(), "Notification accepted");
            return Ok(());
        }

        let body = response.text_lossy();
        error!(status = response.status.as_u16(), %body, "Notification rejected");
        Err(SendError::Rejected {
            status: response.status.as_u16(),
            body,
        })
    }
}
