mod decode;

pub use decode::decode_body;

use crate::config::ScraperSettings;
use async_trait::async_trait;
use shared_kernel::http_client::{HttpClient, HttpClientError};
use std::collections::HashMap;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
#[error("Failed to download the status page")]
pub struct FetchError(#[from] HttpClientError);

#[async_trait]
pub trait PageSource: Send + Sync {
    /// Returns the decoded HTML of the status page.
    async fn fetch(&self) -> Result<String, FetchError>;
}

pub struct WebPageReader {
    client: HttpClient,
    url: Url,
}

impl WebPageReader {
    pub fn new(settings: &ScraperSettings) -> Result<Self, FetchError> {
        let headers = HashMap::from([
            ("User-Agent", settings.user_agent.clone()),
            (
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
            ),
            ("Accept-Language", "zh-TW,zh;q=0.9,en;q=0.8".to_string()),
            ("Connection", "close".to_string()),
        ]);
        let client = HttpClient::new(settings.request_timeout(), headers)?;
        Ok(Self {
            client,
            url: settings.source_url.clone(),
        })
    }
}

#[async_trait]
impl PageSource for WebPageReader {
    #[tracing::instrument(err, skip(self), fields(url = %self.url), level = "info")]
    async fn fetch(&self) -> Result<String, FetchError> {
        let response = self.client.get_bytes(&self.url).await?;
        Ok(decode_body(&response.body, response.content_type.as_deref()))
    }
}
