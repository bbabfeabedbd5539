use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error as ThisError;
use url::Url;

pub use reqwest::StatusCode;

/// Thin wrapper over a reqwest client with tracing middleware.
///
/// No retry middleware is installed, every request is attempted once.
pub struct HttpClient {
    client: ClientWithMiddleware,
}

#[derive(ThisError, Debug)]
pub enum HttpClientError {
    #[error("request to {url} timed out")]
    Timeout { url: Url },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: Url,
        #[source]
        source: anyhow::Error,
    },
    #[error("{url} responded with HTTP {status}")]
    UnexpectedStatus { url: Url, status: StatusCode },
    #[error("failed to serialize request body: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("httpBuilderError {0}")]
    HTTPBuilderError(String),
}

#[derive(Debug)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

struct HeadersMapGenerator(HeaderMap);

impl HeadersMapGenerator {
    fn into_inner(self) -> HeaderMap {
        self.0
    }
}

impl TryFrom<HashMap<&'static str, String>> for HeadersMapGenerator {
    type Error = HttpClientError;

    fn try_from(value: HashMap<&'static str, String>) -> Result<Self, Self::Error> {
        let mut header_map = HeaderMap::new();

        for (key, value) in value.into_iter() {
            let value = HeaderValue::from_str(&value)
                .map_err(|err| HttpClientError::HTTPBuilderError(format!("{err} {value}")))?;
            header_map.insert(key, value);
        }
        Ok(Self(header_map))
    }
}

fn classify(url: &Url, err: reqwest::Error) -> HttpClientError {
    if err.is_timeout() {
        HttpClientError::Timeout { url: url.clone() }
    } else {
        HttpClientError::Transport {
            url: url.clone(),
            source: err.into(),
        }
    }
}

fn classify_middleware(url: &Url, err: reqwest_middleware::Error) -> HttpClientError {
    match err {
        reqwest_middleware::Error::Reqwest(err) => classify(url, err),
        reqwest_middleware::Error::Middleware(err) => HttpClientError::Transport {
            url: url.clone(),
            source: err,
        },
    }
}

impl HttpClient {
    pub fn new(
        timeout: Duration,
        default_headers: HashMap<&'static str, String>,
    ) -> Result<Self, HttpClientError> {
        let headers = HeadersMapGenerator::try_from(default_headers)?.into_inner();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|err| HttpClientError::HTTPBuilderError(err.to_string()))?;

        Ok(Self {
            client: ClientBuilder::new(client)
                .with(TracingMiddleware::default())
                .build(),
        })
    }

    async fn into_response(
        url: &Url,
        response: reqwest::Response,
    ) -> Result<HttpResponse, HttpClientError> {
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned);
        let body = response.bytes().await.map_err(|err| classify(url, err))?;
        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }

    /// GET that only succeeds on a 2xx status.
    #[tracing::instrument(err, skip(self, url), fields(url = %url), level = "info")]
    pub async fn get_bytes(&self, url: &Url) -> Result<HttpResponse, HttpClientError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| classify_middleware(url, err))?;

        if !response.status().is_success() {
            return Err(HttpClientError::UnexpectedStatus {
                url: url.clone(),
                status: response.status(),
            });
        }
        Self::into_response(url, response).await
    }

    /// POSTs `body` as JSON. The status is returned as is; callers decide what counts as accepted.
    #[tracing::instrument(err, skip(self, url, body), fields(host = url.host_str()), level = "info")]
    pub async fn post_json<B: Serialize>(
        &self,
        url: &Url,
        body: &B,
    ) -> Result<HttpResponse, HttpClientError> {
        let payload = serde_json::to_vec(body)?;
        let response = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|err| classify_middleware(url, err))?;

        Self::into_response(url, response).await
    }
}
