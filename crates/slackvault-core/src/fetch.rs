//! Authenticated attachment downloads.
//!
//! # Design
//! - The fetcher only builds requests; a [`Transport`] executes them so tests
//!   can observe the exact request without a network.
//! - Failures are surfaced once. Nothing here retries.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use tracing::{debug, warn};
use url::Url;

use crate::error::{FetchError, FetchResult};

/// Header carrying the session cookie.
pub const COOKIE_HEADER: &str = "cookie";
const COOKIE_PREFIX: &str = "d=";

/// A single attachment download request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRequest {
    /// Attachment URL.
    pub url: String,
    /// HTTP method, always `GET` for attachments.
    pub method: String,
    /// Request headers.
    pub headers: BTreeMap<String, String>,
}

impl AttachmentRequest {
    /// Authenticated `GET` for `url` using the session cookie.
    #[must_use]
    pub fn get(url: &str, auth_cookie: &str) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(
            COOKIE_HEADER.to_string(),
            format!("{COOKIE_PREFIX}{auth_cookie}"),
        );
        Self {
            url: url.to_string(),
            method: Method::GET.as_str().to_string(),
            headers,
        }
    }
}

/// Executes attachment requests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform the request and return the response body.
    async fn execute(&self, request: &AttachmentRequest) -> FetchResult<Vec<u8>>;
}

/// Resolves attachment references into bytes through a [`Transport`].
#[derive(Clone)]
pub struct AttachmentFetcher {
    transport: Arc<dyn Transport>,
}

impl AttachmentFetcher {
    /// Wrap a transport.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Download `url` with the session cookie.
    ///
    /// # Errors
    ///
    /// Returns the transport's [`FetchError`] unchanged.
    pub async fn fetch(&self, url: &str, auth_cookie: &str) -> FetchResult<Vec<u8>> {
        let request = AttachmentRequest::get(url, auth_cookie);
        debug!(url = %request.url, "fetching attachment");
        self.transport.execute(&request).await
    }
}

/// `reqwest`-backed transport.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a transport with a request timeout and user agent.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] if the HTTP client cannot be built.
    pub fn new(timeout: Duration, user_agent: &str) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|source| FetchError::Client { source })?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &AttachmentRequest) -> FetchResult<Vec<u8>> {
        let url = Url::parse(&request.url).map_err(|_| FetchError::InvalidRequest {
            field: "url",
            value: request.url.clone(),
        })?;
        let method =
            Method::from_bytes(request.method.as_bytes()).map_err(|_| FetchError::InvalidRequest {
                field: "method",
                value: request.method.clone(),
            })?;

        let mut builder = self.client.request(method, url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: request.url.clone(),
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            warn!(url = %request.url, status = status.as_u16(), "attachment request rejected");
            return Err(FetchError::Status {
                url: request.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Transport {
                url: request.url.clone(),
                source,
            })?;
        debug!(url = %request.url, bytes = body.len(), "attachment downloaded");
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn request_carries_cookie_header() {
        let request = AttachmentRequest::get("https://x/img", "xoxd-abc");
        assert_eq!(request.url, "https://x/img");
        assert_eq!(request.method, "GET");
        assert_eq!(
            request.headers.get(COOKIE_HEADER).map(String::as_str),
            Some("d=xoxd-abc")
        );
        assert_eq!(request.headers.len(), 1);
    }

    #[tokio::test]
    async fn http_transport_returns_body_on_success() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/files/img.png")
                .header("cookie", "d=xoxd-abc");
            then.status(200).body([0x89_u8, 0x50, 0x4e, 0x47]);
        });

        let transport = HttpTransport::new(Duration::from_secs(5), "slackvault-tests")?;
        let fetcher = AttachmentFetcher::new(Arc::new(transport));
        let bytes = fetcher
            .fetch(&server.url("/files/img.png"), "xoxd-abc")
            .await?;

        mock.assert();
        assert_eq!(bytes, vec![0x89, 0x50, 0x4e, 0x47]);
        Ok(())
    }

    #[tokio::test]
    async fn http_transport_maps_non_success_status() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/files/missing.png");
            then.status(404);
        });

        let transport = HttpTransport::new(Duration::from_secs(5), "slackvault-tests")?;
        let result = transport
            .execute(&AttachmentRequest::get(
                &server.url("/files/missing.png"),
                "xoxd-abc",
            ))
            .await;
        assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
        Ok(())
    }

    #[tokio::test]
    async fn http_transport_rejects_unparseable_urls() -> anyhow::Result<()> {
        let transport = HttpTransport::new(Duration::from_secs(5), "slackvault-tests")?;
        let result = transport
            .execute(&AttachmentRequest::get("not a url", "xoxd-abc"))
            .await;
        assert!(matches!(
            result,
            Err(FetchError::InvalidRequest { field: "url", .. })
        ));
        Ok(())
    }
}
