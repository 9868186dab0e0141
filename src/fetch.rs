//! TrackerNet HTTP client
//!
//! Performs the upstream GET, applies the status code policy and hands the
//! parsed XML to a shaping function.

use std::time::Duration;

use reqwest::Client;
use roxmltree::Document;
use tracing::debug;

use crate::error::{ProxyError, Result};
use crate::query::xml;
use crate::status;

/// Base URL of the live TrackerNet feed
pub const DEFAULT_BASE_URL: &str = "http://cloud.tfl.gov.uk/trackernet";

/// Upper bound on a single upstream request
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for fetching XML documents from TrackerNet
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Base URL for the API (allows override for testing)
    base_url: String,
}

impl UpstreamClient {
    /// Creates a new UpstreamClient with a custom base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .map_err(ProxyError::ClientBuild)?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// The base URL that query paths are appended to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches the raw body of an upstream document
    ///
    /// # Returns
    /// * `Ok(String)` - The body of a successful, body-bearing response
    /// * `Err(ProxyError::UpstreamUnreachable)` - On any transport failure
    /// * `Err(ProxyError::UpstreamError)` - If upstream answered with 4xx/5xx
    /// * `Err(ProxyError::EmptyUpstreamResponse)` - If upstream answered 204/304
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        debug!(url, "fetching upstream document");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| ProxyError::UpstreamUnreachable(e.to_string()))?;

        let status = status::lookup(response.status().as_u16())?;
        if status.is_error() {
            return Err(ProxyError::UpstreamError(*status));
        }
        if !status.can_have_body() {
            return Err(ProxyError::EmptyUpstreamResponse(*status));
        }

        response
            .text()
            .await
            .map_err(|e| ProxyError::UpstreamUnreachable(e.to_string()))
    }

    /// Fetches an upstream document and shapes it
    ///
    /// # Arguments
    /// * `url` - Full upstream URL
    /// * `shape` - Turns the parsed document into the caller's value
    pub async fn fetch<T, F>(&self, url: &str, shape: F) -> Result<T>
    where
        F: FnOnce(&Document<'_>) -> Result<T>,
    {
        let body = self.fetch_text(url).await?;
        let doc = xml::parse(&body)?;
        shape(&doc).inspect_err(|e| debug!(url, error = %e, "could not shape upstream document"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::predictions;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SUMMARY_XML: &str = include_str!("../tests/fixtures/predictionsummary.xml");

    async fn mount(server: &MockServer, route: &str, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(response)
            .mount(server)
            .await;
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = UpstreamClient::with_base_url("http://localhost:9999/trackernet/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:9999/trackernet");
    }

    #[tokio::test]
    async fn test_fetch_shapes_document() {
        let server = MockServer::start().await;
        mount(
            &server,
            "/predictionsummary/c",
            ResponseTemplate::new(200).set_body_string(SUMMARY_XML),
        )
        .await;

        let client = UpstreamClient::with_base_url(server.uri()).unwrap();
        let url = format!("{}/predictionsummary/c", client.base_url());
        let summary = client.fetch(&url, predictions::summary).await.unwrap();

        assert_eq!(summary.created, "2026/10/18 09:15:02");
        assert_eq!(summary.stations.len(), 3);
    }

    #[tokio::test]
    async fn test_error_status_is_upstream_error() {
        let server = MockServer::start().await;
        mount(&server, "/linestatus", ResponseTemplate::new(503)).await;

        let client = UpstreamClient::with_base_url(server.uri()).unwrap();
        let err = client
            .fetch_text(&format!("{}/linestatus", server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(err, ProxyError::UpstreamError(status) if status.code == 503));
    }

    #[tokio::test]
    async fn test_no_content_is_empty_response() {
        let server = MockServer::start().await;
        mount(&server, "/linestatus", ResponseTemplate::new(204)).await;

        let client = UpstreamClient::with_base_url(server.uri()).unwrap();
        let err = client
            .fetch_text(&format!("{}/linestatus", server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(err, ProxyError::EmptyUpstreamResponse(status) if status.code == 204));
    }

    #[tokio::test]
    async fn test_uncatalogued_status_is_rejected() {
        let server = MockServer::start().await;
        mount(&server, "/linestatus", ResponseTemplate::new(418)).await;

        let client = UpstreamClient::with_base_url(server.uri()).unwrap();
        let err = client
            .fetch_text(&format!("{}/linestatus", server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(err, ProxyError::Status(_)));
    }

    #[tokio::test]
    async fn test_invalid_xml_is_malformed() {
        let server = MockServer::start().await;
        mount(
            &server,
            "/predictionsummary/c",
            ResponseTemplate::new(200).set_body_string("<html>maintenance</body>"),
        )
        .await;

        let client = UpstreamClient::with_base_url(server.uri()).unwrap();
        let err = client
            .fetch(
                &format!("{}/predictionsummary/c", server.uri()),
                predictions::summary,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ProxyError::MalformedUpstreamResponse(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_unreachable() {
        // Bind and drop a listener so the port is very likely closed
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let client = UpstreamClient::with_base_url(format!("http://127.0.0.1:{}", port)).unwrap();
        let err = client
            .fetch_text(&format!("{}/linestatus", client.base_url()))
            .await
            .unwrap_err();

        assert!(matches!(err, ProxyError::UpstreamUnreachable(_)));
    }
}
