//! Request dispatch
//!
//! Turns a flat parameter map into a response: validate, consult the cache,
//! fetch and shape on a miss, then persist the fresh result.

use std::time::Duration;

use serde_json::json;
use tracing::{error, info, warn};

use crate::cache::{CacheFs, CacheManager, DiskFs};
use crate::error::{ProxyError, Result};
use crate::fetch::UpstreamClient;
use crate::query::{stations, QueryKind, RequestParams, Shaping, REQUEST};
use crate::status::{self, StatusCode};

/// A finished response, ready for the adapter to render
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: &'static StatusCode,
    /// JSON body, absent for statuses that cannot carry one
    pub body: Option<String>,
    /// How long clients may reuse a successful response
    pub max_age: Option<Duration>,
}

impl Response {
    /// A successful JSON response
    pub fn ok(body: String, max_age: Duration) -> Self {
        Self {
            status: &status::OK,
            body: Some(body),
            max_age: Some(max_age),
        }
    }

    /// An error response with a `{"status", "message"}` body
    pub fn from_error(err: &ProxyError) -> Self {
        let status = err.status();
        let body = status.can_have_body().then(|| {
            json!({
                "status": status.code,
                "message": err.to_string(),
            })
            .to_string()
        });

        Self {
            status,
            body,
            max_age: None,
        }
    }
}

/// Resolves the query kind named by the `request` parameter
pub fn resolve_kind(raw: &RequestParams) -> Result<QueryKind> {
    match raw.get(REQUEST).map(String::as_str) {
        None | Some("") => Err(ProxyError::EmptyRequest),
        Some(value) => QueryKind::from_request(value),
    }
}

/// Serves queries from the cache or from upstream
#[derive(Debug, Clone)]
pub struct QueryDispatcher<F = DiskFs> {
    cache: CacheManager<F>,
    upstream: UpstreamClient,
}

impl<F: CacheFs> QueryDispatcher<F> {
    pub fn new(cache: CacheManager<F>, upstream: UpstreamClient) -> Self {
        Self { cache, upstream }
    }

    /// Handles one request, mapping every failure onto a response
    pub async fn handle(&self, raw: &RequestParams) -> Response {
        let outcome = match resolve_kind(raw) {
            Ok(kind) => self
                .execute(kind, raw)
                .await
                .map(|body| Response::ok(body, kind.descriptor().ttl)),
            Err(e) => Err(e),
        };

        outcome.unwrap_or_else(|e| {
            if e.is_client_error() {
                info!(error = %e, "rejected request");
            } else {
                error!(error = %e, "request failed");
            }
            Response::from_error(&e)
        })
    }

    /// Produces the JSON body for a query
    ///
    /// # Arguments
    /// * `kind` - The query to serve
    /// * `raw` - Request parameters; those the query does not accept are ignored
    ///
    /// # Returns
    /// * `Ok(String)` - A cached body served verbatim, or a freshly shaped one
    /// * `Err(ProxyError)` - Validation, upstream or cache read failure
    ///
    /// Parameters are validated before any I/O. A failure to persist a fresh
    /// result is logged and does not fail the request.
    pub async fn execute(&self, kind: QueryKind, raw: &RequestParams) -> Result<String> {
        let descriptor = kind.descriptor();
        let params = descriptor.filter_params(raw);
        descriptor.check_required(&params)?;
        let discriminator = descriptor.discriminator(&params)?;

        let path = descriptor.cache_path_for(self.cache.cache_dir(), &discriminator);
        if let Some(body) = self.cache.read(&path, descriptor.ttl)? {
            info!(%kind, path = %path.display(), "served from cache");
            return Ok(body);
        }

        let document = match descriptor.shaping {
            Shaping::Document(shape) => {
                let url = descriptor.url_for(self.upstream.base_url(), &discriminator);
                self.upstream.fetch(&url, shape).await?
            }
            Shaping::FanOut => stations::collect(&self.upstream).await?,
        };
        let body = document.to_json()?;

        if let Err(e) = self.cache.write(&path, &body) {
            warn!(%kind, error = %e, "serving uncached response");
        } else {
            info!(%kind, path = %path.display(), "served from upstream");
        }

        Ok(body)
    }
}
