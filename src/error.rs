//! Error taxonomy for the proxy
//!
//! Every failure a request can hit is a `ProxyError`, and every `ProxyError`
//! maps onto a catalogued status code so the adapter can render it.

use thiserror::Error;

use crate::status::{self, StatusCode, StatusError};

/// Errors that can occur while serving a query
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The request used a transport method other than GET
    #[error("Only accept 'GET' method, not {0}")]
    MethodNotAllowed(String),

    /// No `request` parameter was supplied
    #[error("Empty request")]
    EmptyRequest,

    /// The `request` parameter names no known query
    #[error("Invalid request '{0}'")]
    UnknownQueryKind(String),

    /// A required parameter is absent
    #[error("Missing non-optional parameter '{0}'")]
    MissingParameter(&'static str),

    /// A parameter is present but unusable
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// The upstream host could not be reached (DNS, refused, timeout)
    #[error("Upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    /// The upstream answered with an error status
    #[error("Upstream returned {0}")]
    UpstreamError(StatusCode),

    /// The upstream answered with a status that carries no body
    #[error("No content in upstream response ({0})")]
    EmptyUpstreamResponse(StatusCode),

    /// The upstream body was not the XML document we expected
    #[error("Malformed upstream response: {0}")]
    MalformedUpstreamResponse(String),

    /// A cache entry exists but could not be read
    #[error("Cache read failed: {0}")]
    CacheReadFailure(#[source] std::io::Error),

    /// A cache entry could not be written
    #[error("Cache write failed: {0}")]
    CachePersistFailure(#[source] std::io::Error),

    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// A status code outside the catalog was encountered
    #[error(transparent)]
    Status(#[from] StatusError),

    /// A response document could not be serialized
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProxyError {
    /// Shorthand for an `InvalidParameter` error
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        ProxyError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Shorthand for a `MalformedUpstreamResponse` error
    pub fn malformed(reason: impl Into<String>) -> Self {
        ProxyError::MalformedUpstreamResponse(reason.into())
    }

    /// The status code a response for this error should carry
    pub fn status(&self) -> &'static StatusCode {
        match self {
            ProxyError::MethodNotAllowed(_) => &status::METHOD_NOT_ALLOWED,
            ProxyError::EmptyRequest
            | ProxyError::UnknownQueryKind(_)
            | ProxyError::MissingParameter(_)
            | ProxyError::InvalidParameter { .. } => &status::BAD_REQUEST,
            ProxyError::UpstreamUnreachable(_) => &status::GATEWAY_TIMEOUT,
            ProxyError::UpstreamError(_)
            | ProxyError::EmptyUpstreamResponse(_)
            | ProxyError::MalformedUpstreamResponse(_) => &status::BAD_GATEWAY,
            ProxyError::CacheReadFailure(_)
            | ProxyError::CachePersistFailure(_)
            | ProxyError::ClientBuild(_)
            | ProxyError::Status(_)
            | ProxyError::Json(_) => &status::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the fault lies with the caller rather than upstream or local I/O
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ProxyError::MethodNotAllowed(_)
                | ProxyError::EmptyRequest
                | ProxyError::UnknownQueryKind(_)
                | ProxyError::MissingParameter(_)
                | ProxyError::InvalidParameter { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ProxyError>;
