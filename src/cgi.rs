//! CGI adapter
//!
//! Reads the request from the CGI environment and renders a `Response` as the
//! header block plus body that the web server expects on stdout.

use std::env;

use url::form_urlencoded;

use crate::dispatch::Response;
use crate::error::{ProxyError, Result};
use crate::query::RequestParams;

/// Content type of every response
pub const CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// The only transport method served
const GET: &str = "GET";

/// A request as handed over by the web server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CgiRequest {
    pub method: String,
    pub query: String,
}

impl CgiRequest {
    pub fn new(method: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            query: query.into(),
        }
    }

    /// Reads `REQUEST_METHOD` and `QUERY_STRING`, defaulting to an empty GET
    pub fn from_env() -> Self {
        Self::new(
            env::var("REQUEST_METHOD").unwrap_or_else(|_| GET.to_string()),
            env::var("QUERY_STRING").unwrap_or_default(),
        )
    }

    /// A GET request for the given query string
    pub fn get(query: impl Into<String>) -> Self {
        Self::new(GET, query)
    }

    /// Decoded request parameters
    ///
    /// # Returns
    /// * `Ok(RequestParams)` - Lower-cased parameters, first value per key
    /// * `Err(ProxyError::MethodNotAllowed)` - If the method is not GET
    pub fn params(&self) -> Result<RequestParams> {
        if !self.method.eq_ignore_ascii_case(GET) {
            return Err(ProxyError::MethodNotAllowed(self.method.clone()));
        }
        Ok(parse_query_string(&self.query))
    }
}

/// Decodes a query string into parameters
///
/// The whole string is lower-cased first. When a key repeats, its first
/// non-empty value is kept.
pub fn parse_query_string(query: &str) -> RequestParams {
    let lowered = query.to_lowercase();
    let mut params = RequestParams::new();
    for (name, value) in form_urlencoded::parse(lowered.as_bytes()) {
        if value.is_empty() {
            continue;
        }
        params
            .entry(name.into_owned())
            .or_insert_with(|| value.into_owned());
    }
    params
}

/// Renders a response as CGI output
///
/// With `nph` the first line is a full HTTP status line, otherwise a
/// `Status:` header for the server to translate.
pub fn render(response: &Response, nph: bool) -> String {
    let mut out = if nph {
        response.status.http_header()
    } else {
        format!("Status: {}", response.status.http_status())
    };
    out.push_str("\r\n");

    if let Some(body) = &response.body {
        out.push_str(&format!("Content-Type: {}\r\n", CONTENT_TYPE));
        out.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    if let Some(max_age) = response.max_age {
        out.push_str(&format!(
            "Cache-Control: public, max-age={}\r\n",
            max_age.as_secs()
        ));
    }
    out.push_str("\r\n");

    if let Some(body) = &response.body {
        out.push_str(body);
    }
    out
}
