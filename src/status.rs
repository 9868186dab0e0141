//! HTTP status code registry
//!
//! A static catalog of the status codes the proxy can report, each carrying
//! whether it is an error and whether a response with that code may carry a
//! body. Both upstream failures and malformed requests are expressed through
//! these codes.

use std::fmt;

use thiserror::Error;

/// Errors raised by status code lookups
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StatusError {
    /// The numeric code is not part of the catalog
    #[error("Unknown status code: {0}")]
    UnknownStatusCode(u16),
}

/// A single catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCode {
    /// Numeric code, e.g. 404
    pub code: u16,
    /// Reason phrase, e.g. "Not Found"
    pub message: &'static str,
}

impl StatusCode {
    const fn new(code: u16, message: &'static str) -> Self {
        Self { code, message }
    }

    /// Whether the code signals a failure (4xx and 5xx)
    pub fn is_error(&self) -> bool {
        self.code >= 400
    }

    /// Whether a response with this code may carry a body
    ///
    /// Informational codes, 204 No Content and 304 Not Modified never do.
    pub fn can_have_body(&self) -> bool {
        !(100..200).contains(&self.code) && self.code != 204 && self.code != 304
    }

    /// Renders the status as "404 Not Found"
    pub fn http_status(&self) -> String {
        format!("{} {}", self.code, self.message)
    }

    /// Renders the status as "HTTP/1.1 404 Not Found"
    pub fn http_header(&self) -> String {
        format!("HTTP/1.1 {} {}", self.code, self.message)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.message)
    }
}

pub const CONTINUE: StatusCode = StatusCode::new(100, "Continue");
pub const SWITCHING_PROTOCOLS: StatusCode = StatusCode::new(101, "Switching Protocols");
pub const OK: StatusCode = StatusCode::new(200, "OK");
pub const CREATED: StatusCode = StatusCode::new(201, "Created");
pub const ACCEPTED: StatusCode = StatusCode::new(202, "Accepted");
pub const NON_AUTHORITATIVE_INFORMATION: StatusCode =
    StatusCode::new(203, "Non-Authoritative Information");
pub const NO_CONTENT: StatusCode = StatusCode::new(204, "No Content");
pub const RESET_CONTENT: StatusCode = StatusCode::new(205, "Reset Content");
pub const PARTIAL_CONTENT: StatusCode = StatusCode::new(206, "Partial Content");
pub const MULTIPLE_CHOICES: StatusCode = StatusCode::new(300, "Multiple Choices");
pub const MOVED_PERMANENTLY: StatusCode = StatusCode::new(301, "Moved Permanently");
pub const FOUND: StatusCode = StatusCode::new(302, "Found");
pub const SEE_OTHER: StatusCode = StatusCode::new(303, "See Other");
pub const NOT_MODIFIED: StatusCode = StatusCode::new(304, "Not Modified");
pub const USE_PROXY: StatusCode = StatusCode::new(305, "Use Proxy");
pub const UNUSED: StatusCode = StatusCode::new(306, "(Unused)");
pub const TEMPORARY_REDIRECT: StatusCode = StatusCode::new(307, "Temporary Redirect");
pub const BAD_REQUEST: StatusCode = StatusCode::new(400, "Bad Request");
pub const UNAUTHORIZED: StatusCode = StatusCode::new(401, "Unauthorized");
pub const PAYMENT_REQUIRED: StatusCode = StatusCode::new(402, "Payment Required");
pub const FORBIDDEN: StatusCode = StatusCode::new(403, "Forbidden");
pub const NOT_FOUND: StatusCode = StatusCode::new(404, "Not Found");
pub const METHOD_NOT_ALLOWED: StatusCode = StatusCode::new(405, "Method Not Allowed");
pub const NOT_ACCEPTABLE: StatusCode = StatusCode::new(406, "Not Acceptable");
pub const PROXY_AUTHENTICATION_REQUIRED: StatusCode =
    StatusCode::new(407, "Proxy Authentication Required");
pub const REQUEST_TIMEOUT: StatusCode = StatusCode::new(408, "Request Timeout");
pub const CONFLICT: StatusCode = StatusCode::new(409, "Conflict");
pub const GONE: StatusCode = StatusCode::new(410, "Gone");
pub const LENGTH_REQUIRED: StatusCode = StatusCode::new(411, "Length Required");
pub const PRECONDITION_FAILED: StatusCode = StatusCode::new(412, "Precondition Failed");
pub const REQUEST_ENTITY_TOO_LARGE: StatusCode =
    StatusCode::new(413, "Request Entity Too Large");
pub const REQUEST_URI_TOO_LONG: StatusCode = StatusCode::new(414, "Request-URI Too Long");
pub const UNSUPPORTED_MEDIA_TYPE: StatusCode = StatusCode::new(415, "Unsupported Media Type");
pub const REQUESTED_RANGE_NOT_SATISFIABLE: StatusCode =
    StatusCode::new(416, "Requested Range Not Satisfiable");
pub const EXPECTATION_FAILED: StatusCode = StatusCode::new(417, "Expectation Failed");
pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode::new(500, "Internal Server Error");
pub const NOT_IMPLEMENTED: StatusCode = StatusCode::new(501, "Not Implemented");
pub const BAD_GATEWAY: StatusCode = StatusCode::new(502, "Bad Gateway");
pub const SERVICE_UNAVAILABLE: StatusCode = StatusCode::new(503, "Service Unavailable");
pub const GATEWAY_TIMEOUT: StatusCode = StatusCode::new(504, "Gateway Timeout");
pub const HTTP_VERSION_NOT_SUPPORTED: StatusCode =
    StatusCode::new(505, "HTTP Version Not Supported");

/// Every known status code, ordered by code
pub static STATUS_CODES: [StatusCode; 41] = [
    CONTINUE,
    SWITCHING_PROTOCOLS,
    OK,
    CREATED,
    ACCEPTED,
    NON_AUTHORITATIVE_INFORMATION,
    NO_CONTENT,
    RESET_CONTENT,
    PARTIAL_CONTENT,
    MULTIPLE_CHOICES,
    MOVED_PERMANENTLY,
    FOUND,
    SEE_OTHER,
    NOT_MODIFIED,
    USE_PROXY,
    UNUSED,
    TEMPORARY_REDIRECT,
    BAD_REQUEST,
    UNAUTHORIZED,
    PAYMENT_REQUIRED,
    FORBIDDEN,
    NOT_FOUND,
    METHOD_NOT_ALLOWED,
    NOT_ACCEPTABLE,
    PROXY_AUTHENTICATION_REQUIRED,
    REQUEST_TIMEOUT,
    CONFLICT,
    GONE,
    LENGTH_REQUIRED,
    PRECONDITION_FAILED,
    REQUEST_ENTITY_TOO_LARGE,
    REQUEST_URI_TOO_LONG,
    UNSUPPORTED_MEDIA_TYPE,
    REQUESTED_RANGE_NOT_SATISFIABLE,
    EXPECTATION_FAILED,
    INTERNAL_SERVER_ERROR,
    NOT_IMPLEMENTED,
    BAD_GATEWAY,
    SERVICE_UNAVAILABLE,
    GATEWAY_TIMEOUT,
    HTTP_VERSION_NOT_SUPPORTED,
];

/// Looks up a status code in the catalog
///
/// # Returns
/// * `Ok(&StatusCode)` for a catalogued code
/// * `Err(StatusError::UnknownStatusCode)` otherwise
pub fn lookup(code: u16) -> Result<&'static StatusCode, StatusError> {
    STATUS_CODES
        .binary_search_by_key(&code, |status| status.code)
        .map(|index| &STATUS_CODES[index])
        .map_err(|_| StatusError::UnknownStatusCode(code))
}

/// Renders a numeric code as "404 Not Found"
pub fn http_status(code: u16) -> Result<String, StatusError> {
    lookup(code).map(StatusCode::http_status)
}

/// Renders a numeric code as "HTTP/1.1 404 Not Found"
pub fn http_header(code: u16) -> Result<String, StatusError> {
    lookup(code).map(StatusCode::http_header)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_sorted_and_unique() {
        for pair in STATUS_CODES.windows(2) {
            assert!(pair[0].code < pair[1].code, "{} before {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_lookup_known_code() {
        let status = lookup(404).unwrap();
        assert_eq!(status.message, "Not Found");
        assert!(status.is_error());
        assert!(status.can_have_body());
    }

    #[test]
    fn test_lookup_unknown_code() {
        assert_eq!(lookup(418), Err(StatusError::UnknownStatusCode(418)));
        assert_eq!(lookup(0), Err(StatusError::UnknownStatusCode(0)));
    }

    #[test]
    fn test_error_flag_starts_at_400() {
        assert!(!lookup(307).unwrap().is_error());
        assert!(lookup(400).unwrap().is_error());
        assert!(lookup(505).unwrap().is_error());
    }

    #[test]
    fn test_bodyless_codes() {
        assert!(!CONTINUE.can_have_body());
        assert!(!SWITCHING_PROTOCOLS.can_have_body());
        assert!(!NO_CONTENT.can_have_body());
        assert!(!NOT_MODIFIED.can_have_body());
        assert!(OK.can_have_body());
        assert!(RESET_CONTENT.can_have_body());
        assert!(INTERNAL_SERVER_ERROR.can_have_body());
    }

    #[test]
    fn test_renderers() {
        assert_eq!(http_status(404).unwrap(), "404 Not Found");
        assert_eq!(http_header(404).unwrap(), "HTTP/1.1 404 Not Found");
        assert_eq!(UNUSED.http_status(), "306 (Unused)");
        assert!(http_status(999).is_err());
    }
}
