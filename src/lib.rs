//! TfL TrackerNet Proxy Library
//!
//! Fetches TrackerNet XML documents, reshapes them into JSON and keeps the
//! results in a per-query disk cache. The binary wraps this library in a CGI
//! adapter; the modules are public for use in integration tests.

pub mod cache;
pub mod cgi;
pub mod cli;
pub mod data;
pub mod dispatch;
pub mod error;
pub mod fetch;
pub mod query;
pub mod status;
