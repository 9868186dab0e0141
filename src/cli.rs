//! Command-line interface parsing for the TrackerNet proxy
//!
//! This module handles parsing of CLI arguments using clap, with environment
//! variable fallbacks so the binary can be configured from a web server's
//! CGI environment.

use std::io;
use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::cache::CacheManager;
use crate::cgi::CgiRequest;
use crate::dispatch::QueryDispatcher;
use crate::error::ProxyError;
use crate::fetch::{UpstreamClient, DEFAULT_BASE_URL};

/// Cache root used when no platform cache directory is available
const FALLBACK_CACHE_DIR: &str = "cache";

/// Error types for configuration and process-level failures
#[derive(Debug, Error)]
pub enum CliError {
    /// The upstream base URL is not an http(s) URL
    #[error("Invalid base URL: '{0}'. It must start with http:// or https://")]
    InvalidBaseUrl(String),

    /// The log file could not be opened for appending
    #[error("Failed to open log file '{}': {source}", .path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The response could not be written to stdout
    #[error("Failed to write response: {0}")]
    Output(#[source] io::Error),

    /// The proxy could not be assembled
    #[error(transparent)]
    Proxy(#[from] ProxyError),
}

/// TfL TrackerNet proxy - serves the live XML feed as cached JSON
#[derive(Parser, Debug)]
#[command(name = "tflproxy")]
#[command(about = "Caching CGI proxy from TfL TrackerNet XML to JSON")]
#[command(version)]
pub struct Cli {
    /// Directory holding cached responses
    #[arg(long, env = "TFLPROXY_CACHE_DIR", value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Base URL of the TrackerNet feed
    #[arg(long, env = "TFLPROXY_BASE_URL", value_name = "URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Serve one query string instead of reading the CGI environment
    ///
    /// Examples:
    ///   tflproxy --query "request=linestatus"
    ///   tflproxy --query "request=predictiondetailed&line=b&station=oxc"
    #[arg(long, value_name = "QUERY_STRING")]
    pub query: Option<String>,

    /// Emit a full HTTP status line (non-parsed-header CGI)
    #[arg(long)]
    pub nph: bool,

    /// Append logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Default log level for this crate
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    /// The request to serve: `--query` if given, else the CGI environment
    pub fn request(&self) -> CgiRequest {
        match &self.query {
            Some(query) => CgiRequest::get(query.as_str()),
            None => CgiRequest::from_env(),
        }
    }
}

/// Validated proxy settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub cache_dir: PathBuf,
    pub base_url: String,
}

impl ProxyConfig {
    /// Creates a ProxyConfig from parsed CLI arguments.
    ///
    /// # Arguments
    /// * `cli` - The parsed CLI struct
    ///
    /// # Returns
    /// * `Ok(ProxyConfig)` with the cache root resolved
    /// * `Err(CliError::InvalidBaseUrl)` if the base URL is not http(s)
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        Ok(ProxyConfig {
            cache_dir: cli
                .cache_dir
                .clone()
                .or_else(CacheManager::default_dir)
                .unwrap_or_else(|| PathBuf::from(FALLBACK_CACHE_DIR)),
            base_url: parse_base_url(&cli.base_url)?,
        })
    }

    /// Builds the dispatcher these settings describe
    pub fn dispatcher(&self) -> Result<QueryDispatcher, CliError> {
        Ok(QueryDispatcher::new(
            CacheManager::with_dir(self.cache_dir.clone()),
            UpstreamClient::with_base_url(self.base_url.as_str())?,
        ))
    }
}

/// Checks the scheme of a base URL and trims any trailing slash
pub fn parse_base_url(s: &str) -> Result<String, CliError> {
    let trimmed = s.trim();
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(CliError::InvalidBaseUrl(s.to_string()));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}
