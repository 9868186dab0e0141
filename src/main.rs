//! TfL TrackerNet Proxy - CGI entry point
//!
//! Serves one request per process: reads it from the CGI environment (or
//! `--query`), answers from cache or upstream, and writes the CGI response to
//! stdout. Request failures are responses; only configuration problems make
//! the process exit non-zero.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Instant;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use tflproxy::cgi;
use tflproxy::cli::{Cli, CliError, ProxyConfig};
use tflproxy::dispatch::Response;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match init_logging(&cli) {
        Ok(()) => run(&cli).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Serves the request described by the CLI and environment
async fn run(cli: &Cli) -> Result<(), CliError> {
    let config = ProxyConfig::from_cli(cli)?;
    let dispatcher = config.dispatcher()?;

    let request = cli.request();
    let started = Instant::now();
    info!(method = %request.method, query = %request.query, "handling request");

    let response = match request.params() {
        Ok(params) => dispatcher.handle(&params).await,
        Err(e) => {
            info!(error = %e, "rejected request");
            Response::from_error(&e)
        }
    };

    info!(
        status = %response.status,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request finished"
    );

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(cgi::render(&response, cli.nph).as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(CliError::Output)
}

/// Initialize logging on stderr, or on the log file if one was given
///
/// `RUST_LOG` takes precedence over the `--verbose` level.
fn init_logging(cli: &Cli) -> Result<(), CliError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tflproxy={}", cli.log_level())));
    let subscriber = fmt().with_env_filter(filter).with_target(false);

    match &cli.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| CliError::LogFile {
                    path: path.clone(),
                    source,
                })?;
            subscriber
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => subscriber.with_writer(io::stderr).init(),
    }

    Ok(())
}
