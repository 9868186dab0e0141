//! Integration tests for the CGI binary
//!
//! Runs the compiled proxy against requests that are rejected before any
//! upstream call, so no network access is needed.

use std::process::{Command, Output};

use tempfile::TempDir;

/// Helper to run the proxy with given args and environment, capturing output
fn run_proxy(args: &[&str], env: &[(&str, &str)]) -> (Output, TempDir) {
    let cache_dir = TempDir::new().expect("Failed to create temp directory");
    let output = Command::new(env!("CARGO_BIN_EXE_tflproxy"))
        .args(args)
        .env_remove("REQUEST_METHOD")
        .env_remove("QUERY_STRING")
        .env_remove("RUST_LOG")
        .env("TFLPROXY_CACHE_DIR", cache_dir.path())
        .env("TFLPROXY_BASE_URL", "http://127.0.0.1:9/trackernet")
        .envs(env.iter().copied())
        .output()
        .expect("Failed to execute tflproxy");
    (output, cache_dir)
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_help_flag_exits_successfully() {
    let (output, _cache) = run_proxy(&["--help"], &[]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = stdout(&output);
    assert!(stdout.contains("tflproxy"), "Help should mention tflproxy");
    assert!(stdout.contains("--query"), "Help should mention --query flag");
    assert!(stdout.contains("--cache-dir"), "Help should mention --cache-dir flag");
}

#[test]
fn test_unknown_request_is_bad_request() {
    let (output, _cache) = run_proxy(&["--query", "request=bogus"], &[]);
    assert!(output.status.success(), "Request errors are still responses");

    let stdout = stdout(&output);
    assert!(stdout.starts_with("Status: 400 Bad Request\r\n"), "{}", stdout);
    assert!(stdout.contains("Content-Type: application/json; charset=UTF-8"));
    assert!(stdout.contains("Invalid request 'bogus'"));
}

#[test]
fn test_empty_cgi_request() {
    let (output, _cache) = run_proxy(&[], &[("REQUEST_METHOD", "GET"), ("QUERY_STRING", "")]);
    assert!(output.status.success());
    let stdout = stdout(&output);
    assert!(stdout.starts_with("Status: 400 Bad Request"));
    assert!(stdout.contains("Empty request"));
}

#[test]
fn test_post_is_method_not_allowed() {
    let (output, _cache) = run_proxy(
        &[],
        &[("REQUEST_METHOD", "POST"), ("QUERY_STRING", "request=linestatus")],
    );
    assert!(output.status.success());
    let stdout = stdout(&output);
    assert!(stdout.starts_with("Status: 405 Method Not Allowed"), "{}", stdout);
    assert!(stdout.contains("Only accept 'GET' method, not POST"));
}

#[test]
fn test_nph_status_line() {
    let (output, _cache) = run_proxy(&["--nph", "--query", "request=predictionsummary"], &[]);
    assert!(output.status.success());
    let stdout = stdout(&output);
    assert!(stdout.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{}", stdout);
    assert!(stdout.contains("Missing non-optional parameter 'line'"));
}

#[test]
fn test_query_is_case_insensitive() {
    let (output, _cache) = run_proxy(&["--query", "REQUEST=PredictionSummary&LINE=Z"], &[]);
    let stdout = stdout(&output);
    assert!(stdout.starts_with("Status: 400 Bad Request"));
    assert!(stdout.contains("Line code 'z' is not valid"), "{}", stdout);
}

#[test]
fn test_invalid_base_url_exits_with_error() {
    let (output, _cache) = run_proxy(
        &["--base-url", "cloud.tfl.gov.uk", "--query", "request=linestatus"],
        &[],
    );
    assert!(
        !output.status.success(),
        "Expected an invalid base URL to fail"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid base URL"), "{}", stderr);
    assert!(output.stdout.is_empty());
}

#[test]
fn test_log_file_receives_request_log() {
    let logs = TempDir::new().unwrap();
    let log_path = logs.path().join("proxy.log");
    let (output, _cache) = run_proxy(
        &[
            "--log-file",
            log_path.to_str().unwrap(),
            "--query",
            "request=bogus",
        ],
        &[],
    );
    assert!(output.status.success());

    let log = std::fs::read_to_string(&log_path).expect("log file should exist");
    assert!(log.contains("handling request"));
    assert!(log.contains("request finished"));
}
