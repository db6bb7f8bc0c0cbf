//! Provider and configuration errors.
//!
//! `ProviderError` is defined in `gradewise-core` so the grader can classify
//! failures by downcasting; it is re-exported here for convenience.

use thiserror::Error;

pub use gradewise_core::error::ProviderError;

/// Errors resolving providers and settings from configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No provider with this name is configured.
    #[error("provider '{name}' not found in config. Available: {available:?}")]
    UnknownProvider {
        name: String,
        available: Vec<String>,
    },

    /// A capability was requested but no provider is assigned to it.
    #[error("no {capability} provider configured; set `{key}` in gradewise.toml")]
    Unassigned {
        capability: &'static str,
        key: &'static str,
    },

    /// No similarity threshold was given on the command line or in config.
    #[error(
        "no grading threshold configured; \
         pass --threshold or set `threshold` in gradewise.toml"
    )]
    MissingThreshold,
}

/// Classify a failed request.
pub(crate) fn request_error(
    e: reqwest::Error,
    service: &str,
    base_url: &str,
    timeout_secs: u64,
) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(timeout_secs)
    } else if e.is_connect() {
        ProviderError::NetworkError(format!("{service} not reachable at {base_url}"))
    } else {
        ProviderError::NetworkError(e.to_string())
    }
}

/// Turn an error status into a `ProviderError`, passing successes through.
pub(crate) async fn check_status(
    response: reqwest::Response,
    model: &str,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status().as_u16();
    if status >= 400 {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::from_status(status, body, model));
    }
    Ok(response)
}

/// Error for a response body that did not match the expected shape.
pub(crate) fn parse_error(e: impl std::fmt::Display) -> ProviderError {
    ProviderError::ApiError {
        status: 0,
        message: format!("failed to parse response: {e}"),
    }
}

pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ProviderError::NetworkError(format!("failed to build HTTP client: {e}")))
}
