//! Generic HTTP client tools
//!
//! Reusable request execution shared by provider adapters. Each adapter still
//! builds and signs its own `RequestBuilder`; this module only sends it, logs
//! the exchange and classifies transport-level failures.

use std::error::Error as StdError;
use std::future::Future;
use std::time::Duration;

use reqwest::RequestBuilder;

use crate::error::{ApiFault, DnsError};
use crate::utils::log_sanitizer::truncate_for_log;

/// HTTP tool function set
pub struct HttpUtils;

impl HttpUtils {
    /// Performs an HTTP request and returns status code and response text.
    ///
    /// HTTP 429 becomes [`DnsError::RateLimited`] and 502/503/504 become
    /// [`DnsError::Transport`]; every other status is returned to the caller
    /// for provider-specific error mapping.
    pub async fn execute_request(
        request_builder: RequestBuilder,
        provider_name: &str,
        method_name: &str,
        url_or_action: &str,
    ) -> Result<(u16, String), DnsError> {
        log::debug!("[{provider_name}] {method_name} {url_or_action}");

        let response = request_builder
            .send()
            .await
            .map_err(|e| transport_error(provider_name, &e))?;

        let status_code = response.status().as_u16();
        log::debug!("[{provider_name}] Response Status: {status_code}");

        // Extract Retry-After header (before consuming response body)
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        if status_code == 429 {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[{provider_name}] Rate limited (HTTP 429), retry_after={retry_after:?}");
            return Err(DnsError::RateLimited {
                provider: provider_name.to_string(),
                retry_after,
                fault: ApiFault::new("TooManyRequests", truncate_for_log(&body)).with_status(429),
            });
        }

        if matches!(status_code, 502..=504) {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[{provider_name}] Server error (HTTP {status_code})");
            return Err(DnsError::Transport {
                provider: provider_name.to_string(),
                detail: format!("HTTP {status_code}: {}", truncate_for_log(&body)),
                syscall: None,
                errno: None,
            });
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| DnsError::Transport {
                provider: provider_name.to_string(),
                detail: format!("Failed to read response body: {e}"),
                syscall: None,
                errno: None,
            })?;

        log::debug!(
            "[{provider_name}] Response Body: {}",
            truncate_for_log(&response_text)
        );

        Ok((status_code, response_text))
    }

    /// Run `attempt` up to `max_retries + 1` times.
    ///
    /// Only transient failures are retried (see [`is_retryable`]), with
    /// exponential backoff or the provider's `Retry-After`. Callers must only
    /// pass idempotent requests; `max_retries == 0` runs exactly once.
    pub async fn with_retry<T, F, Fut>(
        provider_name: &str,
        max_retries: u32,
        mut attempt: F,
    ) -> Result<T, DnsError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DnsError>>,
    {
        let mut tried = 0;
        loop {
            match attempt().await {
                Ok(value) => return Ok(value),
                Err(e) if tried < max_retries && is_retryable(&e) => {
                    let delay = retry_delay(&e, tried);
                    log::warn!(
                        "[{}] Request failed (attempt {}/{}), retrying in {:.1}s: {}",
                        provider_name,
                        tried + 1,
                        max_retries,
                        delay.as_secs_f32(),
                        e
                    );
                    tokio::time::sleep(delay).await;
                    tried += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Classify a `reqwest` send failure, keeping the OS error number when the
/// failure came from a socket.
fn transport_error(provider_name: &str, error: &reqwest::Error) -> DnsError {
    if error.is_timeout() {
        return DnsError::Timeout {
            provider: provider_name.to_string(),
            detail: error.to_string(),
        };
    }

    let errno = io_source(error).and_then(std::io::Error::raw_os_error);
    let syscall = if error.is_connect() {
        Some("connect".to_string())
    } else if errno.is_some() {
        Some("socket".to_string())
    } else {
        None
    };

    DnsError::Transport {
        provider: provider_name.to_string(),
        detail: error.to_string(),
        syscall,
        errno,
    }
}

fn io_source<'a>(error: &'a (dyn StdError + 'static)) -> Option<&'a std::io::Error> {
    let mut source = error.source();
    while let Some(err) = source {
        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            return Some(io);
        }
        source = err.source();
    }
    None
}

/// Determine whether the error can be retried
///
/// Network errors, timeouts, and throttling are worth retrying; provider
/// rejections and client errors are not.
fn is_retryable(error: &DnsError) -> bool {
    matches!(
        error,
        DnsError::Transport { .. } | DnsError::Timeout { .. } | DnsError::RateLimited { .. }
    )
}

/// Calculate retry delay
///
/// Use `retry_after` (capped at 30s) when the provider sent one, otherwise
/// exponential backoff.
fn retry_delay(error: &DnsError, attempt: u32) -> Duration {
    if let DnsError::RateLimited {
        retry_after: Some(secs),
        ..
    } = error
    {
        Duration::from_secs((*secs).min(30))
    } else {
        backoff_delay(attempt)
    }
}

/// Calculate exponential backoff delay
///
/// Backoff strategy: 100ms, 200ms, 400ms, 800ms, 1.6s, ...
/// Maximum delay limit is 10 seconds
fn backoff_delay(attempt: u32) -> Duration {
    let capped_attempt = attempt.min(20); // Prevent 2^attempt from overflowing
    let delay_ms = 100_u64.saturating_mul(1_u64 << capped_attempt);
    let delay_ms = delay_ms.min(10_000);
    Duration::from_millis(delay_ms)
}
