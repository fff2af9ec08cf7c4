//! Request pacing and retry utilities for the places client.
//!
//! Pacing is a fixed throttle: the same delays apply regardless of how many
//! workers are running, so aggregate request rate grows roughly linearly with
//! `max_workers`. The only retried condition is an explicit rate-limit answer
//! from the upstream search endpoint.

use std::future::Future;
use std::time::Duration;

use placegrid_core::AppConfig;

use crate::error::PlacesError;

/// Fixed delays between upstream requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Wait before the first page of a nearby search.
    pub page_delay: Duration,
    /// Wait before the second and later pages. Page tokens need time to
    /// become valid upstream, so this is longer than `page_delay`.
    pub next_page_delay: Duration,
    /// Wait after each per-result detail request.
    pub detail_delay: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            page_delay: Duration::from_millis(200),
            next_page_delay: Duration::from_secs(2),
            detail_delay: Duration::from_millis(200),
        }
    }
}

impl Pacing {
    /// No delays at all. For tests against a local mock server.
    #[must_use]
    pub fn none() -> Self {
        Self {
            page_delay: Duration::ZERO,
            next_page_delay: Duration::ZERO,
            detail_delay: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            page_delay: Duration::from_millis(config.page_delay_ms),
            next_page_delay: Duration::from_millis(config.next_page_delay_ms),
            detail_delay: Duration::from_millis(config.detail_delay_ms),
        }
    }

    /// Delay to wait before fetching page `page_index` (0-based).
    #[must_use]
    pub fn before_page(&self, page_index: usize) -> Duration {
        if page_index == 0 {
            self.page_delay
        } else {
            self.next_page_delay
        }
    }
}

/// Sleep for `delay` unless it is zero.
pub(crate) async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Returns `true` if `err` should be retried after a backoff delay.
///
/// Only [`PlacesError::RateLimited`] qualifies. Network failures abort the
/// current area instead, and the caller keeps whatever it already collected.
fn is_retriable(err: &PlacesError) -> bool {
    matches!(err, PlacesError::RateLimited { .. })
}

/// Executes `operation` with exponential backoff retries on rate limiting.
///
/// On a retriable error the function sleeps for
/// `backoff_base_secs * 2^attempt` seconds and tries again, up to
/// `max_retries` additional attempts. Non-retriable errors are returned
/// immediately.
///
/// With `max_retries = 2` the operation is attempted at most 3 times total.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, PlacesError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PlacesError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if !is_retriable(&err) || attempt >= max_retries => return Err(err),
            Err(err) => err,
        };

        let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %err,
            "places API rate limited; retrying after backoff"
        );
        pause(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
