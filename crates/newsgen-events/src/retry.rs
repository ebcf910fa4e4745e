//! Back-off policy for the events API session.
//!
//! [`RetryPolicy::send`] drives single request attempts. Connect failures,
//! timeouts and the throttling/gateway statuses in [`RETRIABLE_STATUSES`]
//! are retried; once the budget is spent the last outcome is handed back
//! unchanged, so a persistent 503 reaches the caller as an ordinary response.

use std::future::Future;
use std::time::Duration;

use crate::error::HarvestError;
use crate::session::ApiResponse;

/// Statuses that are retried with back-off.
pub(crate) const RETRIABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

const MAX_DELAY_MS: u64 = 60_000;

/// Why an attempt is worth repeating.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Transient {
    Status(u16),
    Network(String),
}

impl std::fmt::Display for Transient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status(status) => write!(f, "HTTP {status}"),
            Self::Network(message) => f.write_str(message),
        }
    }
}

/// Classifies one attempt. `None` means the outcome is final.
pub(crate) fn transient(outcome: &Result<ApiResponse, HarvestError>) -> Option<Transient> {
    match outcome {
        Ok(response) if RETRIABLE_STATUSES.contains(&response.status) => {
            Some(Transient::Status(response.status))
        }
        Err(HarvestError::Transport(e)) if e.is_timeout() || e.is_connect() => {
            Some(Transient::Network(e.to_string()))
        }
        _ => None,
    }
}

/// Exponential back-off with ±25 % jitter, capped at 60 s.
///
/// With `backoff_base_ms = 700` the sleeps before retries 1, 2, 3 are about
/// 700 ms, 1.4 s and 2.8 s.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RetryPolicy {
    /// Additional attempts after the first one.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl RetryPolicy {
    /// Un-jittered delay before retry number `retry` (1-based).
    fn base_delay(self, retry: u32) -> Duration {
        let ms = self
            .backoff_base_ms
            .saturating_mul(1u64 << retry.saturating_sub(1).min(10))
            .min(MAX_DELAY_MS);
        Duration::from_millis(ms)
    }

    fn jittered_delay(self, retry: u32) -> Duration {
        self.base_delay(retry).mul_f64(rand::random_range(0.75..=1.25))
    }

    /// Runs `attempt` until it produces a final outcome or retries run out.
    pub(crate) async fn send<F, Fut>(self, mut attempt: F) -> Result<ApiResponse, HarvestError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<ApiResponse, HarvestError>>,
    {
        let mut retry = 0u32;
        loop {
            let outcome = attempt().await;
            let Some(reason) = transient(&outcome) else {
                return outcome;
            };

            if retry >= self.max_retries {
                tracing::warn!(
                    retries = retry,
                    reason = %reason,
                    "events API retries exhausted — returning last outcome"
                );
                return outcome;
            }

            retry += 1;
            let delay = self.jittered_delay(retry);
            tracing::warn!(
                retry,
                max_retries = self.max_retries,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                reason = %reason,
                "events API transient failure — backing off"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
