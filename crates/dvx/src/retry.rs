// ai
//! 🔄 Retry — "have you tried turning it off and on again", but bounded.
//!
//! One policy shape, used twice: the market-data fetch and the object-storage
//! uploads. Exponential wait, clamped between a floor and a ceiling, capped at a
//! fixed number of attempts. No jitter. No circuit breaker. No feelings.
//!
//! 🧠 Knowledge graph:
//! - `RetryPolicy`: deserialized straight from config (`market_api.retry`, `storage.upload_retry`)
//! - `retry_with_backoff`: runs an async op, asks a predicate whether the error deserves
//!   a second chance, sleeps, tries again
//! - wait before attempt N+1 = clamp(multiplier · 2^(N-1), min_wait, max_wait)
//!
//! 🦆 The duck retried once. The duck is still waiting on a 429.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

/// 🔧 How hard we try before we give up and let the scheduler deal with it.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RetryPolicy {
    /// 🎯 total attempts, including the first. 3 means "one try, two retries".
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_multiplier_secs")]
    pub multiplier_secs: f64,
    #[serde(default = "default_min_wait_secs")]
    pub min_wait_secs: f64,
    #[serde(default = "default_max_wait_secs")]
    pub max_wait_secs: f64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_multiplier_secs() -> f64 {
    1.0
}

fn default_min_wait_secs() -> f64 {
    2.0
}

fn default_max_wait_secs() -> f64 {
    10.0
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            multiplier_secs: default_multiplier_secs(),
            min_wait_secs: default_min_wait_secs(),
            max_wait_secs: default_max_wait_secs(),
        }
    }
}

impl RetryPolicy {
    /// 🧪 A policy that never sleeps. For tests, and for people with no patience.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            multiplier_secs: 0.0,
            min_wait_secs: 0.0,
            max_wait_secs: 0.0,
        }
    }

    /// ⏱️ How long to wait after `failed_attempt` (1-based) fails.
    pub fn wait_after(&self, failed_attempt: u32) -> Duration {
        let the_exponent = failed_attempt.saturating_sub(1).min(31) as i32;
        let the_raw_wait = self.multiplier_secs * 2f64.powi(the_exponent);
        // -- 📐 min first, then max; a misconfigured min > max resolves to max, not a panic
        let the_clamped_wait = the_raw_wait.max(self.min_wait_secs).min(self.max_wait_secs);
        Duration::from_secs_f64(the_clamped_wait.max(0.0))
    }
}

/// 🔄 Run `op` until it succeeds, the predicate says "don't bother", or we run out of attempts.
///
/// `what` is a label for the logs — "market fetch", "bronze upload", whatever helps at 3am.
/// The last error is returned as-is, so callers keep their typed errors.
pub async fn retry_with_backoff<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    what: &str,
    is_retryable: P,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let the_max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1u32;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < the_max_attempts && is_retryable(&err) => {
                let the_wait = policy.wait_after(attempt);
                warn!(
                    "🔄 {} attempt {}/{} failed: {} — retrying in {:?}",
                    what, attempt, the_max_attempts, err, the_wait
                );
                tokio::time::sleep(the_wait).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
