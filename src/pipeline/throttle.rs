// Retrying wrapper for mutating calls (block, delete).
//
// A mutating call gets a bounded number of attempts. Only failures that
// look transient are retried, with a linear backoff of one unit per
// attempt already made. A successful call is always followed by the
// post-success delay, which is what paces a run of blocks or deletes.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::pause;
use crate::bluesky::error::RemoteError;

/// Default attempt cap for a single mutating call.
pub const MAX_ATTEMPTS: u32 = 3;

/// Backoff unit: attempt `n` failing transiently waits `n` units.
pub const BACKOFF_UNIT: Duration = Duration::from_millis(1000);

/// Retry and pacing parameters for one stream of mutating calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_unit: Duration,
    /// Pause after each successful call.
    pub post_delay: Duration,
}

impl RetryPolicy {
    /// Default retry behavior with the given post-success delay.
    pub fn with_post_delay(post_delay: Duration) -> Self {
        Self {
            post_delay,
            ..Self::default()
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            backoff_unit: BACKOFF_UNIT,
            post_delay: Duration::ZERO,
        }
    }
}

/// Run a mutating call with bounded retry on transient failures.
///
/// Non-transient failures return immediately. If the token fires during a
/// backoff, the last failure is returned without another attempt. The
/// post-success delay runs exactly once per successful call.
pub async fn mutate<F, Fut, T>(
    policy: &RetryPolicy,
    token: &CancellationToken,
    label: &str,
    mut call: F,
) -> Result<T, RemoteError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RemoteError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1u32;

    loop {
        match call().await {
            Ok(value) => {
                pause(policy.post_delay, token).await;
                return Ok(value);
            }
            Err(err) => {
                debug!(target_label = label, attempt, error = %err, "Mutating call failed");

                if attempt >= max_attempts || !err.looks_transient() {
                    return Err(err);
                }

                let backoff = policy.backoff_unit.saturating_mul(attempt);
                warn!(
                    target_label = label,
                    attempt,
                    max_attempts,
                    backoff_ms = backoff.as_millis() as u64,
                    "Transient failure, backing off {}ms (attempt {}/{})",
                    backoff.as_millis(),
                    attempt + 1,
                    max_attempts,
                );

                if !pause(backoff, token).await {
                    return Err(err);
                }
                attempt += 1;
            }
        }
    }
}
