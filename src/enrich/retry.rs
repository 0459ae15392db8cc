use std::time::Duration;
use tracing::info;

use super::pacing::Sleeper;
use crate::config::RetryPolicy;
use crate::error::ScorerError;

/// Ceiling on a service-provided retry hint.
const MAX_BACKOFF: Duration = Duration::from_secs(120);

/// How long to wait before retrying after `error`, or `None` when the
/// error is not worth retrying.
pub fn backoff_for(error: &ScorerError, policy: &RetryPolicy) -> Option<Duration> {
    if !error.is_retryable() {
        return None;
    }
    match error {
        ScorerError::RateLimited {
            retry_after: Some(hint),
        } => Some((*hint).min(MAX_BACKOFF)),
        _ => Some(policy.default_backoff),
    }
}

/// Runs `op` until it succeeds, fails with a non-retryable error, or
/// `policy.max_attempts` calls have been made. `op` receives the 1-based
/// attempt number.
pub fn call_with_backoff<T, F>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    label: &str,
    mut op: F,
) -> Result<T, ScorerError>
where
    F: FnMut(u32) -> Result<T, ScorerError>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1u32;
    loop {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(error) => {
                let Some(delay) = backoff_for(&error, policy) else {
                    return Err(error);
                };
                if attempt >= max_attempts {
                    return Err(error);
                }
                info!(
                    scorer = label,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "retrying after backoff"
                );
                sleeper.sleep(delay);
                attempt += 1;
            }
        }
    }
}
