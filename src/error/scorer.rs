use std::time::Duration;
use thiserror::Error;

/// Classified failure of a scoring tier.
///
/// The variant decides how the orchestrator reacts: rate limits and
/// transient failures are retried, everything else abandons the tier for
/// the current asset.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScorerError {
    #[error("rate limited{}", retry_hint(.retry_after))]
    RateLimited { retry_after: Option<Duration> },

    #[error("quota exhausted: {message}")]
    QuotaExceeded { message: String },

    #[error("transient failure: {message}")]
    Transient { message: String },

    #[error("malformed response: {message}")]
    Malformed { message: String },

    #[error("scorer unavailable: {message}")]
    Unavailable { message: String },
}

fn retry_hint(retry_after: &Option<Duration>) -> String {
    match retry_after {
        Some(delay) => format!(" (retry after {:.1}s)", delay.as_secs_f64()),
        None => String::new(),
    }
}

impl ScorerError {
    pub fn rate_limited(retry_after: Option<Duration>) -> Self {
        Self::RateLimited { retry_after }
    }

    pub fn quota_exceeded(message: impl Into<String>) -> Self {
        Self::QuotaExceeded {
            message: message.into(),
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Transient { .. })
    }
}
