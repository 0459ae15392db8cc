use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::trace;

use crate::error::ScorerError;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

const PROMPT: &str = "You are cataloguing a photo for a jigsaw-puzzle gallery. \
Reply with a single JSON object and nothing else, with keys: \
\"tags\" (up to 5 short subject labels, most relevant first), \
\"difficulty\" (integer 1-5, how hard the photo would be as a puzzle), \
\"color\" (one of Red, Orange, Yellow, Green, Teal, Blue, Purple, Pink, Brown, Black, White, Neutral), \
\"description\" (one sentence).";

/// Image handed to a vision scorer.
#[derive(Debug, Clone, Copy)]
pub struct VisionRequest<'a> {
    pub name: &'a str,
    pub mime_type: &'a str,
    pub bytes: &'a [u8],
}

/// A remote vision service. Returns the raw reply text; parsing is left to
/// [`parse_vision_response`](super::parse_vision_response).
pub trait VisionScorer {
    fn name(&self) -> &'static str;

    fn score(&self, request: &VisionRequest<'_>) -> Result<String, ScorerError>;
}

/// Google Gemini `generateContent` with the image inlined as base64.
pub struct GeminiScorer {
    agent: ureq::Agent,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

impl GeminiScorer {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Self {
            agent,
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

impl VisionScorer for GeminiScorer {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn score(&self, request: &VisionRequest<'_>) -> Result<String, ScorerError> {
        let url = format!("{API_BASE}/{}:generateContent", self.model);
        let body = json!({
            "contents": [{
                "parts": [
                    { "text": PROMPT },
                    { "inline_data": {
                        "mime_type": request.mime_type,
                        "data": STANDARD.encode(request.bytes),
                    }},
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "temperature": 0.2,
            },
        });

        trace!(image = request.name, model = %self.model, "calling vision service");
        let response = self
            .agent
            .post(&url)
            .query("key", &self.api_key)
            .send_json(body)
            .map_err(classify_ureq_error)?;

        let parsed: GenerateResponse = response
            .into_json()
            .map_err(|e| ScorerError::malformed(e.to_string()))?;
        parsed
            .text()
            .ok_or_else(|| ScorerError::malformed("response has no candidate text"))
    }
}

pub(crate) fn classify_ureq_error(error: ureq::Error) -> ScorerError {
    match error {
        ureq::Error::Status(status, response) => {
            let header_delay = response
                .header("retry-after")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            let body = response.into_string().unwrap_or_default();
            classify_status(status, &body, header_delay)
        }
        ureq::Error::Transport(transport) => ScorerError::transient(transport.to_string()),
    }
}

/// Maps an HTTP failure to a scorer error class.
///
/// 429 and `RESOURCE_EXHAUSTED` are rate limits unless the body names a
/// daily quota, which is not worth retrying within the run. 408 and 5xx are
/// transient. Other statuses (bad key, bad request) are permanent for this
/// call.
pub fn classify_status(status: u16, body: &str, header_delay: Option<Duration>) -> ScorerError {
    let exhausted = status == 429 || body.contains("RESOURCE_EXHAUSTED");
    if exhausted {
        if is_daily_quota(body) {
            return ScorerError::quota_exceeded(format!("HTTP {status}: daily quota exhausted"));
        }
        return ScorerError::rate_limited(header_delay.or_else(|| parse_retry_delay(body)));
    }

    match status {
        408 | 500..=599 => ScorerError::transient(format!("HTTP {status}")),
        _ => ScorerError::unavailable(format!("HTTP {status}")),
    }
}

fn is_daily_quota(body: &str) -> bool {
    let lower = body.to_lowercase();
    ["perday", "per day", "daily", "insufficient_quota"]
        .iter()
        .any(|marker| lower.contains(marker))
}

/// Reads a retry hint such as `"retryDelay": "12s"` or `retry in 7.5s`.
pub fn parse_retry_delay(body: &str) -> Option<Duration> {
    let lower = body.to_lowercase();
    ["\"retrydelay\"", "retry in ", "retry after "]
        .iter()
        .find_map(|marker| {
            let start = lower.find(marker)? + marker.len();
            parse_seconds(&lower[start..])
        })
}

fn parse_seconds(text: &str) -> Option<Duration> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    // The number must follow the marker closely, not appear later in the body.
    if text[..start].chars().any(|c| c.is_alphabetic()) {
        return None;
    }
    let rest = &text[start..];
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(rest.len());
    let value: f64 = rest[..end].parse().ok()?;
    let unit = rest[end..].trim_start();
    let seconds = if unit.starts_with("ms") {
        value / 1000.0
    } else {
        value
    };
    Duration::try_from_secs_f64(seconds).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_with_retry_delay() {
        let body = r#"{"error": {"code": 429, "status": "RESOURCE_EXHAUSTED",
            "details": [{"@type": "type.googleapis.com/google.rpc.RetryInfo", "retryDelay": "12s"}]}}"#;
        assert_eq!(
            classify_status(429, body, None),
            ScorerError::rate_limited(Some(Duration::from_secs(12)))
        );
    }

    #[test]
    fn test_header_delay_wins() {
        let err = classify_status(429, "Please retry in 30s", Some(Duration::from_secs(5)));
        assert_eq!(err, ScorerError::rate_limited(Some(Duration::from_secs(5))));
    }

    #[test]
    fn test_daily_quota_is_not_retried() {
        let body = r#"{"error": {"status": "RESOURCE_EXHAUSTED",
            "message": "Quota exceeded for metric: GenerateRequestsPerDayPerProjectPerModel-FreeTier"}}"#;
        let err = classify_status(429, body, None);
        assert!(matches!(err, ScorerError::QuotaExceeded { .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_server_errors_are_transient() {
        assert!(matches!(
            classify_status(503, "overloaded", None),
            ScorerError::Transient { .. }
        ));
        assert!(matches!(
            classify_status(400, "bad request", None),
            ScorerError::Unavailable { .. }
        ));
    }

    #[test]
    fn test_parse_retry_delay_forms() {
        assert_eq!(
            parse_retry_delay("Please retry in 7.5s."),
            Some(Duration::from_millis(7500))
        );
        assert_eq!(
            parse_retry_delay(r#""retryDelay": "250ms""#),
            Some(Duration::from_millis(250))
        );
        assert_eq!(parse_retry_delay("no hint here"), None);
    }

    #[test]
    fn test_unrepresentable_retry_delay_is_ignored() {
        let body = r#"{"error":{"status":"RESOURCE_EXHAUSTED","details":[{"retryDelay":"99999999999999999999s"}]}}"#;
        assert_eq!(parse_retry_delay(body), None);
        assert_eq!(classify_status(429, body, None), ScorerError::rate_limited(None));
    }

    #[test]
    fn test_generate_response_text() {
        let body = r#"{"candidates": [{"content": {"parts": [{"text": "{\"tags\": "}, {"text": "[\"a\"]}"}]}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.text().as_deref(), Some("{\"tags\": [\"a\"]}"));

        let empty: GenerateResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(empty.text().is_none());
    }
}
