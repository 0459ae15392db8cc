use serde_json::{Map, Value};

use super::TierOutcome;
use crate::error::ScorerError;
use crate::model::{PaletteColor, TagList, MAX_DIFFICULTY, MIN_DIFFICULTY};
use crate::utils::{collapse_whitespace, truncate_chars};

const MAX_DESCRIPTION_CHARS: usize = 280;

/// Finds the JSON object in a model reply.
///
/// The whole text is tried strictly first; failing that, the first `{` that
/// starts a well-formed object wins. Code fences and chatter around the
/// object are ignored.
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text.trim()) {
        return Some(map);
    }

    text.match_indices('{').find_map(|(idx, _)| {
        let mut stream = serde_json::Deserializer::from_str(&text[idx..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(Value::Object(map))) => Some(map),
            _ => None,
        }
    })
}

/// Turns a vision reply into a tier outcome. A reply without any usable
/// field counts as malformed.
pub fn parse_vision_response(text: &str) -> Result<TierOutcome, ScorerError> {
    let map = extract_json_object(text)
        .ok_or_else(|| ScorerError::malformed("no JSON object in response"))?;

    let outcome = TierOutcome {
        tags: parse_tags(map.get("tags")),
        difficulty: map.get("difficulty").and_then(coerce_difficulty),
        color: ["color", "primary_color", "primaryColor"]
            .iter()
            .find_map(|key| map.get(*key))
            .and_then(Value::as_str)
            .and_then(PaletteColor::from_name),
        description: map
            .get("description")
            .and_then(Value::as_str)
            .map(collapse_whitespace)
            .filter(|d| !d.is_empty())
            .map(|d| truncate_chars(&d, MAX_DESCRIPTION_CHARS)),
    };

    if outcome.is_empty() {
        return Err(ScorerError::malformed("response has no usable fields"));
    }
    Ok(outcome)
}

fn parse_tags(value: Option<&Value>) -> Vec<String> {
    let mut tags = TagList::new();
    match value {
        Some(Value::Array(items)) => {
            tags.extend(items.iter().filter_map(Value::as_str));
        }
        Some(Value::String(joined)) => {
            tags.extend(joined.split(','));
        }
        _ => {}
    }
    tags.into_vec()
}

fn coerce_difficulty(value: &Value) -> Option<u8> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !raw.is_finite() {
        return None;
    }
    let clamped = raw
        .round()
        .clamp(MIN_DIFFICULTY as f64, MAX_DIFFICULTY as f64);
    Some(clamped as u8)
}
