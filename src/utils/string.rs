pub fn strip_extension(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => name.to_string(),
    }
}

pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First word of a free-text field, lower-cased. Used for brand tokens
/// such as `canon` from `Canon EOS R6`.
pub fn first_token(value: &str) -> Option<String> {
    value
        .split(|c: char| c.is_whitespace() || c == ',' || c == '/')
        .find(|s| !s.is_empty())
        .map(|s| s.to_lowercase())
}

pub fn truncate_chars(value: &str, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((idx, _)) => value[..idx].trim_end().to_string(),
        None => value.to_string(),
    }
}
