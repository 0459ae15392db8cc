/// Hard ceiling on tags per entry.
pub const MAX_TAGS: usize = 5;

const MAX_TAG_CHARS: usize = 32;

/// Normalizes a free-form label to lower-case words joined by `-`.
///
/// Any non-alphanumeric character separates words, so `"Golden Hour"`,
/// `"golden_hour"` and `"GOLDEN-HOUR"` all become `golden-hour`.
pub fn normalize_tag(raw: &str) -> Option<String> {
    let words: Vec<String> = raw
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect();
    if words.is_empty() {
        return None;
    }

    let mut tag = words.join("-");
    if tag.chars().count() > MAX_TAG_CHARS {
        tag = tag.chars().take(MAX_TAG_CHARS).collect();
        tag = tag.trim_end_matches('-').to_string();
    }
    Some(tag)
}

/// Ordered, de-duplicated, capped tag collection. Insertion order is
/// relevance order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagList {
    tags: Vec<String>,
    cap: usize,
}

impl TagList {
    pub fn new() -> Self {
        Self::with_cap(MAX_TAGS)
    }

    pub fn with_cap(cap: usize) -> Self {
        Self {
            tags: Vec::new(),
            cap: cap.min(MAX_TAGS),
        }
    }

    /// Normalizes and appends `raw`. Returns `false` when the label is
    /// empty, already present, or the list is full.
    pub fn push(&mut self, raw: &str) -> bool {
        if self.is_full() {
            return false;
        }
        let Some(tag) = normalize_tag(raw) else {
            return false;
        };
        if self.tags.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    pub fn extend<I, S>(&mut self, labels: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for label in labels {
            if self.is_full() {
                break;
            }
            self.push(label.as_ref());
        }
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.tags.len() >= self.cap
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tags
    }

    pub fn into_vec(self) -> Vec<String> {
        self.tags
    }
}

impl Default for TagList {
    fn default() -> Self {
        Self::new()
    }
}
