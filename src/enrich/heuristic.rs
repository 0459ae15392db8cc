use crate::model::{Orientation, PaletteColor, Season, TagList, UNKNOWN};
use crate::utils::first_token;

/// Facts every decoded image yields without any scorer.
#[derive(Debug, Clone)]
pub struct Observed<'a> {
    pub season: Season,
    pub orientation: Orientation,
    pub color: PaletteColor,
    pub camera: &'a str,
    pub lens: &'a str,
}

impl Observed<'_> {
    /// Candidate tags in fill order.
    fn candidates(&self) -> [Option<String>; 5] {
        [
            Some(self.season.as_str().to_string()),
            Some(self.orientation.as_str().to_string()),
            Some(self.color.as_str().to_string()),
            brand(self.camera),
            brand(self.lens),
        ]
    }
}

fn brand(value: &str) -> Option<String> {
    if value.trim().is_empty() || value == UNKNOWN {
        return None;
    }
    first_token(value)
}

/// Appends observed facts until `tags` holds `min_tags` entries or the
/// candidates run out. Duplicates of existing tags are skipped.
pub fn fill_tags(tags: &mut TagList, observed: &Observed<'_>, min_tags: usize) {
    for candidate in observed.candidates().into_iter().flatten() {
        if tags.len() >= min_tags {
            break;
        }
        tags.push(&candidate);
    }
}
