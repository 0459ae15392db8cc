//! Scoring collaborators: the remote vision service and the local image
//! classifier, plus the lenient parser for vision replies.

pub mod classifier;
pub mod remote;
pub mod response;

pub use classifier::{HttpClassifier, LocalClassifier, Prediction};
pub use remote::{GeminiScorer, VisionRequest, VisionScorer};
pub use response::{extract_json_object, parse_vision_response};

use crate::model::PaletteColor;

/// What one analysis tier contributed for an image. Every field is
/// optional; the orchestrator fills gaps from later tiers and heuristics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TierOutcome {
    pub tags: Vec<String>,
    pub difficulty: Option<u8>,
    pub color: Option<PaletteColor>,
    pub description: Option<String>,
}

impl TierOutcome {
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
            && self.difficulty.is_none()
            && self.color.is_none()
            && self.description.is_none()
    }
}
