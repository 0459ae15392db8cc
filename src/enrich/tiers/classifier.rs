use std::mem;
use tracing::{debug, warn};

use super::Tier;
use crate::config::ScoringPolicy;
use crate::decode::DecodedImage;
use crate::error::ScorerError;
use crate::model::{AssetRecord, TagList, MAX_DIFFICULTY};
use crate::scoring::{LocalClassifier, Prediction, TierOutcome};

pub type ClassifierFactory = Box<dyn FnOnce() -> Result<Box<dyn LocalClassifier>, ScorerError>>;

enum ClassifierState {
    Pending(ClassifierFactory),
    Ready(Box<dyn LocalClassifier>),
    Failed,
}

/// Local classifier tier. The classifier is built on first use and at most
/// once per run; if building fails the tier stays disabled.
pub struct LocalClassifierTier {
    state: ClassifierState,
    policy: ScoringPolicy,
}

impl LocalClassifierTier {
    pub fn new(factory: ClassifierFactory, policy: ScoringPolicy) -> Self {
        Self {
            state: ClassifierState::Pending(factory),
            policy,
        }
    }

    pub fn with_classifier(classifier: Box<dyn LocalClassifier>, policy: ScoringPolicy) -> Self {
        Self {
            state: ClassifierState::Ready(classifier),
            policy,
        }
    }

    fn classifier(&mut self) -> Option<&dyn LocalClassifier> {
        if matches!(self.state, ClassifierState::Pending(_)) {
            self.state = match mem::replace(&mut self.state, ClassifierState::Failed) {
                ClassifierState::Pending(factory) => match factory() {
                    Ok(classifier) => {
                        debug!("local classifier ready");
                        ClassifierState::Ready(classifier)
                    }
                    Err(e) => {
                        warn!(error = %e, "local classifier unavailable for this run");
                        ClassifierState::Failed
                    }
                },
                settled => settled,
            };
        }

        match &self.state {
            ClassifierState::Ready(classifier) => Some(classifier.as_ref()),
            _ => None,
        }
    }
}

impl Tier for LocalClassifierTier {
    fn name(&self) -> &'static str {
        "local-classifier"
    }

    fn analyze(
        &mut self,
        _asset: &AssetRecord,
        image: &DecodedImage,
    ) -> Result<TierOutcome, ScorerError> {
        let classifier = self
            .classifier()
            .ok_or_else(|| ScorerError::unavailable("local classifier failed to start"))?;
        let predictions = classifier.classify(&image.preview)?;
        Ok(score_predictions(&predictions, &self.policy))
    }
}

/// Turns raw classifier predictions into tags and a difficulty.
///
/// Only labels at or above the confidence threshold become tags. When at
/// least one does, the list is padded up to `min_tags` with the next labels
/// that clear the low-confidence floor. Difficulty comes from the top-1
/// confidence band, bumped once for a complex subject and once when most
/// of the top-k is noise.
pub fn score_predictions(predictions: &[Prediction], policy: &ScoringPolicy) -> TierOutcome {
    let mut ranked: Vec<&Prediction> = predictions
        .iter()
        .filter(|p| p.confidence.is_finite())
        .collect();
    ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    ranked.truncate(policy.top_k);

    let Some(top) = ranked.first() else {
        return TierOutcome::default();
    };

    let mut tags = TagList::with_cap(policy.max_tags);
    for prediction in ranked
        .iter()
        .filter(|p| p.confidence >= policy.confidence_threshold)
    {
        tags.push(prediction.primary_label());
    }

    if !tags.is_empty() {
        let padding = ranked.iter().filter(|p| {
            p.confidence < policy.confidence_threshold
                && p.confidence >= policy.low_confidence_floor
        });
        for prediction in padding {
            if tags.len() >= policy.min_tags {
                break;
            }
            tags.push(prediction.primary_label());
        }
    }

    let mut difficulty = band_difficulty(top.confidence, &policy.difficulty_bands);
    if tags.as_slice().iter().any(|t| policy.is_complex_subject(t)) {
        difficulty += 1;
    }
    let noisy = ranked
        .iter()
        .filter(|p| p.confidence < policy.low_confidence_floor)
        .count();
    if noisy * 2 > ranked.len() {
        difficulty += 1;
    }

    TierOutcome {
        tags: tags.into_vec(),
        difficulty: Some(difficulty.min(MAX_DIFFICULTY)),
        color: None,
        description: None,
    }
}

fn band_difficulty(confidence: f32, bands: &[f32; 4]) -> u8 {
    bands
        .iter()
        .position(|&band| confidence >= band)
        .map(|index| index as u8 + 1)
        .unwrap_or(MAX_DIFFICULTY)
}
