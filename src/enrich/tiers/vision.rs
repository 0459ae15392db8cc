use image::ImageFormat;
use std::sync::Arc;
use tracing::debug;

use super::Tier;
use crate::config::RetryPolicy;
use crate::decode::DecodedImage;
use crate::enrich::pacing::{RateGate, Sleeper};
use crate::enrich::retry::call_with_backoff;
use crate::error::ScorerError;
use crate::model::AssetRecord;
use crate::scoring::{parse_vision_response, TierOutcome, VisionRequest, VisionScorer};

/// Remote vision scorer behind the rate gate and classified retry.
pub struct RemoteVisionTier {
    scorer: Box<dyn VisionScorer>,
    gate: RateGate,
    retry: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl RemoteVisionTier {
    pub fn new(scorer: Box<dyn VisionScorer>, retry: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            scorer,
            gate: RateGate::new(retry.min_interval),
            retry,
            sleeper,
        }
    }
}

impl Tier for RemoteVisionTier {
    fn name(&self) -> &'static str {
        self.scorer.name()
    }

    fn analyze(
        &mut self,
        asset: &AssetRecord,
        image: &DecodedImage,
    ) -> Result<TierOutcome, ScorerError> {
        let jpeg = image
            .encode_preview(ImageFormat::Jpeg)
            .map_err(|e| ScorerError::unavailable(e.to_string()))?;
        let request = VisionRequest {
            name: &asset.name,
            mime_type: "image/jpeg",
            bytes: &jpeg,
        };

        let Self {
            scorer,
            gate,
            retry,
            sleeper,
        } = self;

        let text = call_with_backoff(retry, sleeper.as_ref(), scorer.name(), |attempt| {
            gate.wait(sleeper.as_ref());
            debug!(asset = %asset.id, attempt, scorer = scorer.name(), "requesting vision analysis");
            scorer.score(&request)
        })?;

        parse_vision_response(&text)
    }
}
