// Analysis tiers, tried in order until one produces tags.
//
// 1. Vision     - remote vision service: tags, difficulty, colour, description
// 2. Classifier - local image classifier: tags and difficulty
//
// The heuristic pass is not a tier; it always runs afterwards.

pub mod classifier;
pub mod vision;

pub use classifier::{score_predictions, ClassifierFactory, LocalClassifierTier};
pub use vision::RemoteVisionTier;

use crate::decode::DecodedImage;
use crate::error::ScorerError;
use crate::model::AssetRecord;
use crate::scoring::TierOutcome;

pub trait Tier {
    fn name(&self) -> &'static str;

    /// Analyzes one decoded image. An `Err` means the tier gave up on this
    /// asset; the orchestrator moves on to the next tier.
    fn analyze(
        &mut self,
        asset: &AssetRecord,
        image: &DecodedImage,
    ) -> Result<TierOutcome, ScorerError>;
}
