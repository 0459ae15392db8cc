//! Tiered enrichment of stale assets.
//!
//! Each asset is downloaded and decoded once, then offered to the tier chain
//! (remote vision scorer, then local classifier) until a tier produces tags.
//! The heuristic pass always runs last and fills what the tiers left out.

pub mod heuristic;
pub mod pacing;
pub mod retry;
pub mod tiers;

pub use pacing::{RateGate, Sleeper, ThreadSleeper};
pub use retry::{backoff_for, call_with_backoff};
pub use tiers::{LocalClassifierTier, RemoteVisionTier, Tier};

use chrono::Datelike;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::{Config, ScoringPolicy};
use crate::decode::{self, DecodedImage};
use crate::error::{DecodeError, ScorerError};
use crate::listing::AssetProvider;
use crate::model::{
    choose_capture_time, format_timestamp, AssetRecord, ManifestEntry, Orientation, Season,
    TagList, DEFAULT_DIFFICULTY, MAX_DIFFICULTY, MIN_DIFFICULTY,
};
use crate::scoring::{GeminiScorer, HttpClassifier, LocalClassifier};
use heuristic::{fill_tags, Observed};

/// State shared by every enrichment of one run: the tier chain (with its
/// rate gate and lazy classifier), the scoring policy and the version stamp.
pub struct EnrichContext {
    tiers: Vec<Box<dyn Tier>>,
    policy: ScoringPolicy,
    version: String,
}

impl EnrichContext {
    /// Context with no tiers; only heuristics apply.
    pub fn new(policy: ScoringPolicy, version: impl Into<String>) -> Self {
        Self {
            tiers: Vec::new(),
            policy,
            version: version.into(),
        }
    }

    pub fn with_tier<T: Tier + 'static>(mut self, tier: T) -> Self {
        self.tiers.push(Box::new(tier));
        self
    }

    /// Builds the tier chain from the configured capabilities.
    pub fn from_config(config: &Config, sleeper: Arc<dyn Sleeper>) -> Self {
        let mut ctx = Self::new(config.policy.clone(), config.version.clone());
        if config.ai_disabled {
            info!("AI tiers disabled, heuristics only");
            return ctx;
        }

        if let Some(ref remote) = config.remote_scorer {
            let scorer = GeminiScorer::new(remote.api_key.clone(), remote.model.clone());
            ctx = ctx.with_tier(RemoteVisionTier::new(
                Box::new(scorer),
                config.retry.clone(),
                sleeper,
            ));
        }

        if let Some(ref url) = config.classifier_url {
            let url = url.clone();
            ctx = ctx.with_tier(LocalClassifierTier::new(
                Box::new(move || {
                    HttpClassifier::connect(url).map(|c| Box::new(c) as Box<dyn LocalClassifier>)
                }),
                config.policy.clone(),
            ));
        }

        debug!(tiers = ?ctx.tier_names(), "enrichment tiers");
        ctx
    }

    pub fn tier_names(&self) -> Vec<&'static str> {
        self.tiers.iter().map(|t| t.name()).collect()
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

/// Result of enriching one asset.
#[derive(Debug, Clone, PartialEq)]
pub enum Enrichment {
    /// Analysis completed; the entry carries the current version stamp.
    Fresh(ManifestEntry),
    /// Download or decode failed; the entry is a `pending` placeholder.
    Failed(ManifestEntry),
}

impl Enrichment {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn into_entry(self) -> ManifestEntry {
        match self {
            Self::Fresh(entry) | Self::Failed(entry) => entry,
        }
    }
}

/// Downloads, decodes and enriches one asset. Never fails: a download or
/// decode error yields a pending placeholder built from `cached` when there
/// is one.
pub fn enrich_asset(
    ctx: &mut EnrichContext,
    provider: &dyn AssetProvider,
    asset: &AssetRecord,
    cached: Option<&ManifestEntry>,
) -> Enrichment {
    match load_image(provider, asset) {
        Ok(image) => Enrichment::Fresh(enrich_decoded(ctx, asset, &image)),
        Err(e) => {
            warn!(asset = %asset.id, name = %asset.name, error = %e, "enrichment failed, keeping placeholder");
            Enrichment::Failed(ManifestEntry::pending(asset, cached))
        }
    }
}

fn load_image(provider: &dyn AssetProvider, asset: &AssetRecord) -> Result<DecodedImage, DecodeError> {
    let bytes = provider
        .fetch(asset)
        .map_err(|e| DecodeError::fetch_failed(&asset.name, e.to_string()))?;
    decode::decode(&bytes)
}

/// Builds a fresh entry for an already decoded image.
pub fn enrich_decoded(
    ctx: &mut EnrichContext,
    asset: &AssetRecord,
    image: &DecodedImage,
) -> ManifestEntry {
    let mut tags = TagList::with_cap(ctx.policy.max_tags);
    let mut difficulty = None;
    let mut color = None;
    let mut description = None;

    for tier in ctx.tiers.iter_mut() {
        if !tags.is_empty() {
            break;
        }
        match tier.analyze(asset, image) {
            Ok(outcome) => {
                debug!(
                    asset = %asset.id,
                    tier = tier.name(),
                    tags = ?outcome.tags,
                    difficulty = ?outcome.difficulty,
                    "tier result"
                );
                tags.extend(&outcome.tags);
                difficulty = difficulty.or(outcome.difficulty);
                color = color.or(outcome.color);
                description = description.or(outcome.description);
            }
            Err(e @ ScorerError::QuotaExceeded { .. }) => {
                info!(asset = %asset.id, tier = tier.name(), error = %e, "quota exhausted, falling back");
            }
            Err(e) => {
                info!(asset = %asset.id, tier = tier.name(), error = %e, "tier failed, falling back");
            }
        }
    }

    let taken = choose_capture_time(image.exif.capture_times(), &asset.created_time);
    let season = Season::from_month(taken.month());
    let orientation = Orientation::from_dimensions(image.width, image.height);
    let color = color.unwrap_or_else(|| image.palette_color());
    let camera = image.camera();
    let lens = image.lens();

    let observed = Observed {
        season,
        orientation,
        color,
        camera: &camera,
        lens: &lens,
    };
    fill_tags(&mut tags, &observed, ctx.policy.min_tags);

    let mut entry = ManifestEntry::minimal(asset, &ctx.version);
    entry.taken_at = format_timestamp(&taken);
    entry.season = season;
    entry.year = taken.year();
    entry.tags = tags.into_vec();
    entry.difficulty = difficulty
        .unwrap_or(DEFAULT_DIFFICULTY)
        .clamp(MIN_DIFFICULTY, MAX_DIFFICULTY);
    entry.color = color;
    entry.orientation = orientation;
    entry.width = image.width;
    entry.height = image.height;
    entry.camera = camera;
    entry.lens = lens;
    entry.description = description;
    entry
}
