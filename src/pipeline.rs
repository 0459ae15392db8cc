//! One full manifest run: list, detect changes, budget, enrich, merge and
//! write.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::{is_stale, CacheStore};
use crate::config::{Config, SourceConfig};
use crate::enrich::{enrich_asset, EnrichContext, Enrichment, ThreadSleeper};
use crate::error::{ConfigError, Result};
use crate::listing::{AssetProvider, DriveProvider, LocalProvider};
use crate::manifest::{merge_entries, write_manifest};
use crate::model::{AssetRecord, ManifestEntry, PENDING_VERSION};
use crate::quota::QuotaLimiter;

/// Counts for one run. `reused + enriched + deferred + failed == total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub reused: usize,
    pub enriched: usize,
    pub deferred: usize,
    pub failed: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} images: {} reused, {} enriched, {} deferred, {} failed",
            self.total, self.reused, self.enriched, self.deferred, self.failed
        )
    }
}

pub fn provider_for(source: &SourceConfig) -> Box<dyn AssetProvider> {
    match source {
        SourceConfig::Drive {
            api_key,
            folder_id,
            page_size,
        } => Box::new(DriveProvider::new(api_key.clone(), folder_id.clone(), *page_size)),
        SourceConfig::Local { root } => Box::new(LocalProvider::new(root.clone())),
    }
}

/// Runs against the configured source and the real scorers.
pub fn run(config: &Config) -> Result<RunSummary> {
    let provider = provider_for(&config.source);
    let mut ctx = EnrichContext::from_config(config, Arc::new(ThreadSleeper));
    run_with(config, provider.as_ref(), &mut ctx)
}

/// Runs with caller-supplied collaborators. Listing errors abort the run
/// before anything is written.
pub fn run_with(
    config: &Config,
    provider: &dyn AssetProvider,
    ctx: &mut EnrichContext,
) -> Result<RunSummary> {
    if ctx.version() == PENDING_VERSION {
        return Err(ConfigError::invalid_value(
            "MANIFEST_VERSION_STAMP",
            format!("'{PENDING_VERSION}' is reserved for deferred entries"),
        )
        .into());
    }

    info!(
        source = provider.name(),
        root = %config.source_root(),
        version = ctx.version(),
        "building manifest"
    );

    let cache = CacheStore::load(&config.output_path);
    let assets = provider.list()?;
    let limiter = QuotaLimiter::new(config.budget);

    let (entries, summary) = build_manifest(assets, &cache, limiter, provider, ctx);
    write_manifest(&config.output_path, &entries)?;

    info!(
        total = summary.total,
        reused = summary.reused,
        enriched = summary.enriched,
        deferred = summary.deferred,
        failed = summary.failed,
        path = %config.output_path.display(),
        "manifest complete"
    );
    Ok(summary)
}

/// Produces the ordered manifest for `assets` without touching the disk.
pub fn build_manifest(
    assets: Vec<AssetRecord>,
    cache: &CacheStore,
    limiter: QuotaLimiter,
    provider: &dyn AssetProvider,
    ctx: &mut EnrichContext,
) -> (Vec<ManifestEntry>, RunSummary) {
    let assets = dedup_assets(assets);
    let mut summary = RunSummary {
        total: assets.len(),
        ..RunSummary::default()
    };

    let mut entries = Vec::with_capacity(assets.len());
    let mut stale = Vec::new();
    for asset in &assets {
        let cached = cache.get(&asset.id);
        if is_stale(asset, cached, ctx.version()) {
            stale.push(asset);
        } else if let Some(cached) = cached {
            entries.push(cached.clone().with_identity(asset));
            summary.reused += 1;
        }
    }
    debug!(reused = summary.reused, stale = stale.len(), "change detection done");

    let partition = limiter.partition(stale);
    if !partition.deferred.is_empty() {
        info!(
            budget = ?limiter.budget(),
            deferred = partition.deferred.len(),
            "budget reached, deferring remaining images"
        );
    }

    for asset in partition.process_now {
        let cached = cache.get(&asset.id);
        match enrich_asset(ctx, provider, asset, cached) {
            Enrichment::Fresh(entry) => {
                summary.enriched += 1;
                entries.push(entry);
            }
            Enrichment::Failed(entry) => {
                summary.failed += 1;
                entries.push(entry);
            }
        }
    }

    for asset in partition.deferred {
        entries.push(ManifestEntry::pending(asset, cache.get(&asset.id)));
        summary.deferred += 1;
    }

    (merge_entries(entries), summary)
}

fn dedup_assets(assets: Vec<AssetRecord>) -> Vec<AssetRecord> {
    let mut seen = HashSet::new();
    assets
        .into_iter()
        .filter(|asset| {
            let first = seen.insert(asset.id.clone());
            if !first {
                warn!(id = %asset.id, path = %asset.path, "asset listed twice, ignoring repeat");
            }
            first
        })
        .collect()
}
