mod fixtures;

use std::fs;

use fixtures::{asset, config, png, FakeProvider};
use gallery_manifest::cache::CacheStore;
use gallery_manifest::config::ScoringPolicy;
use gallery_manifest::enrich::EnrichContext;
use gallery_manifest::error::Error;
use gallery_manifest::manifest::write_manifest;
use gallery_manifest::model::{ManifestEntry, PaletteColor, ENRICHMENT_VERSION, PENDING_VERSION};
use gallery_manifest::pipeline::{build_manifest, run_with, RunSummary};
use gallery_manifest::quota::QuotaLimiter;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const T1: &str = "2022-07-11T08:00:00.000Z";
const T2: &str = "2023-01-05T08:00:00.000Z";

fn heuristic_context(version: &str) -> EnrichContext {
    EnrichContext::new(ScoringPolicy::default(), version)
}

fn three_images() -> FakeProvider {
    FakeProvider::new()
        .with_image(asset("a", "Harbor.png", T1), png(64, 48, [40, 70, 200]))
        .with_image(asset("b", "Forest.png", T1), png(48, 64, [50, 150, 60]))
        .with_image(asset("c", "Desert.png", T1), png(64, 64, [230, 130, 40]))
}

fn read_entries(path: &std::path::Path) -> Vec<ManifestEntry> {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_second_run_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir.path().join("manifest.json"));
    let provider = three_images();

    let first = run_with(&config, &provider, &mut heuristic_context(ENRICHMENT_VERSION)).unwrap();
    assert_eq!(first.enriched, 3);
    let first_bytes = fs::read(&config.output_path).unwrap();

    let second = run_with(&config, &provider, &mut heuristic_context(ENRICHMENT_VERSION)).unwrap();
    assert_eq!(
        second,
        RunSummary {
            total: 3,
            reused: 3,
            ..RunSummary::default()
        }
    );
    assert_eq!(fs::read(&config.output_path).unwrap(), first_bytes);
    assert_eq!(provider.fetched().len(), 3);
}

#[test]
fn test_version_bump_reprocesses_everything() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir.path().join("manifest.json"));
    let provider = three_images();

    run_with(&config, &provider, &mut heuristic_context("enrich-old")).unwrap();
    let summary = run_with(&config, &provider, &mut heuristic_context(ENRICHMENT_VERSION)).unwrap();

    assert_eq!(summary.enriched, 3);
    assert_eq!(summary.reused, 0);
    assert!(read_entries(&config.output_path)
        .iter()
        .all(|e| e.version == ENRICHMENT_VERSION));
}

#[test]
fn test_modified_asset_is_reprocessed() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir.path().join("manifest.json"));
    run_with(&config, &three_images(), &mut heuristic_context(ENRICHMENT_VERSION)).unwrap();

    let changed = FakeProvider::new()
        .with_image(asset("a", "Harbor.png", T1), png(64, 48, [40, 70, 200]))
        .with_image(asset("b", "Forest.png", T2), png(48, 64, [50, 150, 60]))
        .with_image(asset("c", "Desert.png", T1), png(64, 64, [230, 130, 40]));
    let summary = run_with(&config, &changed, &mut heuristic_context(ENRICHMENT_VERSION)).unwrap();

    assert_eq!(summary.reused, 2);
    assert_eq!(summary.enriched, 1);
    assert_eq!(changed.fetched(), vec!["b"]);
}

#[test]
fn test_budget_defers_and_later_runs_catch_up() {
    let dir = TempDir::new().unwrap();
    let mut config = config(&dir.path().join("manifest.json"));
    config.budget = Some(2);
    let mut provider = FakeProvider::new();
    for i in 0..5 {
        provider = provider.with_image(
            asset(&format!("img-{i}"), &format!("Photo {i}.png"), T1),
            png(16, 16, [10, 10, 10]),
        );
    }

    let summary = run_with(&config, &provider, &mut heuristic_context(ENRICHMENT_VERSION)).unwrap();
    assert_eq!((summary.enriched, summary.deferred), (2, 3));
    let entries = read_entries(&config.output_path);
    assert_eq!(entries.len(), 5);
    assert_eq!(entries.iter().filter(|e| e.version == PENDING_VERSION).count(), 3);

    let summary = run_with(&config, &provider, &mut heuristic_context(ENRICHMENT_VERSION)).unwrap();
    assert_eq!((summary.reused, summary.enriched, summary.deferred), (2, 2, 1));

    let summary = run_with(&config, &provider, &mut heuristic_context(ENRICHMENT_VERSION)).unwrap();
    assert_eq!((summary.reused, summary.enriched, summary.deferred), (4, 1, 0));
    assert!(read_entries(&config.output_path)
        .iter()
        .all(|e| e.version == ENRICHMENT_VERSION));
}

#[test]
fn test_cached_valid_stale_and_deferred_assets() {
    let dir = TempDir::new().unwrap();
    let mut config = config(&dir.path().join("manifest.json"));
    config.budget = Some(1);

    let a = asset("a", "Arch.png", T1);
    let b = asset("b", "Bridge.png", T2);
    let c = asset("c", "Canal.png", T1);

    let mut cached_a = ManifestEntry::minimal(&a, ENRICHMENT_VERSION);
    cached_a.tags = vec!["arch".to_string(), "stone".to_string()];
    cached_a.difficulty = 2;
    cached_a.color = PaletteColor::Brown;
    cached_a.width = 4000;
    cached_a.height = 3000;

    let mut cached_b = ManifestEntry::minimal(&asset("b", "Bridge.png", T1), ENRICHMENT_VERSION);
    cached_b.tags = vec!["old-bridge".to_string()];

    let mut cached_c = ManifestEntry::minimal(&c, "enrich-v1");
    cached_c.tags = vec!["canal".to_string(), "boats".to_string()];
    cached_c.color = PaletteColor::Teal;
    write_manifest(
        &config.output_path,
        &[cached_a.clone(), cached_b, cached_c.clone()],
    )
    .unwrap();

    let provider = FakeProvider::new()
        .with_image(a, png(32, 32, [0, 0, 0]))
        .with_image(b, png(80, 40, [200, 40, 40]))
        .with_image(c, png(32, 32, [0, 0, 0]));
    let summary = run_with(&config, &provider, &mut heuristic_context(ENRICHMENT_VERSION)).unwrap();

    assert_eq!(
        summary,
        RunSummary {
            total: 3,
            reused: 1,
            enriched: 1,
            deferred: 1,
            failed: 0,
        }
    );
    assert_eq!(provider.fetched(), vec!["b"]);

    let entries = read_entries(&config.output_path);
    let find = |id: &str| entries.iter().find(|e| e.id == id).unwrap().clone();

    assert_eq!(find("a"), cached_a);

    let fresh = find("b");
    assert_eq!(fresh.version, ENRICHMENT_VERSION);
    assert_eq!(fresh.modified_time, T2);
    assert_eq!((fresh.width, fresh.height), (80, 40));
    assert_eq!(fresh.color, PaletteColor::Red);
    assert_eq!(fresh.tags, vec!["summer", "landscape", "red"]);

    let deferred = find("c");
    assert_eq!(deferred.version, PENDING_VERSION);
    assert_eq!(deferred.tags, cached_c.tags);
    assert_eq!(deferred.color, PaletteColor::Teal);
}

#[test]
fn test_download_failure_yields_pending_placeholder() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir.path().join("manifest.json"));
    let provider = FakeProvider::new()
        .with_image(asset("ok", "Fine.png", T1), png(10, 20, [240, 240, 240]))
        .with_missing(asset("gone", "Gone.png", T1));

    let summary = run_with(&config, &provider, &mut heuristic_context(ENRICHMENT_VERSION)).unwrap();
    assert_eq!((summary.enriched, summary.failed), (1, 1));

    let entries = read_entries(&config.output_path);
    let gone = entries.iter().find(|e| e.id == "gone").unwrap();
    assert_eq!(gone.version, PENDING_VERSION);
    assert_eq!((gone.width, gone.height), (0, 0));
    assert_eq!(gone.camera, "Unknown");
    assert_eq!(gone.difficulty, 3);
}

#[test]
fn test_listing_failure_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir.path().join("manifest.json"));

    let err = run_with(&config, &FakeProvider::failing(), &mut heuristic_context(ENRICHMENT_VERSION))
        .unwrap_err();
    assert!(matches!(err, Error::Listing(_)));
    assert!(!config.output_path.exists());
}

#[test]
fn test_pending_version_stamp_is_refused() {
    let dir = TempDir::new().unwrap();
    let mut config = config(&dir.path().join("manifest.json"));
    config.budget = Some(1);
    let provider = FakeProvider::new()
        .with_image(asset("a", "Arch.png", T1), png(8, 8, [0, 0, 0]))
        .with_image(asset("b", "Bridge.png", T1), png(8, 8, [0, 0, 0]));

    let err = run_with(&config, &provider, &mut heuristic_context(PENDING_VERSION)).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(provider.fetched().is_empty());
    assert!(!config.output_path.exists());
}

#[test]
fn test_corrupt_cache_is_rebuilt() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir.path().join("manifest.json"));
    fs::write(&config.output_path, "{ not a manifest").unwrap();

    let summary = run_with(&config, &three_images(), &mut heuristic_context(ENRICHMENT_VERSION)).unwrap();
    assert_eq!(summary.enriched, 3);
    assert_eq!(read_entries(&config.output_path).len(), 3);
}

#[test]
fn test_vanished_asset_is_dropped() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir.path().join("manifest.json"));
    run_with(&config, &three_images(), &mut heuristic_context(ENRICHMENT_VERSION)).unwrap();

    let fewer = FakeProvider::new()
        .with_image(asset("a", "Harbor.png", T1), png(64, 48, [40, 70, 200]));
    let summary = run_with(&config, &fewer, &mut heuristic_context(ENRICHMENT_VERSION)).unwrap();

    assert_eq!(summary.total, 1);
    let ids: Vec<String> = read_entries(&config.output_path)
        .into_iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(ids, vec!["a"]);
}

#[test]
fn test_build_manifest_without_disk() {
    let provider = three_images();
    let assets = vec![
        asset("a", "Harbor.png", T1),
        asset("b", "Forest.png", T1),
        asset("a", "Harbor copy.png", T1),
    ];
    let (entries, summary) = build_manifest(
        assets,
        &CacheStore::new(),
        QuotaLimiter::unlimited(),
        &provider,
        &mut heuristic_context(ENRICHMENT_VERSION),
    );
    assert_eq!(summary.total, 2);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "Forest");
    assert_eq!(entries[1].name, "Harbor");
}
