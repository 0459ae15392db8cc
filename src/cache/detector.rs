use crate::model::{AssetRecord, ManifestEntry};

/// Decides whether `cached` can no longer stand in for `asset`.
///
/// Stale when there is no cached entry, when the remote content changed
/// (different `modifiedTime`), or when the entry was produced by a
/// different enrichment version. Pending placeholders are always stale,
/// whatever the current version.
pub fn is_stale(asset: &AssetRecord, cached: Option<&ManifestEntry>, current_version: &str) -> bool {
    let Some(cached) = cached else {
        return true;
    };
    if cached.is_pending() {
        return true;
    }
    if cached.modified_time != asset.modified_time {
        return true;
    }
    cached.version != current_version
}
