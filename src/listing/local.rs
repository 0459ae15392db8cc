use chrono::{DateTime, SecondsFormat, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info};
use walkdir::WalkDir;

use super::{mime_for_extension, AssetProvider};
use crate::error::ListingError;
use crate::model::AssetRecord;

/// Lists images under a local directory. Ids are `/`-separated paths
/// relative to the root, so they stay stable across machines.
pub struct LocalProvider {
    root: PathBuf,
}

impl LocalProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn record_for(&self, path: &Path) -> Result<Option<AssetRecord>, ListingError> {
        let Ok(relative) = path.strip_prefix(&self.root) else {
            return Ok(None);
        };
        let id = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let name = relative
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let folder = id
            .rsplit_once('/')
            .map(|(parent, _)| parent.to_string())
            .unwrap_or_default();

        let metadata = fs::metadata(path)?;
        let modified = metadata.modified()?;
        let created = metadata.created().unwrap_or(modified);

        let mut asset = AssetRecord {
            src: id.clone(),
            id,
            name,
            mime_type: String::new(),
            created_time: format_system_time(created),
            modified_time: format_system_time(modified),
            path: folder,
            view: None,
        };
        if !asset.is_image() {
            return Ok(None);
        }
        if let Some(ext) = asset.extension() {
            asset.mime_type = mime_for_extension(&ext).to_string();
        }
        Ok(Some(asset))
    }
}

impl AssetProvider for LocalProvider {
    fn list(&self) -> Result<Vec<AssetRecord>, ListingError> {
        info!(root = %self.root.display(), "scanning local directory");

        let mut assets = Vec::new();
        for entry in WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|source| ListingError::DirectoryScanError {
                path: self.root.clone(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(asset) = self.record_for(entry.path())? {
                assets.push(asset);
            }
        }

        info!(count = assets.len(), "found image files");
        Ok(assets)
    }

    fn fetch(&self, asset: &AssetRecord) -> Result<Vec<u8>, ListingError> {
        let path = self.root.join(&asset.id);
        debug!(path = %path.display(), "reading image");
        Ok(fs::read(path)?)
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

fn format_system_time(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Millis, true)
}
