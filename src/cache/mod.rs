pub mod detector;

pub use detector::is_stale;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::IoError;
use crate::model::ManifestEntry;

/// Entries from the previously written manifest, keyed by asset id.
#[derive(Debug, Default, Clone)]
pub struct CacheStore {
    entries: HashMap<String, ManifestEntry>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the manifest at `path`.
    ///
    /// Never fails: a missing file yields an empty cache, and an unreadable
    /// or malformed file is logged and also yields an empty cache. Single
    /// elements that do not deserialize are skipped.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "no previous manifest, starting with empty cache");
            return Self::new();
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                let error = IoError::read_error(path, e);
                warn!(error = %error, "ignoring cache");
                return Self::new();
            }
        };

        Self::from_json(&content).unwrap_or_else(|message| {
            warn!(path = %path.display(), error = %message, "previous manifest is corrupt, ignoring cache");
            Self::new()
        })
    }

    /// Parses manifest text. Returns an error only when the document as a
    /// whole is not a JSON array.
    pub fn from_json(content: &str) -> Result<Self, String> {
        let values: Vec<serde_json::Value> =
            serde_json::from_str(content).map_err(|e| e.to_string())?;

        let mut entries = HashMap::with_capacity(values.len());
        let mut skipped = 0usize;
        for value in values {
            match serde_json::from_value::<ManifestEntry>(value) {
                Ok(entry) => {
                    entries.insert(entry.id.clone(), entry);
                }
                Err(e) => {
                    skipped += 1;
                    debug!(error = %e, "skipping unreadable cache entry");
                }
            }
        }

        if skipped > 0 {
            warn!(skipped, "some cached entries could not be read and will be rebuilt");
        }
        debug!(count = entries.len(), "loaded cache");
        Ok(Self { entries })
    }

    pub fn get(&self, id: &str) -> Option<&ManifestEntry> {
        self.entries.get(id)
    }

    pub fn insert(&mut self, entry: ManifestEntry) {
        self.entries.insert(entry.id.clone(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<ManifestEntry> for CacheStore {
    fn from_iter<I: IntoIterator<Item = ManifestEntry>>(iter: I) -> Self {
        let mut store = Self::new();
        for entry in iter {
            store.insert(entry);
        }
        store
    }
}
