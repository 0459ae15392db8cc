use serde::{Deserialize, Serialize};

use crate::utils::strip_extension;

/// File extensions the pipeline treats as images.
pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "webp", "bmp"];

/// One file in the source tree, as reported by an [`AssetProvider`].
///
/// Timestamps are kept as the provider's RFC 3339 strings so that change
/// detection compares exactly what was persisted.
///
/// [`AssetProvider`]: crate::listing::AssetProvider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub created_time: String,
    pub modified_time: String,
    pub path: String,
    pub src: String,
    pub view: Option<String>,
}

impl AssetRecord {
    pub fn display_name(&self) -> String {
        strip_extension(&self.name)
    }

    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.name.rsplit_once('.')?;
        Some(ext.to_lowercase())
    }

    pub fn is_image(&self) -> bool {
        self.extension()
            .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
    }
}
