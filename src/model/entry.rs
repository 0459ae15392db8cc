use chrono::Datelike;
use serde::{Deserialize, Serialize};

use super::time::{choose_capture_time, format_timestamp};
use super::{AssetRecord, PaletteColor};

/// Stamp of the enrichment logic that produced fresh entries. Bump it to
/// force every asset through enrichment again.
pub const ENRICHMENT_VERSION: &str = "enrich-v3";

/// Stamp carried by deferred or failed entries that still need a fresh pass.
pub const PENDING_VERSION: &str = "pending";

pub const UNKNOWN: &str = "Unknown";

pub const MIN_DIFFICULTY: u8 = 1;
pub const MAX_DIFFICULTY: u8 = 5;
pub const DEFAULT_DIFFICULTY: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Fall,
            _ => Season::Winter,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Winter => "Winter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// Square images count as portrait.
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        if height >= width {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Portrait => "Portrait",
            Orientation::Landscape => "Landscape",
        }
    }
}

/// One published record of the manifest.
///
/// Field order here is the key order in the written JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub created_time: String,
    #[serde(default)]
    pub modified_time: String,
    #[serde(default)]
    pub taken_at: String,
    pub season: Season,
    pub year: i32,
    #[serde(default)]
    pub tags: Vec<String>,
    pub difficulty: u8,
    pub color: PaletteColor,
    pub orientation: Orientation,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    pub camera: String,
    pub lens: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version: String,
}

impl ManifestEntry {
    /// Smallest entry that keeps an asset visible: no pixels, no tags,
    /// dated by the asset's creation time.
    pub fn minimal(asset: &AssetRecord, version: &str) -> Self {
        let no_embedded: [Option<&str>; 0] = [];
        let taken = choose_capture_time(no_embedded, &asset.created_time);
        let mut entry = Self {
            id: String::new(),
            name: String::new(),
            src: String::new(),
            view: None,
            mime_type: String::new(),
            path: String::new(),
            created_time: String::new(),
            modified_time: String::new(),
            taken_at: format_timestamp(&taken),
            season: Season::from_month(taken.month()),
            year: taken.year(),
            tags: Vec::new(),
            difficulty: DEFAULT_DIFFICULTY,
            color: PaletteColor::Neutral,
            orientation: Orientation::from_dimensions(0, 0),
            width: 0,
            height: 0,
            camera: UNKNOWN.to_string(),
            lens: UNKNOWN.to_string(),
            description: None,
            version: version.to_string(),
        };
        entry.refresh_identity(asset);
        entry
    }

    /// Placeholder for an asset whose analysis was postponed. Keeps any
    /// previously published display fields so the gallery does not regress.
    pub fn pending(asset: &AssetRecord, cached: Option<&ManifestEntry>) -> Self {
        match cached {
            Some(cached) => {
                let mut entry = cached.clone().with_identity(asset);
                entry.version = PENDING_VERSION.to_string();
                entry
            }
            None => Self::minimal(asset, PENDING_VERSION),
        }
    }

    /// Copies identity and timestamp fields from the live record.
    pub fn refresh_identity(&mut self, asset: &AssetRecord) {
        self.id.clone_from(&asset.id);
        self.name = asset.display_name();
        self.src.clone_from(&asset.src);
        self.view.clone_from(&asset.view);
        self.mime_type.clone_from(&asset.mime_type);
        self.path.clone_from(&asset.path);
        self.created_time.clone_from(&asset.created_time);
        self.modified_time.clone_from(&asset.modified_time);
    }

    pub fn with_identity(mut self, asset: &AssetRecord) -> Self {
        self.refresh_identity(asset);
        self
    }

    pub fn is_pending(&self) -> bool {
        self.version == PENDING_VERSION
    }
}
