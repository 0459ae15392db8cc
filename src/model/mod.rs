//! Value objects shared by every stage of the pipeline.

mod asset;
mod entry;
mod palette;
mod tags;
mod time;

pub use asset::{AssetRecord, IMAGE_EXTENSIONS};
pub use entry::{
    ManifestEntry, Orientation, Season, DEFAULT_DIFFICULTY, ENRICHMENT_VERSION, MAX_DIFFICULTY,
    MIN_DIFFICULTY, PENDING_VERSION, UNKNOWN,
};
pub use palette::{PaletteColor, Rgb};
pub use tags::{normalize_tag, TagList, MAX_TAGS};
pub use time::{choose_capture_time, format_timestamp, parse_timestamp};
