//! Asset listing and download collaborators.

pub mod drive;
pub mod local;

pub use drive::DriveProvider;
pub use local::LocalProvider;

use crate::error::ListingError;
use crate::model::AssetRecord;

/// Source of asset records and their bytes.
///
/// `list` must page transparently, return an empty vector for an empty
/// tree, and only report image files.
pub trait AssetProvider {
    fn list(&self) -> Result<Vec<AssetRecord>, ListingError>;

    fn fetch(&self, asset: &AssetRecord) -> Result<Vec<u8>, ListingError>;

    fn name(&self) -> &'static str;
}

pub fn mime_for_extension(ext: &str) -> &'static str {
    match ext {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}
