//! Final ordering and atomic publication of the manifest.

mod merge;
mod writer;

pub use merge::{merge_entries, sort_entries};
pub use writer::{render_manifest, write_manifest};
