//! Gallery Manifest
//!
//! Incremental, cache-aware manifest builder for an image gallery backed by
//! a remote file tree. Unchanged images are reused from the previous
//! manifest; new or changed ones are analyzed by a tiered enrichment chain
//! within a per-run budget.

pub mod cache;
pub mod cli;
pub mod config;
pub mod decode;
pub mod enrich;
pub mod error;
pub mod listing;
pub mod logging;
pub mod manifest;
pub mod model;
pub mod pipeline;
pub mod quota;
pub mod scoring;
pub mod utils;

pub use config::Config;
pub use error::{Error, Result};
pub use model::{AssetRecord, ManifestEntry};
pub use pipeline::{run, RunSummary};
