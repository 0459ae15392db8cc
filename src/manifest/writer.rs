use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::IoError;
use crate::model::ManifestEntry;

/// Pretty-printed JSON array with a trailing newline.
pub fn render_manifest(entries: &[ManifestEntry]) -> Result<String, IoError> {
    let mut text =
        serde_json::to_string_pretty(entries).map_err(|e| IoError::serialize_error(e.to_string()))?;
    text.push('\n');
    Ok(text)
}

/// Replaces `path` with the rendered manifest. The document is written to a
/// temporary file in the same directory and renamed over the target, so
/// readers see either the old or the new manifest, never a partial one.
pub fn write_manifest(path: &Path, entries: &[ManifestEntry]) -> Result<(), IoError> {
    let text = render_manifest(entries)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| IoError::write_error(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| IoError::write_error(dir, e))?;
    tmp.write_all(text.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| IoError::write_error(tmp.path(), e))?;
    tmp.persist(path)
        .map_err(|e| IoError::write_error(path, e.error))?;

    debug!(path = %path.display(), entries = entries.len(), bytes = text.len(), "manifest written");
    Ok(())
}
