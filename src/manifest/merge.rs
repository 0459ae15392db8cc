use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::warn;

use crate::model::ManifestEntry;

/// Publication order: newest year first, then chronological within a year,
/// with name and id as tie-breakers so the order is total.
fn publication_order(a: &ManifestEntry, b: &ManifestEntry) -> Ordering {
    b.year
        .cmp(&a.year)
        .then_with(|| a.taken_at.cmp(&b.taken_at))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}

pub fn sort_entries(entries: &mut [ManifestEntry]) {
    entries.sort_by(publication_order);
}

/// Keeps one entry per id (the first seen) and sorts the result.
pub fn merge_entries<I>(entries: I) -> Vec<ManifestEntry>
where
    I: IntoIterator<Item = ManifestEntry>,
{
    let mut seen = HashSet::new();
    let mut merged: Vec<ManifestEntry> = entries
        .into_iter()
        .filter(|entry| {
            let first = seen.insert(entry.id.clone());
            if !first {
                warn!(id = %entry.id, "duplicate asset id, keeping first entry");
            }
            first
        })
        .collect();
    sort_entries(&mut merged);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AssetRecord, ENRICHMENT_VERSION};
    use pretty_assertions::assert_eq;

    fn entry(id: &str, name: &str, taken_at: &str, year: i32) -> ManifestEntry {
        let asset = AssetRecord {
            id: id.to_string(),
            name: format!("{name}.jpg"),
            mime_type: "image/jpeg".to_string(),
            created_time: taken_at.to_string(),
            modified_time: taken_at.to_string(),
            path: String::new(),
            src: String::new(),
            view: None,
        };
        let mut entry = ManifestEntry::minimal(&asset, ENRICHMENT_VERSION);
        entry.taken_at = taken_at.to_string();
        entry.year = year;
        entry
    }

    fn ids(entries: &[ManifestEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_year_descending_then_chronological() {
        let merged = merge_entries(vec![
            entry("a", "Dunes", "2021-03-01T00:00:00Z", 2021),
            entry("b", "Glacier", "2023-08-01T00:00:00Z", 2023),
            entry("c", "Canyon", "2023-02-01T00:00:00Z", 2023),
        ]);
        assert_eq!(ids(&merged), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_ties_break_on_name_then_id() {
        let t = "2022-05-05T10:00:00Z";
        let merged = merge_entries(vec![
            entry("z", "Bay", t, 2022),
            entry("y", "Bay", t, 2022),
            entry("x", "Arch", t, 2022),
        ]);
        assert_eq!(ids(&merged), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let t = "2022-05-05T10:00:00Z";
        let merged = merge_entries(vec![
            entry("a", "First", t, 2022),
            entry("a", "Second", t, 2022),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "First");
    }
}
