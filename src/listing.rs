//! Combined listing of live search results and local catalog records.

use crate::aldi::models::ProductRecord;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

/// Loads local catalog records from a JSON array.
///
/// Records without an `is_live` field are treated as stored (not live).
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Vec<ProductRecord>> {
    let path = path.as_ref();
    debug!("Loading catalog from: {}", path.display());

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse catalog file: {}", path.display()))
}

/// Returns true if a catalog record matches the query (case-insensitive
/// substring of the title; an empty query matches everything).
fn matches_query(record: &ProductRecord, query: &str) -> bool {
    query.is_empty() || record.title.to_lowercase().contains(&query.to_lowercase())
}

/// Merges live records (kept in search rank order) with the catalog records
/// matching `query`, which follow sorted by title and then price.
pub fn merge(
    live: Vec<ProductRecord>,
    local: Vec<ProductRecord>,
    query: &str,
) -> Vec<ProductRecord> {
    let mut local: Vec<_> = local.into_iter().filter(|r| matches_query(r, query)).collect();
    local.sort_by(|a, b| a.title.cmp(&b.title).then(a.price.total_cmp(&b.price)));

    debug!("Merging {} live and {} catalog records", live.len(), local.len());

    let mut merged = live;
    merged.extend(local);
    merged
}
