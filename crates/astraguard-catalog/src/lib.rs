//! TLE catalog loading: group normalization, dedup, and deterministic ordering.
//!
//! The core is parameterized over [`CatalogSource`] so that it never binds to
//! a particular store. `memory` and `json_file` provide two reference
//! adapters; a SQLite-backed adapter is an external collaborator's concern.

mod json_file;
mod memory;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use json_file::JsonFileCatalog;
pub use memory::InMemoryCatalog;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog source unavailable: {0}")]
    Io(String),
    #[error("failed to parse catalog payload: {0}")]
    Parse(String),
}

/// Immutable two-line element set row as read from a catalog store.
///
/// `epoch_utc` and `fetched_at_utc` are kept as ISO-8601 strings rather than
/// parsed instants: the ordering contract in spec §4.1 is defined
/// lexicographically over those strings, which is exactly string ordering
/// for zero-padded ISO-8601 timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tle {
    pub norad_id: u32,
    pub name: String,
    pub epoch_utc: String,
    pub line1: String,
    pub line2: String,
    pub source_group: String,
    pub fetched_at_utc: String,
}

/// An adapter over a backing catalog store (SQLite, file, memory, ...).
pub trait CatalogSource {
    fn list_tles(
        &self,
        groups: &[String],
        max_objects: usize,
        prefer_latest_fetch: bool,
        dedupe_by_norad: bool,
    ) -> Result<Vec<Tle>, CatalogError>;
}

/// Normalize group names: uppercase, drop empties, drop duplicates, preserve
/// first-seen order.
pub fn normalize_groups(groups: &[String]) -> Vec<String> {
    let mut normalized = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for group in groups {
        let value = group.trim().to_uppercase();
        if value.is_empty() || !seen.insert(value.clone()) {
            continue;
        }
        normalized.push(value);
    }
    normalized
}

/// Apply the §4.1 filter/dedupe/sort/truncate policy to a raw row set
/// already fetched from a backing store. Adapters call this after pulling
/// every row that matches the normalized group set.
pub fn apply_catalog_policy(
    raw_rows: Vec<Tle>,
    groups: &[String],
    max_objects: usize,
    prefer_latest_fetch: bool,
    dedupe_by_norad: bool,
) -> Vec<Tle> {
    let normalized_groups = normalize_groups(groups);
    if normalized_groups.is_empty() {
        tracing::warn!("no groups provided after normalization; returning empty catalog");
        return Vec::new();
    }
    if max_objects == 0 {
        tracing::warn!("max_objects == 0; returning empty catalog");
        return Vec::new();
    }

    let group_set: std::collections::HashSet<&str> =
        normalized_groups.iter().map(String::as_str).collect();
    let mut filtered: Vec<Tle> = raw_rows
        .into_iter()
        .filter(|tle| group_set.contains(tle.source_group.as_str()))
        .collect();

    if prefer_latest_fetch {
        let mut max_fetched_by_group: HashMap<String, String> = HashMap::new();
        for tle in &filtered {
            let entry = max_fetched_by_group
                .entry(tle.source_group.clone())
                .or_insert_with(|| tle.fetched_at_utc.clone());
            if tle.fetched_at_utc > *entry {
                *entry = tle.fetched_at_utc.clone();
            }
        }
        filtered.retain(|tle| {
            max_fetched_by_group
                .get(&tle.source_group)
                .map(|max_fetched| *max_fetched == tle.fetched_at_utc)
                .unwrap_or(false)
        });
    }

    let pre_dedupe_count = filtered.len();

    let deduped: Vec<Tle> = if dedupe_by_norad {
        let mut best_by_norad: HashMap<u32, Tle> = HashMap::new();
        for tle in filtered {
            match best_by_norad.get(&tle.norad_id) {
                Some(current)
                    if (tle.epoch_utc.as_str(), tle.fetched_at_utc.as_str())
                        <= (current.epoch_utc.as_str(), current.fetched_at_utc.as_str()) => {}
                _ => {
                    best_by_norad.insert(tle.norad_id, tle);
                }
            }
        }
        best_by_norad.into_values().collect()
    } else {
        filtered
    };

    let duplicates_removed = pre_dedupe_count - deduped.len();

    let mut sorted = deduped;
    sorted.sort_by(|a, b| (a.norad_id, &a.epoch_utc).cmp(&(b.norad_id, &b.epoch_utc)));
    sorted.truncate(max_objects);

    let mut group_counts: HashMap<&str, usize> = HashMap::new();
    for tle in &sorted {
        *group_counts.entry(tle.source_group.as_str()).or_insert(0) += 1;
    }

    tracing::info!(
        selected = sorted.len(),
        duplicates_removed,
        "catalog load complete"
    );
    if group_counts.is_empty() {
        tracing::warn!("no catalog rows selected after filtering");
    } else {
        let mut groups: Vec<&&str> = group_counts.keys().collect();
        groups.sort();
        for group in groups {
            tracing::info!(group = *group, count = group_counts[group], "group count");
        }
    }

    sorted
}
