use crate::{apply_catalog_policy, CatalogError, CatalogSource, Tle};

/// In-memory catalog adapter, primarily for tests and embeddable callers
/// that already hold a `Vec<Tle>` (e.g. generated fixtures).
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    rows: Vec<Tle>,
}

impl InMemoryCatalog {
    pub fn new(rows: Vec<Tle>) -> Self {
        Self { rows }
    }
}

impl CatalogSource for InMemoryCatalog {
    fn list_tles(
        &self,
        groups: &[String],
        max_objects: usize,
        prefer_latest_fetch: bool,
        dedupe_by_norad: bool,
    ) -> Result<Vec<Tle>, CatalogError> {
        Ok(apply_catalog_policy(
            self.rows.clone(),
            groups,
            max_objects,
            prefer_latest_fetch,
            dedupe_by_norad,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_tles_applies_policy() {
        let rows = vec![Tle {
            norad_id: 1,
            name: "SAT-1".to_string(),
            epoch_utc: "2026-01-01T00:00:00Z".to_string(),
            line1: "1 25544U".to_string(),
            line2: "2 25544".to_string(),
            source_group: "ACTIVE".to_string(),
            fetched_at_utc: "2026-01-01T00:00:00Z".to_string(),
        }];
        let catalog = InMemoryCatalog::new(rows);
        let out = catalog
            .list_tles(&["active".to_string()], 10, true, true)
            .unwrap();
        assert_eq!(out.len(), 1);
    }
}
