//! File-based catalog adapter: a JSON array of rows shaped like the
//! reference `tles` table (spec §6), used for batch ingestion without a
//! SQLite dependency.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::{apply_catalog_policy, CatalogError, CatalogSource, Tle};

#[derive(Debug, Deserialize)]
struct RawRow {
    norad_id: u32,
    name: String,
    epoch_utc: String,
    line1: String,
    line2: String,
    source_group: String,
    fetched_at_utc: String,
}

/// Loads the full catalog from a single JSON file on every call, the same
/// way `candidate_selector::loader` reads its ground-node JSON: a
/// `BufReader` over `serde_json::from_reader`.
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn load_rows(&self) -> Result<Vec<Tle>, CatalogError> {
        info!(path = %self.path.display(), "loading catalog from JSON file");
        let file = File::open(&self.path)
            .map_err(|err| CatalogError::Io(format!("{}: {err}", self.path.display())))?;
        let reader = BufReader::new(file);
        let rows: Vec<RawRow> = serde_json::from_reader(reader)
            .map_err(|err| CatalogError::Parse(err.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| Tle {
                norad_id: row.norad_id,
                name: row.name,
                epoch_utc: row.epoch_utc,
                line1: row.line1,
                line2: row.line2,
                source_group: row.source_group.to_uppercase(),
                fetched_at_utc: row.fetched_at_utc,
            })
            .collect())
    }
}

impl CatalogSource for JsonFileCatalog {
    fn list_tles(
        &self,
        groups: &[String],
        max_objects: usize,
        prefer_latest_fetch: bool,
        dedupe_by_norad: bool,
    ) -> Result<Vec<Tle>, CatalogError> {
        let rows = self.load_rows()?;
        Ok(apply_catalog_policy(
            rows,
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
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn loads_and_upper_cases_groups() {
        let json = r#"[
            {"norad_id": 1, "name": "ISS", "epoch_utc": "2026-01-01T00:00:00Z",
             "line1": "1 25544U", "line2": "2 25544",
             "source_group": "active", "fetched_at_utc": "2026-01-01T00:00:00Z"}
        ]"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let catalog = JsonFileCatalog::new(file.path());
        let out = catalog
            .list_tles(&["ACTIVE".to_string()], 10, true, true)
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source_group, "ACTIVE");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let catalog = JsonFileCatalog::new("/nonexistent/path/catalog.json");
        let err = catalog
            .list_tles(&["ACTIVE".to_string()], 10, true, true)
            .unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }
}
