//! Artifact file writers: `top_conjunctions`, `cesium_orbits_snapshot`,
//! `maneuver_plans`, and the SHA-256 manifest that always writes last.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use astraguard_risk::ConjunctionEvent;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::entry::ManeuverPlanEntry;
use crate::manifest::{sha256_hex, ArtifactEntry, ArtifactManifest};
use crate::snapshot::CesiumSnapshot;

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("artifact I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("artifact serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("CSV shadow write failed: {0}")]
    Csv(#[from] csv::Error),
}

/// A single written artifact file, ready to be folded into the manifest.
pub struct WrittenArtifact {
    pub name: String,
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

fn write_file(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf, ArtifactError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    fs::write(&path, bytes)?;
    Ok(path)
}

#[derive(Serialize)]
struct TopConjunctionsRoot<'a> {
    schema_version: u32,
    artifact_type: &'static str,
    model_version: &'a str,
    generated_at_utc: DateTime<Utc>,
    event_count: usize,
    events: &'a [ConjunctionEvent],
}

const TOP_CONJUNCTIONS_CSV_HEADERS: [&str; 12] = [
    "event_id",
    "primary_id",
    "secondary_id",
    "tca_utc",
    "miss_distance_m",
    "relative_speed_mps",
    "pc_assumed",
    "risk_score",
    "window_start_utc",
    "window_end_utc",
    "model_version",
    "assumptions_json",
];

pub fn write_top_conjunctions(
    dir: &Path,
    model_version: &str,
    generated_at_utc: DateTime<Utc>,
    events: &[ConjunctionEvent],
) -> Result<Vec<WrittenArtifact>, ArtifactError> {
    let root = TopConjunctionsRoot {
        schema_version: 1,
        artifact_type: "top_conjunctions",
        model_version,
        generated_at_utc,
        event_count: events.len(),
        events,
    };
    let mut json_bytes = serde_json::to_vec_pretty(&root)?;
    json_bytes.push(b'\n');
    let json_path = write_file(dir, "top_conjunctions.json", &json_bytes)?;

    let mut csv_writer = csv::WriterBuilder::new().from_writer(Vec::new());
    csv_writer.write_record(TOP_CONJUNCTIONS_CSV_HEADERS)?;
    for event in events {
        let assumptions_json = serde_json::to_string(&event.assumptions)?;
        csv_writer.write_record([
            event.event_id.as_str(),
            &event.primary_id.to_string(),
            &event.secondary_id.to_string(),
            event.tca_utc.as_str(),
            &event.miss_distance_m.to_string(),
            &event.relative_speed_mps.to_string(),
            &event.pc_assumed.to_string(),
            &event.risk_score.to_string(),
            event.window_start_utc.as_str(),
            event.window_end_utc.as_str(),
            event.model_version.as_str(),
            &assumptions_json,
        ])?;
    }
    let csv_bytes = csv_writer.into_inner().expect("in-memory writer never fails to flush");
    let csv_path = write_file(dir, "top_conjunctions.csv", &csv_bytes)?;

    Ok(vec![
        WrittenArtifact { name: "top_conjunctions".to_string(), path: json_path, bytes: json_bytes },
        WrittenArtifact { name: "top_conjunctions_csv".to_string(), path: csv_path, bytes: csv_bytes },
    ])
}

pub fn write_cesium_snapshot(dir: &Path, snapshot: &CesiumSnapshot) -> Result<WrittenArtifact, ArtifactError> {
    let mut bytes = serde_json::to_vec(snapshot)?;
    bytes.push(b'\n');
    let path = write_file(dir, "cesium_orbits_snapshot.json", &bytes)?;
    Ok(WrittenArtifact { name: "cesium_snapshot".to_string(), path, bytes })
}

#[derive(Serialize)]
struct ManeuverPlansRoot<'a> {
    schema_version: u32,
    artifact_type: &'static str,
    model_version: &'a str,
    generated_at_utc: DateTime<Utc>,
    event_count: usize,
    plans_by_event_id: &'a BTreeMap<String, ManeuverPlanEntry>,
}

pub fn write_maneuver_plans(
    dir: &Path,
    model_version: &str,
    generated_at_utc: DateTime<Utc>,
    plans_by_event_id: &BTreeMap<String, ManeuverPlanEntry>,
) -> Result<WrittenArtifact, ArtifactError> {
    let root = ManeuverPlansRoot {
        schema_version: 1,
        artifact_type: "maneuver_plans",
        model_version,
        generated_at_utc,
        event_count: plans_by_event_id.len(),
        plans_by_event_id,
    };
    let mut bytes = serde_json::to_vec_pretty(&root)?;
    bytes.push(b'\n');
    let path = write_file(dir, "maneuver_plans.json", &bytes)?;
    Ok(WrittenArtifact { name: "maneuver_plans".to_string(), path, bytes })
}

/// Writes the manifest last, after every other artifact has landed on disk.
/// `repo_root` is stripped from each entry's path so manifest paths are
/// expressed relative to the repo root.
pub fn write_manifest(
    dir: &Path,
    repo_root: &Path,
    generated_at_utc: DateTime<Utc>,
    latest_run_id: Option<String>,
    model_version: &str,
    written: &[WrittenArtifact],
) -> Result<PathBuf, ArtifactError> {
    let mut artifacts = BTreeMap::new();
    for artifact in written {
        let relative_path = artifact
            .path
            .strip_prefix(repo_root)
            .unwrap_or(&artifact.path)
            .to_string_lossy()
            .to_string();
        artifacts.insert(
            artifact.name.clone(),
            ArtifactEntry {
                path: relative_path,
                schema_version: 1,
                model_version: model_version.to_string(),
                sha256: sha256_hex(&artifact.bytes),
                generated_at_utc,
            },
        );
    }

    let manifest = ArtifactManifest { schema_version: 1, generated_at_utc, latest_run_id, artifacts };
    let mut bytes = serde_json::to_vec_pretty(&manifest)?;
    bytes.push(b'\n');
    write_file(dir, "artifacts_latest.json", &bytes)
}
