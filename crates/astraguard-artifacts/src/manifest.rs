//! SHA-256 content manifest covering every artifact written by a run.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Serialize)]
pub struct ArtifactEntry {
    pub path: String,
    pub schema_version: u32,
    pub model_version: String,
    pub sha256: String,
    pub generated_at_utc: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtifactManifest {
    pub schema_version: u32,
    pub generated_at_utc: DateTime<Utc>,
    pub latest_run_id: Option<String>,
    pub artifacts: BTreeMap<String, ArtifactEntry>,
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
