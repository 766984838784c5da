//! Aggregated configuration for a single screening run.

use std::path::PathBuf;

use astraguard_maneuver::ManeuverPolicy;
use astraguard_risk::PairTypeFilter;
use astraguard_trend::TrendConfig;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    pub downsample_step: usize,
    pub balanced: bool,
    pub snapshot_active: usize,
    pub snapshot_debris: usize,
    pub snapshot_max: usize,
}

#[derive(Debug, Clone)]
pub struct ScreeningConfig {
    pub catalog_path: PathBuf,
    pub start_utc: Option<DateTime<Utc>>,
    pub groups: Vec<String>,
    pub max_objects: usize,
    pub horizon_hours: f64,
    pub dt_s: i64,
    pub dt_refine_s: i64,
    pub voxel_km: f64,
    pub hard_body_radius_m: f64,
    pub sigma_payload_m: f64,
    pub sigma_debris_m: f64,
    pub pair_type_filter: PairTypeFilter,
    pub top_k: usize,
    pub seed: u64,
    pub snapshot: SnapshotConfig,
    pub trend: TrendConfig,
    pub maneuver_policy: ManeuverPolicy,
    pub output_dir: PathBuf,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        ScreeningConfig {
            catalog_path: PathBuf::from("data/catalog.json"),
            start_utc: None,
            groups: vec![
                "ACTIVE".to_string(),
                "COSMOS-1408-DEBRIS".to_string(),
                "FENGYUN-1C-DEBRIS".to_string(),
                "IRIDIUM-33-DEBRIS".to_string(),
                "COSMOS-2251-DEBRIS".to_string(),
            ],
            max_objects: 3000,
            horizon_hours: 72.0,
            dt_s: 600,
            dt_refine_s: 60,
            voxel_km: 50.0,
            hard_body_radius_m: 25.0,
            sigma_payload_m: 200.0,
            sigma_debris_m: 500.0,
            pair_type_filter: PairTypeFilter::ActiveVsActiveOrDebris,
            top_k: 20,
            seed: 42,
            snapshot: SnapshotConfig {
                downsample_step: 3,
                balanced: false,
                snapshot_active: 200,
                snapshot_debris: 200,
                snapshot_max: 500,
            },
            trend: TrendConfig::default(),
            maneuver_policy: ManeuverPolicy::default(),
            output_dir: PathBuf::from("data/processed"),
        }
    }
}
