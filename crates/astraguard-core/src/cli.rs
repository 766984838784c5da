//! Command-line surface for the `astraguard-screen` binary.

use std::path::PathBuf;

use astraguard_maneuver::ManeuverPolicy;
use astraguard_risk::PairTypeFilter;
use astraguard_trend::{CovModel, TrendConfig};
use chrono::{DateTime, Utc};
use clap::Parser;

use crate::config::{ScreeningConfig, SnapshotConfig};

#[derive(Parser, Debug)]
#[command(name = "astraguard-screen", about = "Conjunction screening and maneuver-planning pipeline")]
pub struct Args {
    /// Path to the JSON catalog file
    #[arg(long, default_value = "data/catalog.json")]
    pub db: PathBuf,

    /// Pinned screening start time, ISO-8601 UTC (default: wall clock)
    #[arg(long)]
    pub start_utc: Option<String>,

    /// Comma-separated catalog groups to screen
    #[arg(long, value_delimiter = ',', default_value = "ACTIVE,COSMOS-1408-DEBRIS,FENGYUN-1C-DEBRIS,IRIDIUM-33-DEBRIS,COSMOS-2251-DEBRIS")]
    pub groups: Vec<String>,

    /// Maximum number of objects to carry through the pipeline
    #[arg(long, default_value_t = 3000)]
    pub max_objects: usize,

    /// Propagation horizon, in hours
    #[arg(long, default_value_t = 72.0)]
    pub horizon_hours: f64,

    /// Coarse propagation step, in seconds
    #[arg(long, default_value_t = 600)]
    pub dt: i64,

    /// Fine TCA-refinement step, in seconds
    #[arg(long, default_value_t = 60)]
    pub dt_refine: i64,

    /// Voxel edge length for broad-phase candidate culling, in km
    #[arg(long, default_value_t = 50.0)]
    pub voxel_km: f64,

    /// Hard-body radius, in meters
    #[arg(long, default_value_t = 25.0)]
    pub hbr_m: f64,

    /// Isotropic payload position sigma, in meters
    #[arg(long, default_value_t = 200.0)]
    pub sigma_payload_m: f64,

    /// Isotropic debris position sigma, in meters
    #[arg(long, default_value_t = 500.0)]
    pub sigma_debris_m: f64,

    /// Number of ranked events to carry into trend/maneuver evaluation
    #[arg(long, default_value_t = 20)]
    pub top_k: usize,

    /// Seed for balanced-sampling RNG (numeric results are seed-independent)
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Snapshot timeline downsample stride
    #[arg(long, default_value_t = 3)]
    pub snapshot_downsample: usize,

    /// Use balanced ACTIVE/non-ACTIVE sampling for the snapshot object set
    #[arg(long = "snapshot-balanced", default_value_t = false)]
    pub snapshot_balanced: bool,

    /// Disables balanced snapshot sampling (overrides --snapshot-balanced)
    #[arg(long = "no-snapshot-balanced", default_value_t = false)]
    pub no_snapshot_balanced: bool,

    /// Target ACTIVE object count in a balanced snapshot
    #[arg(long, default_value_t = 200)]
    pub snapshot_active: usize,

    /// Target debris object count in a balanced snapshot
    #[arg(long, default_value_t = 200)]
    pub snapshot_debris: usize,

    /// Hard cap on total snapshot object count
    #[arg(long, default_value_t = 500)]
    pub snapshot_max: usize,

    /// Local Pc series half-window, in minutes
    #[arg(long, default_value_t = 30)]
    pub trend_window_minutes: u32,

    /// Local Pc series sampling cadence, in seconds
    #[arg(long, default_value_t = 60)]
    pub trend_cadence_seconds: u32,

    /// Minimum peak Pc to leave the IGNORE bucket
    #[arg(long, default_value_t = 1e-5)]
    pub trend_threshold: f64,

    /// Hours before TCA beyond which far-out risk is deferred
    #[arg(long, default_value_t = 24.0)]
    pub trend_defer_hours: f64,

    /// Peak Pc above which the far-from-TCA defer is overridden
    #[arg(long, default_value_t = 1e-3)]
    pub trend_critical_override: f64,

    /// Maximum allowed maneuver delta-v, in m/s
    #[arg(long, default_value_t = 0.5)]
    pub max_delta_v_mps: f64,

    /// Comma-separated candidate burn lead times before TCA, in hours
    #[arg(long, value_delimiter = ',', default_value = "24,12,6,2")]
    pub candidate_burn_offsets_h: Vec<f64>,

    /// Late baseline burn lead time before TCA, in minutes
    #[arg(long, default_value_t = 30.0)]
    pub late_burn_minutes: f64,

    /// Target post-burn miss distance, in meters
    #[arg(long, default_value_t = 1000.0)]
    pub miss_distance_target_m: f64,

    /// Directory artifacts are written to
    #[arg(long, default_value = "data/processed")]
    pub output_dir: PathBuf,

    /// Verbose (debug-level) logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn parsed_start_utc(&self) -> Result<Option<DateTime<Utc>>, String> {
        match &self.start_utc {
            None => Ok(None),
            Some(raw) => DateTime::parse_from_rfc3339(raw)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(|err| format!("invalid --start-utc '{raw}': {err}")),
        }
    }

    pub fn into_screening_config(self) -> Result<ScreeningConfig, String> {
        let start_utc = self.parsed_start_utc()?;
        let snapshot_balanced = self.snapshot_balanced && !self.no_snapshot_balanced;

        Ok(ScreeningConfig {
            catalog_path: self.db,
            start_utc,
            groups: self.groups,
            max_objects: self.max_objects,
            horizon_hours: self.horizon_hours,
            dt_s: self.dt,
            dt_refine_s: self.dt_refine,
            voxel_km: self.voxel_km,
            hard_body_radius_m: self.hbr_m,
            sigma_payload_m: self.sigma_payload_m,
            sigma_debris_m: self.sigma_debris_m,
            pair_type_filter: PairTypeFilter::default(),
            top_k: self.top_k,
            seed: self.seed,
            snapshot: SnapshotConfig {
                downsample_step: self.snapshot_downsample,
                balanced: snapshot_balanced,
                snapshot_active: self.snapshot_active,
                snapshot_debris: self.snapshot_debris,
                snapshot_max: self.snapshot_max,
            },
            trend: TrendConfig {
                window_minutes: self.trend_window_minutes,
                cadence_seconds: self.trend_cadence_seconds,
                threshold: self.trend_threshold,
                defer_hours: self.trend_defer_hours,
                critical_override: self.trend_critical_override,
                cov_model: CovModel::AnisotropicRtn,
                hard_body_radius_m: self.hbr_m,
                sigma_payload_m: self.sigma_payload_m,
                sigma_debris_m: self.sigma_debris_m,
                ..TrendConfig::default()
            },
            maneuver_policy: ManeuverPolicy {
                miss_distance_target_m: self.miss_distance_target_m,
                max_delta_v_mps: self.max_delta_v_mps,
                candidate_offsets_h: self.candidate_burn_offsets_h,
                late_burn_minutes: self.late_burn_minutes,
                hard_body_radius_m: self.hbr_m,
            },
            output_dir: self.output_dir,
        })
    }
}
