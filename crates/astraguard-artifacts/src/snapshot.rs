//! Downsampled, ECEF-rotated position snapshot for visualization collaborators.

use astraguard_catalog::Tle;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::gmst::{gmst_radians, rotate_eci_to_ecef};

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotMeta {
    pub native_dt_s: i64,
    pub export_dt_s: i64,
    pub downsample_step: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectTrack {
    pub object_index: usize,
    pub norad_id: u32,
    pub name: String,
    pub source_group: String,
    pub positions_ecef_m: Vec<[f64; 3]>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CesiumSnapshot {
    pub schema_version: u32,
    pub artifact_type: &'static str,
    pub frame: &'static str,
    pub units: &'static str,
    pub model_version: String,
    pub generated_at_utc: DateTime<Utc>,
    pub times_utc: Vec<DateTime<Utc>>,
    pub meta: SnapshotMeta,
    pub notes: &'static str,
    pub objects: Vec<ObjectTrack>,
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

/// Builds the snapshot over the objects named by `object_indices`, downsampled
/// by `downsample_step` and rotated from TEME/ECI to an ECEF approximation.
pub fn build_snapshot(
    times_utc: &[DateTime<Utc>],
    positions_km: &[Vec<[f64; 3]>],
    valid_tles: &[Tle],
    native_dt_s: i64,
    downsample_step: usize,
    object_indices: &[usize],
    generated_at_utc: DateTime<Utc>,
    model_version: &str,
) -> CesiumSnapshot {
    let step = downsample_step.max(1);
    let ds_time_indices: Vec<usize> = (0..times_utc.len()).step_by(step).collect();
    let times_ds: Vec<DateTime<Utc>> = ds_time_indices.iter().map(|&i| times_utc[i]).collect();

    let objects = object_indices
        .iter()
        .map(|&obj_idx| {
            let positions_ecef_m = ds_time_indices
                .iter()
                .map(|&t_idx| {
                    let theta = gmst_radians(times_utc[t_idx]);
                    let ecef_km = rotate_eci_to_ecef(positions_km[t_idx][obj_idx], theta);
                    [round3(ecef_km[0] * 1000.0), round3(ecef_km[1] * 1000.0), round3(ecef_km[2] * 1000.0)]
                })
                .collect();
            ObjectTrack {
                object_index: obj_idx,
                norad_id: valid_tles[obj_idx].norad_id,
                name: valid_tles[obj_idx].name.clone(),
                source_group: valid_tles[obj_idx].source_group.clone(),
                positions_ecef_m,
            }
        })
        .collect();

    CesiumSnapshot {
        schema_version: 1,
        artifact_type: "cesium_snapshot",
        frame: "ECEF",
        units: "meters",
        model_version: model_version.to_string(),
        generated_at_utc,
        times_utc: times_ds,
        meta: SnapshotMeta {
            native_dt_s,
            export_dt_s: native_dt_s * step as i64,
            downsample_step: step,
        },
        notes: "Approximate ECI->ECEF using GMST z-rotation for visualization.",
        objects,
    }
}

impl CesiumSnapshot {
    /// Timeline index nearest `target`, used to populate `tca_index_snapshot`.
    pub fn nearest_time_index(&self, target: DateTime<Utc>) -> Option<usize> {
        self.times_utc
            .iter()
            .enumerate()
            .min_by_key(|(_, t)| (**t - target).num_milliseconds().abs())
            .map(|(idx, _)| idx)
    }

    pub fn has_norad_id(&self, norad_id: u32) -> bool {
        self.objects.iter().any(|o| o.norad_id == norad_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn tle(norad_id: u32) -> Tle {
        Tle {
            norad_id,
            name: format!("SAT-{norad_id}"),
            epoch_utc: "2026-01-01T00:00:00Z".to_string(),
            line1: String::new(),
            line2: String::new(),
            source_group: "ACTIVE".to_string(),
            fetched_at_utc: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn snapshot_downsamples_the_timeline() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let times: Vec<_> = (0..9).map(|i| start + Duration::seconds(i * 600)).collect();
        let positions = vec![vec![[7000.0, 0.0, 0.0]]; 9];
        let tles = vec![tle(100)];
        let snapshot = build_snapshot(&times, &positions, &tles, 600, 3, &[0], start, "v1");
        assert_eq!(snapshot.times_utc.len(), 3);
        assert_eq!(snapshot.meta.export_dt_s, 1800);
    }

    #[test]
    fn nearest_time_index_finds_closest_sample() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let times: Vec<_> = (0..5).map(|i| start + Duration::seconds(i * 600)).collect();
        let positions = vec![vec![[7000.0, 0.0, 0.0]]; 5];
        let tles = vec![tle(100)];
        let snapshot = build_snapshot(&times, &positions, &tles, 600, 1, &[0], start, "v1");
        let idx = snapshot.nearest_time_index(start + Duration::seconds(650)).unwrap();
        assert_eq!(idx, 1);
    }

    #[test]
    fn positions_are_rounded_to_three_decimals() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let times = vec![start];
        let positions = vec![vec![[7000.123456789, 0.0, 0.0]]];
        let tles = vec![tle(100)];
        let snapshot = build_snapshot(&times, &positions, &tles, 600, 1, &[0], start, "v1");
        let x = snapshot.objects[0].positions_ecef_m[0][0];
        assert_eq!(x, (x * 1000.0).round() / 1000.0);
    }
}
