//! Local Pc time series construction around a conjunction's TCA.

use astraguard_catalog::Tle;
use astraguard_propagator::propagate_track;
use astraguard_risk::{pc_assumed_encounter_isotropic, sigma_pair_effective_m, sigma_pair_m};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::config::{CovModel, TrendConfig};

#[derive(Debug, Clone, Serialize)]
pub struct TrendSample {
    pub t_utc: DateTime<Utc>,
    pub miss_m: f64,
    pub pc: f64,
}

fn build_sample_times(tca_utc: DateTime<Utc>, window_minutes: u32, cadence_seconds: u32) -> Vec<DateTime<Utc>> {
    let half_window_s = (window_minutes as i64) * 60;
    let cadence_s = (cadence_seconds as i64).max(1);

    let mut times = Vec::new();
    let mut offset = -half_window_s;
    while offset <= half_window_s {
        times.push(tca_utc + Duration::seconds(offset));
        offset += cadence_s;
    }
    if times.is_empty() {
        times.push(tca_utc);
    }
    let window_end = tca_utc + Duration::seconds(half_window_s);
    if *times.last().unwrap() != window_end {
        times.push(window_end);
    }
    times
}

fn sigma_pair_for_time(primary_group: &str, secondary_group: &str, delta_t_s: f64, config: &TrendConfig) -> f64 {
    match config.cov_model {
        CovModel::Legacy => sigma_pair_m(primary_group, secondary_group, config.sigma_payload_m, config.sigma_debris_m),
        CovModel::AnisotropicRtn => {
            sigma_pair_effective_m(primary_group, secondary_group, delta_t_s, &config.rtn_bases)
        }
    }
}

/// Builds the local Pc series for a single pair around `tca_utc`. Returns an
/// empty series if either object fails to propagate across the window.
pub fn build_local_pc_series(
    tca_utc: DateTime<Utc>,
    primary: &Tle,
    secondary: &Tle,
    primary_group: &str,
    secondary_group: &str,
    config: &TrendConfig,
) -> Vec<TrendSample> {
    let times_utc = build_sample_times(tca_utc, config.window_minutes, config.cadence_seconds);

    let (Some(primary_pos), Some(secondary_pos)) =
        (propagate_track(primary, &times_utc), propagate_track(secondary, &times_utc))
    else {
        return Vec::new();
    };

    times_utc
        .iter()
        .zip(primary_pos.iter().zip(secondary_pos.iter()))
        .map(|(&t, (p, s))| {
            let rel = [p[0] - s[0], p[1] - s[1], p[2] - s[2]];
            let miss_m = (rel[0] * rel[0] + rel[1] * rel[1] + rel[2] * rel[2]).sqrt() * 1000.0;
            let delta_t_s = (t - tca_utc).num_milliseconds() as f64 / 1000.0;
            let sigma_pair = sigma_pair_for_time(primary_group, secondary_group, delta_t_s, config);
            let pc = pc_assumed_encounter_isotropic(miss_m, sigma_pair, config.hard_body_radius_m, 400);
            TrendSample { t_utc: t, miss_m, pc }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn iss_tle(norad_id: u32) -> Tle {
        Tle {
            norad_id,
            name: "ISS (ZARYA)".to_string(),
            epoch_utc: "2026-01-01T00:00:00Z".to_string(),
            line1: "1 25544U 98067A   26001.50000000  .00016717  00000-0  10270-3 0  9001".to_string(),
            line2: "2 25544  51.6400 208.9163 0006703  69.9862  25.2906 15.49560000 10008".to_string(),
            source_group: "ACTIVE".to_string(),
            fetched_at_utc: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn sample_times_are_symmetric_around_tca() {
        let tca = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let times = build_sample_times(tca, 5, 60);
        assert_eq!(times[0], tca - Duration::seconds(300));
        assert_eq!(*times.last().unwrap(), tca + Duration::seconds(300));
    }

    #[test]
    fn series_has_one_sample_per_cadence_step() {
        let tca = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let config = TrendConfig {
            window_minutes: 2,
            cadence_seconds: 60,
            ..TrendConfig::default()
        };
        let series = build_local_pc_series(tca, &iss_tle(100), &iss_tle(200), "ACTIVE", "ACTIVE", &config);
        assert_eq!(series.len(), 5);
        for sample in &series {
            assert!(sample.pc.is_finite());
            assert!(sample.miss_m.is_finite());
        }
    }
}
