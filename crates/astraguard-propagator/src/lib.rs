//! SGP4 grid propagation.
//!
//! Builds a uniform timeline and propagates every TLE across it, dropping
//! (not failing the run for) any object whose SGP4 record cannot be built
//! or whose propagation reports a non-zero error code or a non-finite
//! position at any grid point.

use astraguard_catalog::Tle;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PropagatorError {
    #[error("dt_s must be > 0")]
    InvalidStep,
    #[error("no objects survived propagation")]
    NoValidObjects,
}

/// `positions_km[t][n]` — timestep-major, matching spec §3's `[T, N, 3]`
/// layout with T as the outer dimension.
#[derive(Debug, Clone)]
pub struct PropagationGrid {
    pub times_utc: Vec<DateTime<Utc>>,
    pub positions_km: Vec<Vec<[f64; 3]>>,
    pub kept_norad_ids: Vec<u32>,
    pub kept_tles: Vec<Tle>,
}

impl PropagationGrid {
    pub fn object_count(&self) -> usize {
        self.kept_norad_ids.len()
    }

    pub fn timestep_count(&self) -> usize {
        self.times_utc.len()
    }
}

/// Build `t_0, t_0+dt, ..., t_0+H`, appending the exact horizon endpoint if
/// the horizon is not an integer multiple of `dt_s`.
pub fn build_timeline(
    start_utc: DateTime<Utc>,
    horizon_hours: f64,
    dt_s: i64,
) -> Result<Vec<DateTime<Utc>>, PropagatorError> {
    if dt_s <= 0 {
        return Err(PropagatorError::InvalidStep);
    }
    let total_seconds = (horizon_hours * 3600.0).round() as i64;
    let steps = total_seconds / dt_s;
    let mut times: Vec<DateTime<Utc>> = (0..=steps)
        .map(|i| start_utc + chrono::Duration::seconds(i * dt_s))
        .collect();
    let horizon_end = start_utc + chrono::Duration::seconds(total_seconds);
    if *times.last().expect("steps >= 0 guarantees at least one entry") < horizon_end {
        times.push(horizon_end);
    }
    Ok(times)
}

fn minutes_since_epoch(elements_epoch: NaiveDateTime, time: DateTime<Utc>) -> f64 {
    let epoch_utc = Utc.from_utc_datetime(&elements_epoch);
    (time - epoch_utc).num_milliseconds() as f64 / 60_000.0
}

/// Propagate one TLE across `times`, returning `None` as soon as any sample
/// reports an SGP4 error or a non-finite position (spec §4.2's per-object
/// all-or-nothing rejection rule).
pub fn propagate_track(tle: &Tle, times: &[DateTime<Utc>]) -> Option<Vec<[f64; 3]>> {
    let elements =
        sgp4::Elements::from_tle(None, tle.line1.as_bytes(), tle.line2.as_bytes()).ok()?;
    let constants = sgp4::Constants::from_elements(&elements).ok()?;
    let epoch = elements.datetime;

    let mut coords = Vec::with_capacity(times.len());
    for &time in times {
        let minutes = minutes_since_epoch(epoch, time);
        let prediction = constants.propagate(minutes).ok()?;
        let position = prediction.position;
        if position.iter().any(|v| !v.is_finite()) {
            return None;
        }
        coords.push(position);
    }
    Some(coords)
}

/// Batch-propagate a catalog over a uniform grid. The index ordering of
/// kept objects matches the order of `tles` with failing entries removed
/// (spec §5's determinism requirement).
pub fn propagate_positions(
    tles: &[Tle],
    start_utc: DateTime<Utc>,
    horizon_hours: f64,
    dt_s: i64,
) -> Result<PropagationGrid, PropagatorError> {
    let times_utc = build_timeline(start_utc, horizon_hours, dt_s)?;

    let requested = tles.len();
    let mut kept_tles = Vec::new();
    let mut kept_norad_ids = Vec::new();
    let mut per_object_positions: Vec<Vec<[f64; 3]>> = Vec::new();
    let mut skipped = 0usize;

    for tle in tles {
        match propagate_track(tle, &times_utc) {
            Some(coords) => {
                kept_norad_ids.push(tle.norad_id);
                kept_tles.push(tle.clone());
                per_object_positions.push(coords);
            }
            None => {
                skipped += 1;
                tracing::warn!(norad_id = tle.norad_id, "dropping object: SGP4 propagation failed");
            }
        }
    }

    if per_object_positions.is_empty() {
        return Err(PropagatorError::NoValidObjects);
    }

    let timestep_count = times_utc.len();
    let object_count = per_object_positions.len();
    let mut positions_km: Vec<Vec<[f64; 3]>> = Vec::with_capacity(timestep_count);
    for t in 0..timestep_count {
        let mut row = Vec::with_capacity(object_count);
        for obj in &per_object_positions {
            row.push(obj[t]);
        }
        positions_km.push(row);
    }

    tracing::info!(
        requested,
        kept = kept_tles.len(),
        skipped,
        timesteps = timestep_count,
        "propagation complete"
    );

    Ok(PropagationGrid {
        times_utc,
        positions_km,
        kept_norad_ids,
        kept_tles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn iss_tle() -> Tle {
        Tle {
            norad_id: 25544,
            name: "ISS (ZARYA)".to_string(),
            epoch_utc: "2026-01-01T00:00:00Z".to_string(),
            line1: "1 25544U 98067A   26001.50000000  .00016717  00000-0  10270-3 0  9001".to_string(),
            line2: "2 25544  51.6400 208.9163 0006703  69.9862  25.2906 15.49560000 10008".to_string(),
            source_group: "ACTIVE".to_string(),
            fetched_at_utc: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn timeline_ends_exactly_at_horizon() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let times = build_timeline(start, 1.0, 600).unwrap();
        assert_eq!(*times.last().unwrap(), start + chrono::Duration::seconds(3600));
    }

    #[test]
    fn timeline_appends_endpoint_when_not_a_multiple() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let times = build_timeline(start, 1.0, 700).unwrap();
        assert_eq!(*times.last().unwrap(), start + chrono::Duration::seconds(3600));
        // 3600/700 = 5 steps -> 5 regular samples plus the appended endpoint
        assert_eq!(times.len(), 7);
    }

    #[test]
    fn zero_step_is_rejected() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert!(build_timeline(start, 1.0, 0).is_err());
    }

    #[test]
    fn propagates_a_real_tle_to_finite_positions() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let grid = propagate_positions(&[iss_tle()], start, 1.0, 600).unwrap();
        assert_eq!(grid.object_count(), 1);
        for row in &grid.positions_km {
            for coord in &row[0] {
                assert!(coord.is_finite());
            }
        }
    }

    #[test]
    fn invalid_tle_is_dropped_not_fatal() {
        let mut bad = iss_tle();
        bad.line1 = "garbage".to_string();
        bad.line2 = "garbage".to_string();
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let err = propagate_positions(&[bad], start, 1.0, 600).unwrap_err();
        assert!(matches!(err, PropagatorError::NoValidObjects));
    }
}
