//! Local TCA refinement: given coarse candidate pairs, find the
//! minimum-distance instant on a fine timeline around the coarse minimum.

use std::collections::HashMap;

use astraguard_catalog::Tle;
use astraguard_propagator::propagate_track;
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone)]
pub struct RefinedEvent {
    pub primary_id: u32,
    pub secondary_id: u32,
    pub primary_group: String,
    pub secondary_group: String,
    pub tca_utc: DateTime<Utc>,
    pub miss_m: f64,
    pub rel_speed_mps: f64,
    pub window_start_utc: DateTime<Utc>,
    pub window_end_utc: DateTime<Utc>,
}

fn distance_m(a: [f64; 3], b: [f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    (dx * dx + dy * dy + dz * dz).sqrt() * 1000.0
}

fn relative_speed_mps(pos_i: &[[f64; 3]], pos_j: &[[f64; 3]], idx: usize, dt_refine_s: i64) -> f64 {
    let n = pos_i.len();
    if n < 2 {
        return 0.0;
    }
    let rel = |k: usize| -> [f64; 3] {
        [
            (pos_i[k][0] - pos_j[k][0]) * 1000.0,
            (pos_i[k][1] - pos_j[k][1]) * 1000.0,
            (pos_i[k][2] - pos_j[k][2]) * 1000.0,
        ]
    };
    let norm = |v: [f64; 3]| -> f64 { (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt() };
    let dt = dt_refine_s as f64;

    if idx > 0 && idx < n - 1 {
        let a = rel(idx + 1);
        let b = rel(idx - 1);
        norm([a[0] - b[0], a[1] - b[1], a[2] - b[2]]) / (2.0 * dt)
    } else if idx == 0 {
        let a = rel(1);
        let b = rel(0);
        norm([a[0] - b[0], a[1] - b[1], a[2] - b[2]]) / dt
    } else {
        let a = rel(n - 1);
        let b = rel(n - 2);
        norm([a[0] - b[0], a[1] - b[1], a[2] - b[2]]) / dt
    }
}

fn build_refine_timeline(t_start: DateTime<Utc>, t_end: DateTime<Utc>, dt_refine_s: i64) -> Vec<DateTime<Utc>> {
    let mut times = Vec::new();
    let mut cursor = t_start;
    while cursor <= t_end {
        times.push(cursor);
        cursor += Duration::seconds(dt_refine_s);
    }
    if *times.last().expect("t_start <= t_end guarantees at least one entry") < t_end {
        times.push(t_end);
    }
    times
}

/// Fold the coarse candidate stream into refined per-pair events.
///
/// `candidate_stream` is consumed lazily: only the minimum coarse distance
/// and its timestep are retained per pair, never the full candidate set.
pub fn find_refined_conjunctions(
    valid_tles: &[Tle],
    norad_ids: &[u32],
    times_utc: &[DateTime<Utc>],
    positions_km: &[Vec<[f64; 3]>],
    candidate_stream: impl Iterator<Item = (usize, Vec<(usize, usize)>)>,
    dt_refine_s: i64,
    refine_half_window_steps: usize,
) -> Vec<RefinedEvent> {
    let mut best_by_pair: HashMap<(usize, usize), (f64, usize)> = HashMap::new();

    for (t_idx, pairs) in candidate_stream {
        for (i, j) in pairs {
            let dist_m = distance_m(positions_km[t_idx][i], positions_km[t_idx][j]);
            best_by_pair
                .entry((i, j))
                .and_modify(|entry| {
                    if dist_m < entry.0 {
                        *entry = (dist_m, t_idx);
                    }
                })
                .or_insert((dist_m, t_idx));
        }
    }

    tracing::info!(
        unique_pairs = best_by_pair.len(),
        "unique candidate pairs selected for refinement"
    );

    let time_count = times_utc.len();
    let mut refined_events = Vec::new();
    let mut refine_failures = 0usize;

    let mut pairs: Vec<_> = best_by_pair.into_iter().collect();
    pairs.sort_by_key(|(pair, _)| *pair);

    for ((i, j), (_, coarse_idx)) in pairs {
        let i0 = coarse_idx.saturating_sub(refine_half_window_steps);
        let i1 = (coarse_idx + refine_half_window_steps).min(time_count - 1);
        let t_start = times_utc[i0];
        let t_end = times_utc[i1];

        let refine_times = build_refine_timeline(t_start, t_end, dt_refine_s);

        let (Some(pos_i), Some(pos_j)) = (
            propagate_track(&valid_tles[i], &refine_times),
            propagate_track(&valid_tles[j], &refine_times),
        ) else {
            refine_failures += 1;
            continue;
        };

        let min_idx = (0..refine_times.len())
            .min_by(|&a, &b| {
                distance_m(pos_i[a], pos_j[a])
                    .partial_cmp(&distance_m(pos_i[b], pos_j[b]))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .expect("refine_times is non-empty");

        let miss_m = distance_m(pos_i[min_idx], pos_j[min_idx]);
        let rel_speed_mps = relative_speed_mps(&pos_i, &pos_j, min_idx, dt_refine_s);

        refined_events.push(RefinedEvent {
            primary_id: norad_ids[i],
            secondary_id: norad_ids[j],
            primary_group: valid_tles[i].source_group.clone(),
            secondary_group: valid_tles[j].source_group.clone(),
            tca_utc: refine_times[min_idx],
            miss_m,
            rel_speed_mps,
            window_start_utc: t_start,
            window_end_utc: t_end,
        });
    }

    if refine_failures > 0 {
        tracing::warn!(refine_failures, "refinement propagation failures dropped");
    }
    tracing::info!(count = refined_events.len(), "refined conjunction events produced");

    refined_events
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
    fn refine_timeline_covers_window_and_appends_endpoint() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let end = start + Duration::seconds(125);
        let times = build_refine_timeline(start, end, 60);
        assert_eq!(*times.last().unwrap(), end);
        assert_eq!(times[0], start);
    }

    #[test]
    fn refines_a_self_pair_to_near_zero_miss() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let times_utc = vec![start, start + Duration::seconds(600)];
        let tle_a = iss_tle(100);
        let tle_b = iss_tle(200);
        let positions_km = vec![
            vec![[7000.0, 0.0, 0.0], [7000.0, 0.0, 0.0]],
            vec![[7000.0, 0.0, 0.0], [7000.0, 0.0, 0.0]],
        ];
        let norad_ids = vec![100u32, 200u32];
        let tles = vec![tle_a, tle_b];
        let stream = vec![(0usize, vec![(0usize, 1usize)])].into_iter();

        let events = find_refined_conjunctions(&tles, &norad_ids, &times_utc, &positions_km, stream, 60, 1);
        assert_eq!(events.len(), 1);
        assert!(events[0].miss_m < 1.0);
        assert_eq!(events[0].primary_id, 100);
        assert_eq!(events[0].secondary_id, 200);
    }
}
