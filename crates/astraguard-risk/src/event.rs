//! Canonicalized, scored conjunction events ready for ranking and trend-gating.

use astraguard_screening::RefinedEvent;
use serde::Serialize;

use crate::pc::pc_assumed_encounter_isotropic;
use crate::sigma::sigma_pair_m;

pub const MODEL_VERSION: &str = "astraguard-assumed-covariance-v1";

/// Which primary/secondary group combinations are scored at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairTypeFilter {
    AdmitAll,
    ActiveVsActiveOrDebris,
}

impl Default for PairTypeFilter {
    fn default() -> Self {
        PairTypeFilter::ActiveVsActiveOrDebris
    }
}

fn is_active(group: &str) -> bool {
    group.to_uppercase() == "ACTIVE"
}

fn is_debris(group: &str) -> bool {
    group.to_uppercase().contains("DEBRIS")
}

fn pair_type_admitted(primary_group: &str, secondary_group: &str, filter: PairTypeFilter) -> bool {
    match filter {
        PairTypeFilter::AdmitAll => true,
        PairTypeFilter::ActiveVsActiveOrDebris => {
            (is_active(primary_group) && is_active(secondary_group))
                || (is_active(primary_group) && is_debris(secondary_group))
                || (is_debris(primary_group) && is_active(secondary_group))
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Assumptions {
    pub dt_s: i64,
    pub dt_refine_s: i64,
    pub horizon_hours: f64,
    pub hard_body_radius_m: f64,
    pub sigma_payload_m: f64,
    pub sigma_debris_m: f64,
    pub voxel_km: f64,
    pub catalog_groups_used: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConjunctionEvent {
    pub schema_version: u32,
    pub event_id: String,
    pub primary_id: u32,
    pub secondary_id: u32,
    pub tca_utc: String,
    pub tca_index_snapshot: Option<usize>,
    pub miss_distance_m: f64,
    pub relative_speed_mps: f64,
    pub pc_assumed: f64,
    pub risk_score: f64,
    pub window_start_utc: String,
    pub window_end_utc: String,
    pub model_version: String,
    pub assumptions: Assumptions,
}

fn tca_iso(refined: &RefinedEvent) -> String {
    refined.tca_utc.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Canonicalizes a RefinedEvent (primary_id < secondary_id), applies the
/// pair-type admission policy, and scores it into a ConjunctionEvent.
/// Returns `None` if the pair type is rejected by `filter`.
pub fn build_conjunction_event(
    refined: &RefinedEvent,
    sigma_payload_m: f64,
    sigma_debris_m: f64,
    hard_body_radius_m: f64,
    filter: PairTypeFilter,
    assumptions: Assumptions,
) -> Option<ConjunctionEvent> {
    let (mut primary_id, mut secondary_id) = (refined.primary_id, refined.secondary_id);
    let (mut primary_group, mut secondary_group) = (
        refined.primary_group.to_uppercase(),
        refined.secondary_group.to_uppercase(),
    );
    if secondary_id < primary_id {
        std::mem::swap(&mut primary_id, &mut secondary_id);
        std::mem::swap(&mut primary_group, &mut secondary_group);
    }

    if !pair_type_admitted(&primary_group, &secondary_group, filter) {
        return None;
    }

    let sigma_pair = sigma_pair_m(&primary_group, &secondary_group, sigma_payload_m, sigma_debris_m);
    let pc = pc_assumed_encounter_isotropic(refined.miss_m, sigma_pair, hard_body_radius_m, 400);

    let tca_iso = tca_iso(refined);
    let event_id = format!("EVT-{primary_id}-{secondary_id}-{tca_iso}");

    Some(ConjunctionEvent {
        schema_version: 1,
        event_id,
        primary_id,
        secondary_id,
        tca_utc: tca_iso,
        tca_index_snapshot: None,
        miss_distance_m: refined.miss_m,
        relative_speed_mps: refined.rel_speed_mps,
        pc_assumed: pc,
        risk_score: pc,
        window_start_utc: refined.window_start_utc.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        window_end_utc: refined.window_end_utc.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        model_version: MODEL_VERSION.to_string(),
        assumptions,
    })
}

/// Total order: `(-risk_score, miss_distance_m)`, ties broken by `event_id`.
pub fn rank_events(mut events: Vec<ConjunctionEvent>) -> Vec<ConjunctionEvent> {
    events.sort_by(|a, b| {
        b.risk_score
            .partial_cmp(&a.risk_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.miss_distance_m.partial_cmp(&b.miss_distance_m).unwrap_or(std::cmp::Ordering::Equal))
            .then_with(|| a.event_id.cmp(&b.event_id))
    });
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn refined(primary_id: u32, secondary_id: u32, primary_group: &str, secondary_group: &str, miss_m: f64) -> RefinedEvent {
        let t = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        RefinedEvent {
            primary_id,
            secondary_id,
            primary_group: primary_group.to_string(),
            secondary_group: secondary_group.to_string(),
            tca_utc: t,
            miss_m,
            rel_speed_mps: 1000.0,
            window_start_utc: t,
            window_end_utc: t,
        }
    }

    fn assumptions() -> Assumptions {
        Assumptions {
            dt_s: 60,
            dt_refine_s: 5,
            horizon_hours: 72.0,
            hard_body_radius_m: 25.0,
            sigma_payload_m: 50.0,
            sigma_debris_m: 200.0,
            voxel_km: 50.0,
            catalog_groups_used: vec!["ACTIVE".to_string()],
        }
    }

    #[test]
    fn canonicalizes_pair_so_primary_is_smaller() {
        let r = refined(200, 100, "ACTIVE", "DEBRIS", 10.0);
        let event = build_conjunction_event(&r, 50.0, 200.0, 25.0, PairTypeFilter::AdmitAll, assumptions()).unwrap();
        assert_eq!(event.primary_id, 100);
        assert_eq!(event.secondary_id, 200);
    }

    #[test]
    fn event_id_follows_evt_format() {
        let r = refined(100, 200, "ACTIVE", "ACTIVE", 10.0);
        let event = build_conjunction_event(&r, 50.0, 200.0, 25.0, PairTypeFilter::AdmitAll, assumptions()).unwrap();
        assert_eq!(event.event_id, "EVT-100-200-2026-01-01T00:00:00Z");
    }

    #[test]
    fn debris_vs_debris_is_rejected_by_default_policy() {
        let r = refined(100, 200, "DEBRIS", "DEBRIS", 10.0);
        assert!(build_conjunction_event(&r, 50.0, 200.0, 25.0, PairTypeFilter::ActiveVsActiveOrDebris, assumptions()).is_none());
    }

    #[test]
    fn active_vs_debris_is_admitted_by_default_policy() {
        let r = refined(100, 200, "ACTIVE", "DEBRIS", 10.0);
        assert!(build_conjunction_event(&r, 50.0, 200.0, 25.0, PairTypeFilter::ActiveVsActiveOrDebris, assumptions()).is_some());
    }

    #[test]
    fn risk_score_equals_pc_assumed() {
        let r = refined(100, 200, "ACTIVE", "ACTIVE", 10.0);
        let event = build_conjunction_event(&r, 50.0, 200.0, 25.0, PairTypeFilter::AdmitAll, assumptions()).unwrap();
        assert_eq!(event.risk_score, event.pc_assumed);
        assert!((0.0..=1.0).contains(&event.risk_score));
    }

    #[test]
    fn rank_orders_by_risk_then_miss_distance() {
        let a = build_conjunction_event(&refined(1, 2, "ACTIVE", "ACTIVE", 5.0), 50.0, 200.0, 25.0, PairTypeFilter::AdmitAll, assumptions()).unwrap();
        let b = build_conjunction_event(&refined(3, 4, "ACTIVE", "ACTIVE", 500.0), 50.0, 200.0, 25.0, PairTypeFilter::AdmitAll, assumptions()).unwrap();
        let ranked = rank_events(vec![b, a]);
        assert_eq!(ranked[0].miss_distance_m, 5.0);
    }
}
