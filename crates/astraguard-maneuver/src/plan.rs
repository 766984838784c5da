//! Timing x RTN-direction grid search for the minimum feasible delta-v.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::policy::{effective_target_miss_m, ManeuverPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RtnDirection {
    PlusT,
    MinusT,
    PlusR,
    MinusR,
    PlusN,
    MinusN,
}

impl RtnDirection {
    const ALL: [RtnDirection; 6] = [
        RtnDirection::PlusT,
        RtnDirection::MinusT,
        RtnDirection::PlusR,
        RtnDirection::MinusR,
        RtnDirection::PlusN,
        RtnDirection::MinusN,
    ];

    /// Encounter-plane separation gain per unit delta-v and lead time.
    /// Along-track burns are far more efficient than radial/normal ones.
    fn gain(self) -> f64 {
        match self {
            RtnDirection::PlusT | RtnDirection::MinusT => 1.0,
            RtnDirection::PlusR | RtnDirection::MinusR | RtnDirection::PlusN | RtnDirection::MinusN => 0.3,
        }
    }
}

impl fmt::Display for RtnDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RtnDirection::PlusT => "+T",
            RtnDirection::MinusT => "-T",
            RtnDirection::PlusR => "+R",
            RtnDirection::MinusR => "-R",
            RtnDirection::PlusN => "+N",
            RtnDirection::MinusN => "-N",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Feasibility {
    Feasible,
    Infeasible,
}

#[derive(Debug, Clone, Serialize)]
pub struct LateBaseline {
    pub burn_time_utc: DateTime<Utc>,
    pub direction: RtnDirection,
    pub delta_v_mps: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManeuverPlan {
    pub burn_time_utc: Option<DateTime<Utc>>,
    pub frame: &'static str,
    pub direction: Option<RtnDirection>,
    pub delta_v_mps: Option<f64>,
    pub expected_miss_m: f64,
    pub feasibility: Feasibility,
    pub early_vs_late_ratio: Option<f64>,
    pub notes: &'static str,
    pub current_miss_m: f64,
    pub target_miss_m: f64,
    pub late_baseline: LateBaseline,
}

struct Candidate {
    burn_time_utc: DateTime<Utc>,
    direction: RtnDirection,
    delta_v_mps: f64,
    expected_miss_m: f64,
    feasible: bool,
    lead_time_s: f64,
}

fn required_delta_v(gap_m: f64, lead_time_s: f64, gain: f64) -> Option<f64> {
    if lead_time_s <= 0.0 || gain <= 0.0 {
        return None;
    }
    if gap_m <= 0.0 {
        return Some(0.0);
    }
    Some(gap_m / (lead_time_s * gain))
}

fn expected_miss(current_miss_m: f64, delta_v_mps: f64, lead_time_s: f64, gain: f64) -> f64 {
    let delta_m = delta_v_mps * lead_time_s * gain;
    current_miss_m + delta_m.max(0.0)
}

/// Searches the timing x RTN-direction grid for the minimum-delta-v
/// feasible burn that reaches the target miss distance before `tca_utc`.
pub fn plan_min_delta_v(tca_utc: DateTime<Utc>, current_miss_m: f64, policy: &ManeuverPolicy) -> ManeuverPlan {
    let target_m = effective_target_miss_m(policy.miss_distance_target_m, policy.hard_body_radius_m);
    let gap_m = (target_m - current_miss_m).max(0.0);
    let max_delta_v = policy.max_delta_v_mps.max(0.0);

    let mut offsets_h: Vec<f64> = policy.candidate_offsets_h.clone();
    offsets_h.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut candidates = Vec::with_capacity(offsets_h.len() * RtnDirection::ALL.len());
    for offset_h in offsets_h {
        let burn_time_utc = tca_utc - Duration::milliseconds((offset_h * 3_600_000.0) as i64);
        let lead_time_s = (tca_utc - burn_time_utc).num_milliseconds() as f64 / 1000.0;
        for direction in RtnDirection::ALL {
            let delta_v_req = required_delta_v(gap_m, lead_time_s, direction.gain());
            let feasible = delta_v_req.is_some_and(|v| v <= max_delta_v);
            let delta_v_mps = delta_v_req.unwrap_or(max_delta_v + 1.0);
            candidates.push(Candidate {
                burn_time_utc,
                direction,
                delta_v_mps,
                expected_miss_m: expected_miss(current_miss_m, delta_v_req.unwrap_or(0.0), lead_time_s, direction.gain()),
                feasible,
                lead_time_s,
            });
        }
    }

    let mut feasible: Vec<&Candidate> = candidates.iter().filter(|c| c.feasible).collect();
    feasible.sort_by(|a, b| {
        a.delta_v_mps
            .partial_cmp(&b.delta_v_mps)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.lead_time_s.partial_cmp(&b.lead_time_s).unwrap_or(std::cmp::Ordering::Equal))
            .then_with(|| a.direction.to_string().cmp(&b.direction.to_string()))
    });

    let late_burn_time_utc = tca_utc - Duration::milliseconds((policy.late_burn_minutes * 60_000.0) as i64);
    let late_lead_s = (tca_utc - late_burn_time_utc).num_milliseconds() as f64 / 1000.0;
    let late_delta_v = required_delta_v(gap_m, late_lead_s, 1.0);
    let late_baseline = LateBaseline {
        burn_time_utc: late_burn_time_utc,
        direction: RtnDirection::PlusT,
        delta_v_mps: late_delta_v.unwrap_or(max_delta_v + 1.0),
    };

    match feasible.first() {
        Some(selected) => {
            let early_vs_late_ratio = late_delta_v
                .filter(|&late| late > 0.0)
                .map(|late| selected.delta_v_mps / late);
            ManeuverPlan {
                burn_time_utc: Some(selected.burn_time_utc),
                frame: "RTN",
                direction: Some(selected.direction),
                delta_v_mps: Some(selected.delta_v_mps),
                expected_miss_m: selected.expected_miss_m,
                feasibility: Feasibility::Feasible,
                early_vs_late_ratio,
                notes: "Selected minimal feasible delta-v candidate across timing and RTN direction grid.",
                current_miss_m,
                target_miss_m: target_m,
                late_baseline,
            }
        }
        None => ManeuverPlan {
            burn_time_utc: None,
            frame: "RTN",
            direction: None,
            delta_v_mps: None,
            expected_miss_m: current_miss_m,
            feasibility: Feasibility::Infeasible,
            early_vs_late_ratio: None,
            notes: "No feasible candidate met delta-v cap; event remains maneuver-eligible but operationally deferred.",
            current_miss_m,
            target_miss_m: target_m,
            late_baseline,
        },
    }
}
