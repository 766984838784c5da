//! Per-event output row joining trend evaluation with its maneuver plan.

use astraguard_maneuver::ManeuverPlan;
use astraguard_trend::{GateDecision, TrendEvaluation, TrendMetrics, TrendSample};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ManeuverPlanEntry {
    pub event_id: String,
    pub trend_metrics: TrendMetrics,
    pub pc_series: Vec<TrendSample>,
    pub decision_mode_hint: GateDecision,
    pub defer_until_utc: Option<DateTime<Utc>>,
    pub maneuver_plan: Option<ManeuverPlan>,
}

impl ManeuverPlanEntry {
    pub fn from_trend_evaluation(evaluation: TrendEvaluation, maneuver_plan: Option<ManeuverPlan>) -> Self {
        ManeuverPlanEntry {
            event_id: evaluation.event_id,
            trend_metrics: evaluation.trend_metrics,
            pc_series: evaluation.pc_series,
            decision_mode_hint: evaluation.decision,
            defer_until_utc: evaluation.defer_until_utc,
            maneuver_plan,
        }
    }
}
