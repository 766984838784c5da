//! Trend-gated decision classification: IGNORE / DEFER / MANEUVER.

use std::fmt;

use astraguard_catalog::Tle;
use astraguard_risk::ConjunctionEvent;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::config::TrendConfig;
use crate::metrics::{compute_trend_metrics, TrendMetrics};
use crate::series::{build_local_pc_series, TrendSample};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateDecision {
    Ignore,
    Defer,
    Maneuver,
}

impl fmt::Display for GateDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GateDecision::Ignore => "IGNORE",
            GateDecision::Defer => "DEFER",
            GateDecision::Maneuver => "MANEUVER",
        };
        f.write_str(s)
    }
}

/// `max(now + 10min, min(tca - tca_guard_hours, now + revisit_hours))`.
pub fn compute_defer_until_utc(
    tca_utc: DateTime<Utc>,
    now_utc: DateTime<Utc>,
    revisit_hours: f64,
    tca_guard_hours: f64,
) -> DateTime<Utc> {
    let candidate_a = tca_utc - Duration::milliseconds((tca_guard_hours * 3_600_000.0) as i64);
    let candidate_b = now_utc + Duration::milliseconds((revisit_hours * 3_600_000.0) as i64);
    let defer_until = candidate_a.min(candidate_b);
    let min_allowed = now_utc + Duration::minutes(10);
    defer_until.max(min_allowed)
}

#[derive(Debug, Clone)]
pub struct GateOutcome {
    pub decision: GateDecision,
    pub reason_code: &'static str,
    pub reason: &'static str,
    pub defer_until_utc: Option<DateTime<Utc>>,
}

pub fn classify_trend_gate(
    metrics: &TrendMetrics,
    tca_utc: DateTime<Utc>,
    now_utc: DateTime<Utc>,
    defer_hours: f64,
) -> GateOutcome {
    if metrics.time_to_tca_hours > defer_hours && metrics.pc_peak < metrics.critical_override {
        return GateOutcome {
            decision: GateDecision::Defer,
            reason_code: "FAR_FROM_TCA",
            reason: "Risk is too far from TCA and below critical override; defer for re-evaluation.",
            defer_until_utc: Some(compute_defer_until_utc(tca_utc, now_utc, 6.0, 12.0)),
        };
    }

    if metrics.pc_peak < metrics.threshold {
        return GateOutcome {
            decision: GateDecision::Ignore,
            reason_code: "BELOW_THRESHOLD",
            reason: "Peak collision probability in local window is below maneuver threshold.",
            defer_until_utc: None,
        };
    }

    if metrics.pc_slope <= 0.0 && metrics.pc_stability < 0.3 {
        return GateOutcome {
            decision: GateDecision::Defer,
            reason_code: "SPIKY_NOT_SUSTAINED",
            reason: "Risk profile is not sustained near peak; defer and re-evaluate.",
            defer_until_utc: Some(compute_defer_until_utc(tca_utc, now_utc, 6.0, 12.0)),
        };
    }

    GateOutcome {
        decision: GateDecision::Maneuver,
        reason_code: "SUSTAINED_RISK",
        reason: "Risk is sustained/rising near TCA; event is maneuver-eligible.",
        defer_until_utc: None,
    }
}

#[derive(Debug, Clone)]
pub struct TrendEvaluation {
    pub event_id: String,
    pub pc_series: Vec<TrendSample>,
    pub trend_metrics: TrendMetrics,
    pub decision: GateDecision,
    pub defer_until_utc: Option<DateTime<Utc>>,
    pub gate_reason_code: &'static str,
    pub gate_reason: &'static str,
}

/// Builds the local Pc series for `event`'s pair and runs the trend gate.
/// Falls back to a single-sample series at the event's own (miss, pc) if
/// local re-propagation fails.
pub fn evaluate_trend_gate(
    event: &ConjunctionEvent,
    primary: &Tle,
    secondary: &Tle,
    primary_group: &str,
    secondary_group: &str,
    config: &TrendConfig,
    now_utc: DateTime<Utc>,
) -> TrendEvaluation {
    let tca_utc = DateTime::parse_from_rfc3339(&event.tca_utc)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(now_utc);

    let mut pc_series = build_local_pc_series(tca_utc, primary, secondary, primary_group, secondary_group, config);
    if pc_series.is_empty() {
        pc_series.push(TrendSample {
            t_utc: tca_utc,
            miss_m: event.miss_distance_m,
            pc: event.pc_assumed,
        });
    }

    let mut trend_metrics = compute_trend_metrics(&pc_series, tca_utc, now_utc, config);
    let gate = classify_trend_gate(&trend_metrics, tca_utc, now_utc, config.defer_hours);
    trend_metrics.gate_decision = gate.decision;
    trend_metrics.gate_reason_code = gate.reason_code;
    trend_metrics.gate_reason = gate.reason;

    TrendEvaluation {
        event_id: event.event_id.clone(),
        pc_series,
        trend_metrics,
        decision: gate.decision,
        defer_until_utc: gate.defer_until_utc,
        gate_reason_code: gate.reason_code,
        gate_reason: gate.reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn metrics(pc_peak: f64, pc_slope: f64, pc_stability: f64, time_to_tca_hours: f64) -> TrendMetrics {
        TrendMetrics {
            pc_peak,
            pc_slope,
            pc_stability,
            window_minutes: 30,
            cadence_seconds: 60,
            sample_count: 3,
            time_to_tca_hours,
            threshold: 1e-5,
            critical_override: 1e-3,
            gate_decision: GateDecision::Ignore,
            gate_reason_code: "",
            gate_reason: "",
        }
    }

    #[test]
    fn sustained_rising_risk_triggers_maneuver() {
        let tca = Utc.with_ymd_and_hms(2026, 1, 1, 4, 0, 0).unwrap();
        let now = tca - Duration::hours(4);
        let m = metrics(4e-5, 0.1, 0.5, 4.0);
        let outcome = classify_trend_gate(&m, tca, now, 24.0);
        assert_eq!(outcome.decision, GateDecision::Maneuver);
        assert_eq!(outcome.reason_code, "SUSTAINED_RISK");
    }

    #[test]
    fn far_from_tca_and_below_critical_defers_with_floor() {
        let tca = Utc.with_ymd_and_hms(2026, 1, 3, 0, 0, 0).unwrap();
        let now = tca - Duration::hours(48);
        let m = metrics(1e-4, 0.0, 0.0, 48.0);
        let outcome = classify_trend_gate(&m, tca, now, 24.0);
        assert_eq!(outcome.decision, GateDecision::Defer);
        assert_eq!(outcome.reason_code, "FAR_FROM_TCA");
        let defer_until = outcome.defer_until_utc.unwrap();
        assert!(defer_until >= now + Duration::minutes(10));
    }

    #[test]
    fn below_threshold_is_ignored() {
        let tca = Utc.with_ymd_and_hms(2026, 1, 1, 4, 0, 0).unwrap();
        let now = tca - Duration::hours(2);
        let m = metrics(1e-8, 0.0, 0.0, 2.0);
        let outcome = classify_trend_gate(&m, tca, now, 24.0);
        assert_eq!(outcome.decision, GateDecision::Ignore);
        assert!(outcome.defer_until_utc.is_none());
    }

    #[test]
    fn spiky_not_sustained_defers() {
        let tca = Utc.with_ymd_and_hms(2026, 1, 1, 4, 0, 0).unwrap();
        let now = tca - Duration::hours(2);
        let m = metrics(4e-5, -0.2, 0.1, 2.0);
        let outcome = classify_trend_gate(&m, tca, now, 24.0);
        assert_eq!(outcome.decision, GateDecision::Defer);
        assert_eq!(outcome.reason_code, "SPIKY_NOT_SUSTAINED");
    }

    #[test]
    fn defer_until_never_precedes_ten_minute_floor() {
        let tca = Utc.with_ymd_and_hms(2026, 1, 1, 0, 20, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let defer_until = compute_defer_until_utc(tca, now, 6.0, 12.0);
        assert!(defer_until >= now + Duration::minutes(10));
    }

    #[test]
    fn gate_decision_strings_are_deterministic() {
        assert_eq!(GateDecision::Ignore.to_string(), "IGNORE");
        assert_eq!(GateDecision::Defer.to_string(), "DEFER");
        assert_eq!(GateDecision::Maneuver.to_string(), "MANEUVER");
    }
}
