//! Slope/stability/peak extraction from a local Pc series.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::TrendConfig;
use crate::gate::GateDecision;
use crate::series::TrendSample;

const PC_FLOOR: f64 = 1e-16;

#[derive(Debug, Clone, Serialize)]
pub struct TrendMetrics {
    pub pc_peak: f64,
    pub pc_slope: f64,
    pub pc_stability: f64,
    pub window_minutes: u32,
    pub cadence_seconds: u32,
    pub sample_count: usize,
    pub time_to_tca_hours: f64,
    pub threshold: f64,
    pub critical_override: f64,
    pub gate_decision: GateDecision,
    pub gate_reason_code: &'static str,
    pub gate_reason: &'static str,
}

/// Ordinary least-squares slope of `y` against `x`; 0 if `x` has no spread.
fn least_squares_slope(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;
    let mut num = 0.0;
    let mut den = 0.0;
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        num += (xi - mean_x) * (yi - mean_y);
        den += (xi - mean_x) * (xi - mean_x);
    }
    if den <= 0.0 {
        0.0
    } else {
        num / den
    }
}

pub fn compute_trend_metrics(
    pc_series: &[TrendSample],
    tca_utc: DateTime<Utc>,
    now_utc: DateTime<Utc>,
    config: &TrendConfig,
) -> TrendMetrics {
    let (pc_peak, pc_stability, pc_slope) = if pc_series.is_empty() {
        (0.0, 0.0, 0.0)
    } else {
        let pcs: Vec<f64> = pc_series.iter().map(|s| s.pc.max(0.0)).collect();
        let pc_peak = pcs.iter().cloned().fold(0.0_f64, f64::max);
        let stable_cutoff = 0.5 * pc_peak;
        let pc_stability = if pc_peak > 0.0 {
            pcs.iter().filter(|&&pc| pc >= stable_cutoff).count() as f64 / pcs.len() as f64
        } else {
            0.0
        };

        let t0 = pc_series[0].t_utc;
        let x: Vec<f64> = pc_series.iter().map(|s| (s.t_utc - t0).num_milliseconds() as f64 / 1000.0).collect();
        let spread = x.iter().cloned().fold(f64::MIN, f64::max) - x.iter().cloned().fold(f64::MAX, f64::min);
        let pc_slope = if pcs.len() >= 2 && spread.abs() > 0.0 {
            let y: Vec<f64> = pcs.iter().map(|&pc| (pc + PC_FLOOR).log10()).collect();
            least_squares_slope(&x, &y)
        } else {
            0.0
        };

        (pc_peak, pc_stability, pc_slope)
    };

    let time_to_tca_hours = (tca_utc - now_utc).num_milliseconds() as f64 / 1000.0 / 3600.0;

    TrendMetrics {
        pc_peak,
        pc_slope,
        pc_stability,
        window_minutes: config.window_minutes,
        cadence_seconds: config.cadence_seconds,
        sample_count: pc_series.len(),
        time_to_tca_hours,
        threshold: config.threshold,
        critical_override: config.critical_override,
        // Gate decision is not known until `classify_trend_gate` runs against
        // these metrics; `evaluate_trend_gate` fills these in afterward.
        gate_decision: GateDecision::Ignore,
        gate_reason_code: "",
        gate_reason: "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn sample(t_offset_s: i64, tca: DateTime<Utc>, pc: f64) -> TrendSample {
        TrendSample {
            t_utc: tca + Duration::seconds(t_offset_s),
            miss_m: 100.0,
            pc,
        }
    }

    #[test]
    fn peak_is_the_series_maximum() {
        let tca = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let series = vec![sample(-60, tca, 1e-7), sample(0, tca, 4e-5), sample(60, tca, 2e-6)];
        let metrics = compute_trend_metrics(&series, tca, tca - Duration::hours(4), &TrendConfig::default());
        assert_eq!(metrics.pc_peak, 4e-5);
    }

    #[test]
    fn stability_is_one_when_all_samples_near_peak() {
        let tca = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let series = vec![sample(-60, tca, 4e-5), sample(0, tca, 4e-5), sample(60, tca, 4e-5)];
        let metrics = compute_trend_metrics(&series, tca, tca - Duration::hours(4), &TrendConfig::default());
        assert_eq!(metrics.pc_stability, 1.0);
    }

    #[test]
    fn slope_is_positive_for_a_rising_series() {
        let tca = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let series = vec![sample(-120, tca, 1e-7), sample(-60, tca, 1e-6), sample(0, tca, 4e-5)];
        let metrics = compute_trend_metrics(&series, tca, tca - Duration::hours(4), &TrendConfig::default());
        assert!(metrics.pc_slope > 0.0);
    }

    #[test]
    fn empty_series_yields_zeroed_metrics() {
        let tca = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let metrics = compute_trend_metrics(&[], tca, tca - Duration::hours(4), &TrendConfig::default());
        assert_eq!(metrics.pc_peak, 0.0);
        assert_eq!(metrics.pc_stability, 0.0);
        assert_eq!(metrics.pc_slope, 0.0);
    }

    #[test]
    fn time_to_tca_hours_is_positive_before_tca() {
        let tca = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let metrics = compute_trend_metrics(&[], tca, tca - Duration::hours(10), &TrendConfig::default());
        assert!((metrics.time_to_tca_hours - 10.0).abs() < 1e-9);
    }
}
