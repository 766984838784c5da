use astraguard_risk::RtnSigmaBases;

/// Which covariance model feeds the local Pc series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CovModel {
    Legacy,
    AnisotropicRtn,
}

#[derive(Debug, Clone)]
pub struct TrendConfig {
    pub window_minutes: u32,
    pub cadence_seconds: u32,
    pub threshold: f64,
    pub defer_hours: f64,
    pub critical_override: f64,
    pub hard_body_radius_m: f64,
    pub cov_model: CovModel,
    pub sigma_payload_m: f64,
    pub sigma_debris_m: f64,
    pub rtn_bases: RtnSigmaBases,
}

impl Default for TrendConfig {
    fn default() -> Self {
        TrendConfig {
            window_minutes: 30,
            cadence_seconds: 60,
            threshold: 1e-5,
            defer_hours: 24.0,
            critical_override: 1e-3,
            hard_body_radius_m: 25.0,
            cov_model: CovModel::AnisotropicRtn,
            sigma_payload_m: 200.0,
            sigma_debris_m: 500.0,
            rtn_bases: RtnSigmaBases {
                payload_r_m: 200.0,
                payload_t_m: 260.0,
                payload_n_m: 200.0,
                debris_r_m: 500.0,
                debris_t_m: 700.0,
                debris_n_m: 500.0,
                along_track_growth_mps: 0.02,
            },
        }
    }
}
