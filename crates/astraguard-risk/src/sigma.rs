//! Per-object covariance sizing, keyed off catalog group membership.

/// Classifies a source group as debris (any group name containing "DEBRIS")
/// or payload, returning the configured base sigma for that class.
pub fn classify_sigma_m(source_group: &str, sigma_payload_m: f64, sigma_debris_m: f64) -> f64 {
    if source_group.to_uppercase().contains("DEBRIS") {
        sigma_debris_m
    } else {
        sigma_payload_m
    }
}

/// Combines two isotropic per-object sigmas into a pair sigma.
pub fn sigma_pair_m(
    primary_group: &str,
    secondary_group: &str,
    sigma_payload_m: f64,
    sigma_debris_m: f64,
) -> f64 {
    let s1 = classify_sigma_m(primary_group, sigma_payload_m, sigma_debris_m);
    let s2 = classify_sigma_m(secondary_group, sigma_payload_m, sigma_debris_m);
    (s1 * s1 + s2 * s2).sqrt()
}

/// Base RTN sigma triple for a single group, configurable per payload/debris
/// class, with along-track growth proportional to time from TCA.
#[derive(Debug, Clone, Copy)]
pub struct RtnSigmaBases {
    pub payload_r_m: f64,
    pub payload_t_m: f64,
    pub payload_n_m: f64,
    pub debris_r_m: f64,
    pub debris_t_m: f64,
    pub debris_n_m: f64,
    pub along_track_growth_mps: f64,
}

/// Per-axis sigma components for one object, at a given offset from TCA.
pub fn sigma_components_for_group(
    source_group: &str,
    delta_t_s: f64,
    bases: &RtnSigmaBases,
) -> (f64, f64, f64) {
    let is_debris = source_group.to_uppercase().contains("DEBRIS");
    let (sigma_r, sigma_t_base, sigma_n) = if is_debris {
        (bases.debris_r_m, bases.debris_t_m, bases.debris_n_m)
    } else {
        (bases.payload_r_m, bases.payload_t_m, bases.payload_n_m)
    };
    let sigma_t = sigma_t_base + bases.along_track_growth_mps.max(0.0) * delta_t_s.abs();
    (sigma_r.max(0.0), sigma_t.max(0.0), sigma_n.max(0.0))
}

/// Collapses an RTN sigma triple to a single effective encounter-plane sigma.
pub fn sigma_effective_from_rtn(sigma_r_m: f64, sigma_t_m: f64, sigma_n_m: f64) -> f64 {
    let total = sigma_r_m * sigma_r_m + sigma_t_m * sigma_t_m + sigma_n_m * sigma_n_m;
    (total / 3.0).sqrt()
}

/// Full anisotropic pair sigma: per-object RTN collapse, then combined.
pub fn sigma_pair_effective_m(
    primary_group: &str,
    secondary_group: &str,
    delta_t_s: f64,
    bases: &RtnSigmaBases,
) -> f64 {
    let (p_r, p_t, p_n) = sigma_components_for_group(primary_group, delta_t_s, bases);
    let (s_r, s_t, s_n) = sigma_components_for_group(secondary_group, delta_t_s, bases);
    let p_eff = sigma_effective_from_rtn(p_r, p_t, p_n);
    let s_eff = sigma_effective_from_rtn(s_r, s_t, s_n);
    (p_eff * p_eff + s_eff * s_eff).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bases() -> RtnSigmaBases {
        RtnSigmaBases {
            payload_r_m: 20.0,
            payload_t_m: 50.0,
            payload_n_m: 20.0,
            debris_r_m: 100.0,
            debris_t_m: 300.0,
            debris_n_m: 100.0,
            along_track_growth_mps: 0.05,
        }
    }

    #[test]
    fn classify_detects_debris_case_insensitively() {
        assert_eq!(classify_sigma_m("debris-fengyun", 50.0, 200.0), 200.0);
        assert_eq!(classify_sigma_m("ACTIVE", 50.0, 200.0), 50.0);
    }

    #[test]
    fn pair_sigma_combines_in_quadrature() {
        let sigma = sigma_pair_m("ACTIVE", "ACTIVE", 50.0, 200.0);
        assert!((sigma - (50.0_f64 * 50.0 * 2.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn along_track_sigma_grows_with_time_from_tca() {
        let (_, t_near, _) = sigma_components_for_group("ACTIVE", 0.0, &bases());
        let (_, t_far, _) = sigma_components_for_group("ACTIVE", 3600.0, &bases());
        assert!(t_far > t_near);
    }

    #[test]
    fn rtn_effective_matches_isotropic_when_axes_equal() {
        let sigma = sigma_effective_from_rtn(10.0, 10.0, 10.0);
        assert!((sigma - 10.0).abs() < 1e-9);
    }

    #[test]
    fn pair_effective_is_symmetric_in_argument_order() {
        let forward = sigma_pair_effective_m("ACTIVE", "DEBRIS", 120.0, &bases());
        let backward = sigma_pair_effective_m("DEBRIS", "ACTIVE", 120.0, &bases());
        assert!((forward - backward).abs() < 1e-9);
    }
}
