//! Assumed-covariance Pc: a 2D Gaussian integrated over a hard-body disk.

/// Modified Bessel function of the first kind, order 0.
///
/// Polynomial approximation (Abramowitz & Stegun 9.8.1/9.8.2), accurate to
/// within 1.6e-7 over the full real line.
fn bessel_i0(x: f64) -> f64 {
    let ax = x.abs();
    if ax < 3.75 {
        let t = (x / 3.75) * (x / 3.75);
        1.0 + t
            * (3.5156229
                + t * (3.0899424 + t * (1.2067492 + t * (0.2659732 + t * (0.0360768 + t * 0.0045813)))))
    } else {
        let t = 3.75 / ax;
        (ax.exp() / ax.sqrt())
            * (0.39894228
                + t * (0.01328592
                    + t * (0.00225319
                        + t * (-0.00157565
                            + t * (0.00916281
                                + t * (-0.02057706 + t * (0.02635537 + t * (-0.01647633 + t * 0.00392377))))))))
    }
}

/// Deterministic Pc approximation for an isotropic 2D Gaussian, integrated
/// radially over the hard-body disk via trapezoidal quadrature with the
/// angular term folded in analytically through `I0`.
pub fn pc_assumed_encounter_isotropic(
    miss_distance_m: f64,
    sigma_m: f64,
    hard_body_radius_m: f64,
    n_r: usize,
) -> f64 {
    let r = miss_distance_m.max(0.0);
    let sigma = sigma_m;
    let radius = hard_body_radius_m.max(0.0);

    if sigma <= 0.0 || radius <= 0.0 {
        return 0.0;
    }

    let count = n_r.max(16);
    let scale = sigma * sigma;
    let step = radius / (count - 1) as f64;

    let integrand = |rho: f64| -> f64 {
        let exponent = -((rho * rho) + (r * r)) / (2.0 * scale);
        (rho / scale) * exponent.exp() * bessel_i0((rho * r) / scale)
    };

    let mut pc = 0.0;
    let mut prev = integrand(0.0);
    for k in 1..count {
        let rho = k as f64 * step;
        let current = integrand(rho);
        pc += 0.5 * (prev + current) * step;
        prev = current;
    }

    if !pc.is_finite() {
        return 0.0;
    }
    pc.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sigma_is_zero_pc() {
        assert_eq!(pc_assumed_encounter_isotropic(0.0, 0.0, 25.0, 400), 0.0);
    }

    #[test]
    fn zero_radius_is_zero_pc() {
        assert_eq!(pc_assumed_encounter_isotropic(0.0, 100.0, 0.0, 400), 0.0);
    }

    #[test]
    fn deterministic_scenario_matches_closed_form() {
        let pc = pc_assumed_encounter_isotropic(0.0, 100.0, 25.0, 400);
        let expected = 1.0 - (-(25.0f64 * 25.0) / (2.0 * 100.0 * 100.0)).exp();
        assert!((pc - expected).abs() < 1e-4, "pc={pc} expected={expected}");
    }

    #[test]
    fn pc_is_monotone_decreasing_in_miss_distance() {
        let close = pc_assumed_encounter_isotropic(10.0, 100.0, 25.0, 400);
        let far = pc_assumed_encounter_isotropic(500.0, 100.0, 25.0, 400);
        assert!(close > far);
    }

    #[test]
    fn pc_is_bounded_in_unit_interval() {
        let pc = pc_assumed_encounter_isotropic(0.0, 1.0, 1000.0, 400);
        assert!((0.0..=1.0).contains(&pc));
    }
}
