//! Numerical building blocks shared by the distribution families.
use crate::compute::rng::TrialRng;
use rand::Rng;
use std::f64::consts::PI;

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEF: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// Natural log of |Γ(x)| via the Lanczos approximation (g = 7, n = 9).
pub fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        // Reflection: Γ(x)Γ(1-x) = π / sin(πx)
        return (PI / (PI * x).sin()).abs().ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let mut acc = LANCZOS_COEF[0];
    for (i, &c) in LANCZOS_COEF.iter().enumerate().skip(1) {
        acc += c / (x + i as f64);
    }
    let t = x + LANCZOS_G + 0.5;
    0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + acc.ln()
}

pub fn ln_beta(a: f64, b: f64) -> f64 { ln_gamma(a) + ln_gamma(b) - ln_gamma(a + b) }

pub fn ln_choose(n: u64, k: u64) -> f64 {
    ln_gamma(n as f64 + 1.0) - ln_gamma(k as f64 + 1.0) - ln_gamma((n - k) as f64 + 1.0)
}

/// `x * ln(y)` with the convention `0 * ln(0) = 0`.
pub fn xlny(x: f64, y: f64) -> f64 {
    if x == 0.0 { 0.0 } else { x * y.ln() }
}

/// Uniform draw on (0, 1].
#[inline]
pub fn open_unit(rng: &mut TrialRng) -> f64 { 1.0 - rng.gen::<f64>() }

/// Box-Muller; consumes two uniforms per call.
pub fn standard_normal(rng: &mut TrialRng) -> f64 {
    let u1 = open_unit(rng);
    let u2 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Gamma(shape, 1) by Marsaglia-Tsang. Shapes below one use the
/// `Gamma(k + 1) * U^(1/k)` boost. Returns NaN for a shape that is not
/// finite and positive; the rejection loop would never exit on one.
pub fn standard_gamma(shape: f64, rng: &mut TrialRng) -> f64 {
    if !(shape.is_finite() && shape > 0.0) {
        return f64::NAN;
    }
    if shape < 1.0 {
        let boost = open_unit(rng).powf(1.0 / shape);
        return standard_gamma(shape + 1.0, rng) * boost;
    }
    let d = shape - 1.0 / 3.0;
    let c = 1.0 / (9.0 * d).sqrt();
    loop {
        let x = standard_normal(rng);
        let v = 1.0 + c * x;
        if v <= 0.0 {
            continue;
        }
        let v = v * v * v;
        let u = open_unit(rng);
        if u.ln() < 0.5 * x * x + d - d * v + d * v.ln() {
            return d * v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::rng::trial_stream;

    #[test]
    fn test_ln_gamma_known_values() {
        assert!(ln_gamma(1.0).abs() < 1e-12);
        assert!(ln_gamma(2.0).abs() < 1e-12);
        assert!((ln_gamma(5.0) - 24f64.ln()).abs() < 1e-10);
        assert!((ln_gamma(0.5) - PI.sqrt().ln()).abs() < 1e-10);
        assert!((ln_beta(2.0, 3.0) - (1.0f64 / 12.0).ln()).abs() < 1e-10);
        assert!((ln_choose(5, 2) - 10f64.ln()).abs() < 1e-10);
    }

    #[test]
    fn test_standard_gamma_mean() {
        let mut rng = trial_stream(7, 0);
        for &shape in &[0.5, 2.0, 9.0] {
            let n = 20_000;
            let mean = (0..n).map(|_| standard_gamma(shape, &mut rng)).sum::<f64>() / n as f64;
            // Var = shape, so the standard error is sqrt(shape / n).
            assert!((mean - shape).abs() < 5.0 * (shape / n as f64).sqrt(), "shape {}: mean {}", shape, mean);
        }
    }

    #[test]
    fn test_standard_gamma_degenerate_shapes_return_immediately() {
        let mut rng = trial_stream(7, 1);
        for &shape in &[f64::INFINITY, f64::NAN, 0.0, -1.0] {
            assert!(standard_gamma(shape, &mut rng).is_nan(), "shape {}", shape);
        }
    }

    #[test]
    fn test_standard_normal_moments() {
        let mut rng = trial_stream(11, 3);
        let n = 20_000;
        let draws: Vec<f64> = (0..n).map(|_| standard_normal(&mut rng)).collect();
        let mean = draws.iter().sum::<f64>() / n as f64;
        let var = draws.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.05);
        assert!((var - 1.0).abs() < 0.05);
    }
}
