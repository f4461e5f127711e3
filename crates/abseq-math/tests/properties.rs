//! Property-based tests for abseq-math numerical functions.

use abseq_math::descriptive::{normal_quantile, pooled_std, std_error};
use abseq_math::{log_binomial, log_choose, log_factorial, log_gamma, log_sum_exp};
use proptest::prelude::*;

const TOL: f64 = 1e-10;

/// Extended tolerance where the Lanczos approximation accumulates error.
const LGAMMA_TOL: f64 = 1e-8;

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return false;
    }
    if a.is_infinite() && b.is_infinite() {
        return a.signum() == b.signum();
    }
    (a - b).abs() <= tol.max(tol * a.abs().max(b.abs()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn log_sum_exp_is_at_least_the_max(values in prop::collection::vec(-700.0..700.0f64, 1..20)) {
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let out = log_sum_exp(&values);
        prop_assert!(out.is_finite());
        prop_assert!(out >= max - TOL);
        prop_assert!(out <= max + (values.len() as f64).ln() + TOL);
    }

    #[test]
    fn log_sum_exp_order_independent(a in -50.0..50.0f64, b in -50.0..50.0f64, c in -50.0..50.0f64) {
        let abc = log_sum_exp(&[a, b, c]);
        let cab = log_sum_exp(&[c, a, b]);
        prop_assert!(approx_eq(abc, cab, TOL));
    }

    /// Gamma(z + 1) = z * Gamma(z).
    #[test]
    fn log_gamma_recurrence(z in 0.5..150.0f64) {
        let lhs = log_gamma(z + 1.0);
        let rhs = z.ln() + log_gamma(z);
        prop_assert!(approx_eq(lhs, rhs, LGAMMA_TOL), "z={} lhs={} rhs={}", z, lhs, rhs);
    }

    #[test]
    fn log_factorial_recurrence(n in 1u64..5000) {
        let lhs = log_factorial(n);
        let rhs = (n as f64).ln() + log_factorial(n - 1);
        prop_assert!(approx_eq(lhs, rhs, LGAMMA_TOL));
    }

    /// C(n, k) = C(n, n - k).
    #[test]
    fn log_binomial_symmetry(n in 0u64..2000, frac in 0.0..=1.0f64) {
        let k = ((n as f64) * frac).floor() as u64;
        prop_assert!(approx_eq(log_binomial(n, k), log_binomial(n, n - k), LGAMMA_TOL));
    }

    /// Pascal's rule in log space: C(n, k) = C(n-1, k-1) + C(n-1, k).
    #[test]
    fn log_binomial_pascal(n in 2u64..500, frac in 0.01..0.99f64) {
        let k = (((n - 1) as f64) * frac).floor().max(1.0) as u64;
        let lhs = log_binomial(n, k);
        let rhs = log_sum_exp(&[log_binomial(n - 1, k - 1), log_binomial(n - 1, k)]);
        prop_assert!(approx_eq(lhs, rhs, LGAMMA_TOL), "n={} k={}", n, k);
    }

    #[test]
    fn log_choose_never_negative_or_nan(n in -5i64..300, k in -5i64..300) {
        let out = log_choose(n, k);
        prop_assert!(out.is_finite());
        prop_assert!(out >= -LGAMMA_TOL);
    }

    #[test]
    fn normal_quantile_monotone(p in 0.001..0.998f64) {
        prop_assert!(normal_quantile(p) < normal_quantile(p + 0.001));
    }

    #[test]
    fn pooled_std_exceeds_single_arm_error(p in 0.01..0.99f64, c in 1.0..1e6f64, e in 1.0..1e6f64) {
        // The pooled difference carries the variance of both arms.
        prop_assert!(pooled_std(p, c, e) >= std_error(p, c.min(e)) - TOL);
    }
}
