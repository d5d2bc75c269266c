//! Adaptive Runge-Kutta integration of scalar ODEs.
//!
//! Embedded Cash-Karp 4(5) pair with step doubling/halving driven by the
//! local error estimate. Concentrating meshers use it to integrate the grid
//! density `dx/du`.

use ql_core::Real;

// Cash-Karp nodes and weights
const C: [Real; 6] = [0.0, 0.2, 0.3, 0.6, 1.0, 0.875];
const A: [[Real; 5]; 6] = [
    [0.0, 0.0, 0.0, 0.0, 0.0],
    [0.2, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0],
    [0.3, -0.9, 1.2, 0.0, 0.0],
    [-11.0 / 54.0, 2.5, -70.0 / 27.0, 35.0 / 27.0, 0.0],
    [
        1631.0 / 55296.0,
        175.0 / 512.0,
        575.0 / 13824.0,
        44275.0 / 110592.0,
        253.0 / 4096.0,
    ],
];
const B5: [Real; 6] = [37.0 / 378.0, 0.0, 250.0 / 621.0, 125.0 / 594.0, 0.0, 512.0 / 1771.0];
const B4: [Real; 6] = [
    2825.0 / 27648.0,
    0.0,
    18575.0 / 48384.0,
    13525.0 / 55296.0,
    277.0 / 14336.0,
    0.25,
];

const SAFETY: Real = 0.9;
const MAX_STEPS: usize = 100_000;

/// Adaptive Cash-Karp integrator for `dy/dt = f(t, y)`.
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveRungeKutta {
    /// Tolerance on the scaled local error.
    pub eps: Real,
    /// Smallest step taken before the integrator accepts whatever it has.
    pub h_min: Real,
}

impl Default for AdaptiveRungeKutta {
    fn default() -> Self {
        Self::new(1e-10)
    }
}

impl AdaptiveRungeKutta {
    /// Integrator with local error tolerance `eps`.
    pub fn new(eps: Real) -> Self {
        Self { eps, h_min: 0.0 }
    }

    /// `y(t1)` given `y(t0) = y0`. Integrates backwards if `t1 < t0`.
    pub fn solve<F>(&self, f: F, t0: Real, y0: Real, t1: Real) -> Real
    where
        F: Fn(Real, Real) -> Real,
    {
        let span = t1 - t0;
        if span == 0.0 {
            return y0;
        }
        let mut h = 0.01 * span;
        let (mut t, mut y) = (t0, y0);

        for _ in 0..MAX_STEPS {
            let last = (t + h - t1) * span >= 0.0;
            if last {
                h = t1 - t;
            }
            let (next, err) = cash_karp_step(&f, t, y, h);
            let scale = y.abs() + (h * f(t, y)).abs() + Real::MIN_POSITIVE;
            let ratio = (err / scale).abs() / self.eps;

            if ratio <= 1.0 || h.abs() <= self.h_min {
                if last {
                    return next;
                }
                t += h;
                y = next;
                // grow by at most five
                let grow = if ratio > 1.89e-4 {
                    SAFETY * ratio.powf(-0.2)
                } else {
                    5.0
                };
                h *= grow;
            } else {
                // shrink by at most ten
                h *= (SAFETY * ratio.powf(-0.25)).max(0.1);
            }
        }
        y
    }
}

/// One embedded step: fifth-order value and its difference to the
/// fourth-order one.
fn cash_karp_step<F>(f: &F, t: Real, y: Real, h: Real) -> (Real, Real)
where
    F: Fn(Real, Real) -> Real,
{
    let mut k = [0.0; 6];
    for stage in 0..6 {
        let dy: Real = A[stage][..stage]
            .iter()
            .zip(&k[..stage])
            .map(|(a, ki)| a * ki)
            .sum();
        k[stage] = f(t + C[stage] * h, y + h * dy);
    }
    let high: Real = B5.iter().zip(&k).map(|(b, ki)| b * ki).sum();
    let low: Real = B4.iter().zip(&k).map(|(b, ki)| b * ki).sum();
    (y + h * high, h * (high - low))
}

/// `y(t1)` for `dy/dt = f(t, y)`, `y(t0) = y0`, with tolerance `tol`.
pub fn integrate_scalar<F>(f: F, t0: Real, y0: Real, t1: Real, tol: Real) -> Real
where
    F: Fn(Real, Real) -> Real,
{
    AdaptiveRungeKutta::new(tol).solve(f, t0, y0, t1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::E;

    #[test]
    fn weights_are_consistent() {
        assert_abs_diff_eq!(B5.iter().sum::<Real>(), 1.0, epsilon = 1e-14);
        assert_abs_diff_eq!(B4.iter().sum::<Real>(), 1.0, epsilon = 1e-14);
        for (row, c) in A.iter().zip(C) {
            assert_abs_diff_eq!(row.iter().sum::<Real>(), c, epsilon = 1e-14);
        }
    }

    #[test]
    fn exponential_growth_and_decay() {
        assert_abs_diff_eq!(integrate_scalar(|_, y| y, 0.0, 1.0, 1.0, 1e-10), E, epsilon = 1e-7);
        assert_abs_diff_eq!(
            integrate_scalar(|_, y| -y, 0.0, 1.0, 1.0, 1e-10),
            1.0 / E,
            epsilon = 1e-8
        );
    }

    #[test]
    fn integrates_backwards() {
        assert_abs_diff_eq!(integrate_scalar(|_, y| y, 1.0, E, 0.0, 1e-10), 1.0, epsilon = 1e-7);
    }

    #[test]
    fn time_dependent_right_hand_side() {
        // y' = cos(t), y(0) = 0
        let y = integrate_scalar(|t, _| t.cos(), 0.0, 0.0, 2.0, 1e-10);
        assert_abs_diff_eq!(y, 2f64.sin(), epsilon = 1e-7);
    }

    #[test]
    fn logistic_curve() {
        let y = AdaptiveRungeKutta::default().solve(|_, y| y * (1.0 - y), 0.0, 0.1, 5.0);
        assert_abs_diff_eq!(y, 1.0 / (1.0 + 9.0 * (-5f64).exp()), epsilon = 1e-7);
    }

    #[test]
    fn empty_interval_returns_the_start_value() {
        assert_eq!(integrate_scalar(|_, y| y, 0.3, 2.0, 0.3, 1e-10), 2.0);
    }
}
