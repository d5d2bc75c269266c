//! Quadrature of tabulated data on a non-uniform grid.
//!
//! The mesher integral reduces a density stored on mesh nodes to its total
//! mass with these rules, one direction at a time.

use ql_core::Real;

/// Trapezoid rule over the points `(x[i], f[i])`.
pub fn discrete_trapezoid(x: &[Real], f: &[Real]) -> Real {
    debug_assert_eq!(x.len(), f.len());
    x.windows(2)
        .zip(f.windows(2))
        .map(|(x, f)| (x[1] - x[0]) * (f[0] + f[1]))
        .sum::<Real>()
        * 0.5
}

/// Simpson rule over consecutive pairs of intervals of unequal width.
///
/// A trailing odd interval is closed with the trapezoid rule.
pub fn discrete_simpson(x: &[Real], f: &[Real]) -> Real {
    debug_assert_eq!(x.len(), f.len());
    let n = x.len();
    if n < 3 {
        return discrete_trapezoid(x, f);
    }

    let pairs: Real = (0..n - 2)
        .step_by(2)
        .map(|j| {
            let (h0, h1) = (x[j + 1] - x[j], x[j + 2] - x[j + 1]);
            let h = h0 + h1;
            h / (6.0 * h0 * h1)
                * (h1 * (2.0 * h0 - h1) * f[j] + h * h * f[j + 1] + h0 * (2.0 * h1 - h0) * f[j + 2])
        })
        .sum();

    if n % 2 == 0 {
        pairs + discrete_trapezoid(&x[n - 2..], &f[n - 2..])
    } else {
        pairs
    }
}
