//! Relative floating-point comparison in units of machine epsilon.
//!
//! Used wherever grid coordinates or stopping times must be matched after
//! arithmetic, e.g. exercise dates against the rollback clock.

use ql_core::Real;

fn tolerance(n: u32) -> Real {
    Real::from(n) * Real::EPSILON
}

/// `a` and `b` agree to within `n` ulps relative to **both** values.
///
/// Against zero the absolute difference must be below `tol²`.
pub fn close(a: Real, b: Real, n: u32) -> bool {
    if a == b {
        return true;
    }
    let diff = (a - b).abs();
    let tol = tolerance(n);
    if a == 0.0 || b == 0.0 {
        return diff < tol * tol;
    }
    diff <= tol * a.abs() && diff <= tol * b.abs()
}

/// `a` and `b` agree to within `n` ulps relative to **either** value.
pub fn close_enough(a: Real, b: Real, n: u32) -> bool {
    if a == b {
        return true;
    }
    let diff = (a - b).abs();
    let tol = tolerance(n);
    if a == 0.0 || b == 0.0 {
        return diff < tol * tol;
    }
    diff <= tol * a.abs() || diff <= tol * b.abs()
}
