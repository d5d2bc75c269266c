//! Bracketing root finder.
//!
//! The concentrating mesher solves for its density scale and the chi-square
//! quantile polishes its initial guess with it.

use ql_core::{
    errors::{Error, Result},
    Real,
};

/// Brent-Dekker root finder: inverse quadratic interpolation or secant
/// steps, falling back to bisection whenever they leave the bracket or stop
/// shrinking it fast enough.
#[derive(Debug, Clone, Copy)]
pub struct Brent {
    /// Absolute accuracy on the root.
    pub accuracy: Real,
    /// Evaluations allowed after the two bracket ends.
    pub max_evaluations: u32,
}

impl Default for Brent {
    fn default() -> Self {
        Self {
            accuracy: 1e-11,
            max_evaluations: 100,
        }
    }
}

impl Brent {
    /// A root of `f` in `[lo, hi]`; `f(lo)` and `f(hi)` must not share a
    /// sign.
    pub fn solve<F>(&self, f: F, lo: Real, hi: Real) -> Result<Real>
    where
        F: Fn(Real) -> Real,
    {
        // b: best estimate, a: previous b, c: counterpoint with f(c) opposite f(b)
        let (mut a, mut b) = (lo, hi);
        let (mut fa, mut fb) = (f(a), f(b));
        if fa.is_nan() || fb.is_nan() {
            return Err(Error::Runtime(format!(
                "root finder: f is NaN at the bracket [{lo}, {hi}]"
            )));
        }
        if fa * fb > 0.0 {
            return Err(Error::Precondition(format!(
                "root not bracketed: f({lo}) = {fa}, f({hi}) = {fb}"
            )));
        }
        if fa == 0.0 {
            return Ok(a);
        }

        let (mut c, mut fc) = (a, fa);
        let mut step = b - a;
        let mut last_step = step;

        for _ in 0..self.max_evaluations {
            if fb.signum() == fc.signum() {
                (c, fc) = (a, fa);
                step = b - a;
                last_step = step;
            }
            if fc.abs() < fb.abs() {
                (a, fa) = (b, fb);
                (b, fb) = (c, fc);
                (c, fc) = (a, fa);
            }

            let tol = 2.0 * Real::EPSILON * b.abs() + 0.5 * self.accuracy;
            let half = 0.5 * (c - b);
            if half.abs() <= tol || fb == 0.0 {
                return Ok(b);
            }

            let interpolated = if last_step.abs() >= tol && fa.abs() > fb.abs() {
                interpolation_step(a, b, c, fa, fb, fc)
                    .filter(|&s| s * half >= 0.0)
                    .filter(|&s| 2.0 * s.abs() < (3.0 * half.abs() - tol).min(last_step.abs()))
            } else {
                None
            };
            match interpolated {
                Some(s) => {
                    last_step = step;
                    step = s;
                }
                None => {
                    step = half;
                    last_step = half;
                }
            }

            (a, fa) = (b, fb);
            b += if step.abs() > tol { step } else { tol.copysign(half) };
            fb = f(b);
        }
        Err(Error::Runtime(format!(
            "root finder: no convergence after {} evaluations",
            self.max_evaluations
        )))
    }
}

/// Secant step when `a == c`, inverse quadratic step otherwise. `None` when
/// the step is undefined.
fn interpolation_step(a: Real, b: Real, c: Real, fa: Real, fb: Real, fc: Real) -> Option<Real> {
    let s = fb / fa;
    let (p, q) = if a == c {
        (2.0 * 0.5 * (c - b) * s, 1.0 - s)
    } else {
        let (qa, rb) = (fa / fc, fb / fc);
        (
            s * ((c - b) * qa * (qa - rb) - (b - a) * (rb - 1.0)),
            (qa - 1.0) * (rb - 1.0) * (s - 1.0),
        )
    };
    (q != 0.0).then(|| -p / q).filter(|s| s.is_finite())
}

/// [`Brent`] with `accuracy` and the default evaluation budget.
pub fn brent<F>(f: F, lo: Real, hi: Real, accuracy: Real) -> Result<Real>
where
    F: Fn(Real) -> Real,
{
    Brent {
        accuracy,
        ..Brent::default()
    }
    .solve(f, lo, hi)
}

/// [`Brent`] with explicit accuracy and evaluation budget.
pub fn brent_with_max_evaluations<F>(
    f: F,
    lo: Real,
    hi: Real,
    accuracy: Real,
    max_evaluations: u32,
) -> Result<Real>
where
    F: Fn(Real) -> Real,
{
    Brent {
        accuracy,
        max_evaluations,
    }
    .solve(f, lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn polynomial_and_transcendental_roots() {
        let sqrt2 = brent(|x| x * x - 2.0, 0.0, 2.0, 1e-12).unwrap();
        assert_abs_diff_eq!(sqrt2, 2f64.sqrt(), epsilon = 1e-10);
        let asinh3 = brent(|x| x.sinh() - 3.0, 0.0, 5.0, 1e-12).unwrap();
        assert_abs_diff_eq!(asinh3, 3f64.asinh(), epsilon = 1e-10);
        let cube = Brent::default().solve(|x| x.powi(3) - 1e-3, -10.0, 10.0).unwrap();
        assert_abs_diff_eq!(cube, 0.1, epsilon = 1e-10);
    }

    #[test]
    fn wallis_cubic() {
        let root = brent(|x| x * (x * x - 2.0) - 5.0, 2.0, 3.0, 1e-14).unwrap();
        assert_abs_diff_eq!(root, 2.094_551_481_542_326_5, epsilon = 1e-12);
    }

    #[test]
    fn end_points_can_be_roots() {
        assert_eq!(brent(|x| x, 0.0, 1.0, 1e-12).unwrap(), 0.0);
        assert_eq!(brent(|x| x - 1.0, 0.0, 1.0, 1e-12).unwrap(), 1.0);
    }

    #[test]
    fn failures() {
        assert!(matches!(
            brent(|x| x, 1.0, 2.0, 1e-10),
            Err(Error::Precondition(_))
        ));
        assert!(brent(|_| Real::NAN, 1.0, 2.0, 1e-10).is_err());
        let r = brent_with_max_evaluations(|x| x.powi(3) - 1e-3, -10.0, 10.0, 1e-14, 2);
        assert!(r.is_err());
    }
}
