//! Preconditioned BiCGStab for operators given as closures.
//!
//! The implicit schemes only ever need `A·x` and an approximate inverse, so
//! the operator is never assembled as a matrix.

use ql_core::{
    errors::{Error, Result},
    Real,
};

use crate::array::Array;

/// Outcome of a converged BiCGStab run.
#[derive(Debug, Clone)]
pub struct BiCGStabResult {
    /// Solution vector.
    pub x: Array,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Final relative residual `‖b - A·x‖ / ‖b‖`.
    pub error: Real,
}

/// BiCGStab solver for `A·x = b`.
pub struct BiCGStab<A, M>
where
    A: Fn(&Array) -> Array,
    M: Fn(&Array) -> Result<Array>,
{
    matrix_mult: A,
    preconditioner: M,
    max_iterations: usize,
    rel_tol: Real,
}

impl<A> BiCGStab<A, fn(&Array) -> Result<Array>>
where
    A: Fn(&Array) -> Array,
{
    /// Unpreconditioned solver.
    pub fn unpreconditioned(matrix_mult: A, max_iterations: usize, rel_tol: Real) -> Self {
        BiCGStab {
            matrix_mult,
            preconditioner: |x: &Array| Ok(x.clone()),
            max_iterations,
            rel_tol,
        }
    }
}

impl<A, M> BiCGStab<A, M>
where
    A: Fn(&Array) -> Array,
    M: Fn(&Array) -> Result<Array>,
{
    /// Create a solver with a preconditioner `M ≈ A⁻¹`.
    pub fn new(matrix_mult: A, max_iterations: usize, rel_tol: Real, preconditioner: M) -> Self {
        Self {
            matrix_mult,
            preconditioner,
            max_iterations,
            rel_tol,
        }
    }

    /// Solve `A·x = b` starting from `x0` (zero when `None`).
    pub fn solve(&self, b: &Array, x0: Option<&Array>) -> Result<BiCGStabResult> {
        let bnorm2 = b.norm();
        if bnorm2 == 0.0 {
            return Ok(BiCGStabResult {
                x: b.clone(),
                iterations: 0,
                error: 0.0,
            });
        }

        let mut x = match x0 {
            Some(x0) => x0.clone(),
            None => Array::zeros(b.size()),
        };
        let mut r = b - &(self.matrix_mult)(&x);
        let r_tld = r.clone();

        let mut p = Array::zeros(b.size());
        let mut v = Array::zeros(b.size());
        let mut rho_tld = 1.0;
        let mut omega = 1.0;
        let mut alpha = 0.0;
        let mut error = r.norm() / bnorm2;

        let mut i = 0;
        while i < self.max_iterations && error >= self.rel_tol {
            let rho = r_tld.dot(&r);
            if rho == 0.0 || omega == 0.0 {
                break;
            }

            if i > 0 {
                let beta = (rho / rho_tld) * (alpha / omega);
                p = &r + &((&p - &(&v * omega)) * beta);
            } else {
                p = r.clone();
            }

            let p_tld = (self.preconditioner)(&p)?;
            v = (self.matrix_mult)(&p_tld);
            alpha = rho / r_tld.dot(&v);
            let s = &r - &(&v * alpha);
            if s.norm() < self.rel_tol * bnorm2 {
                x.axpy(alpha, &p_tld);
                error = s.norm() / bnorm2;
                i += 1;
                break;
            }

            let s_tld = (self.preconditioner)(&s)?;
            let t = (self.matrix_mult)(&s_tld);
            omega = t.dot(&s) / t.dot(&t);
            x.axpy(alpha, &p_tld);
            x.axpy(omega, &s_tld);
            r = &s - &(&t * omega);
            error = r.norm() / bnorm2;
            rho_tld = rho;
            i += 1;
        }

        if !(error < self.rel_tol) {
            return Err(Error::Runtime(format!(
                "BiCGStab did not converge: relative residual {error:e} after {i} iterations"
            )));
        }
        Ok(BiCGStabResult {
            x,
            iterations: i,
            error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // non-symmetric tridiagonal: 4 on the diagonal, -1 below, -2 above
    fn tridiag(x: &Array) -> Array {
        let n = x.size();
        (0..n)
            .map(|i| {
                let mut y = 4.0 * x[i];
                if i > 0 {
                    y -= x[i - 1];
                }
                if i + 1 < n {
                    y -= 2.0 * x[i + 1];
                }
                y
            })
            .collect()
    }

    #[test]
    fn solves_non_symmetric_system() {
        let expected: Array = (0..50).map(|i| (i as Real * 0.3).sin()).collect();
        let b = tridiag(&expected);
        let solver = BiCGStab::unpreconditioned(tridiag, 200, 1e-12);
        let result = solver.solve(&b, None).unwrap();
        for i in 0..50 {
            assert_relative_eq!(result.x[i], expected[i], epsilon = 1e-9);
        }
        assert!(result.error < 1e-12);
    }

    #[test]
    fn jacobi_preconditioner_converges() {
        let expected: Array = (0..30).map(|i| 1.0 + i as Real).collect();
        let b = tridiag(&expected);
        let solver = BiCGStab::new(tridiag, 200, 1e-12, |x: &Array| Ok(x * 0.25));
        let result = solver.solve(&b, None).unwrap();
        for i in 0..30 {
            assert_relative_eq!(result.x[i], expected[i], max_relative = 1e-9);
        }
    }

    #[test]
    fn zero_rhs_is_trivial() {
        let solver = BiCGStab::unpreconditioned(tridiag, 10, 1e-8);
        let result = solver.solve(&Array::zeros(5), None).unwrap();
        assert_eq!(result.iterations, 0);
        assert_eq!(result.x.norm(), 0.0);
    }

    #[test]
    fn reports_non_convergence() {
        let expected: Array = (0..50).map(|i| (i as Real).cos()).collect();
        let b = tridiag(&expected);
        let solver = BiCGStab::unpreconditioned(tridiag, 1, 1e-14);
        assert!(solver.solve(&b, None).is_err());
    }
}
