//! Natural cubic spline.
//!
//! The second derivative vanishes at both end points; the interior second
//! derivatives solve the usual tridiagonal continuity system. Outside the
//! domain the end polynomials are extended.

use ql_core::{errors::Result, Real};

use super::{check_abscissae, locate, Interpolation1D};

/// Natural cubic spline through `(xs, ys)`.
#[derive(Debug, Clone)]
pub struct CubicNaturalSpline {
    xs: Vec<Real>,
    ys: Vec<Real>,
    /// Second derivatives at the nodes.
    m: Vec<Real>,
}

impl CubicNaturalSpline {
    /// Build the spline. `xs` must be strictly increasing with at least two
    /// points.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_abscissae(xs, ys, 2)?;
        Ok(Self::from_sorted(xs, ys))
    }

    /// Build without validating the abscissae.
    pub(crate) fn from_sorted(xs: &[Real], ys: &[Real]) -> Self {
        let n = xs.len();
        let mut m = vec![0.0; n];
        if n > 2 {
            // Thomas sweep on rows 1..n-1
            let mut c_prime = vec![0.0; n];
            let mut d_prime = vec![0.0; n];
            for i in 1..n - 1 {
                let h0 = xs[i] - xs[i - 1];
                let h1 = xs[i + 1] - xs[i];
                let a = h0;
                let b = 2.0 * (h0 + h1);
                let c = h1;
                let d = 6.0 * ((ys[i + 1] - ys[i]) / h1 - (ys[i] - ys[i - 1]) / h0);
                let denom = b - a * c_prime[i - 1];
                c_prime[i] = c / denom;
                d_prime[i] = (d - a * d_prime[i - 1]) / denom;
            }
            for i in (1..n - 1).rev() {
                m[i] = d_prime[i] - c_prime[i] * m[i + 1];
            }
        }
        Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            m,
        }
    }

    fn segment(&self, x: Real) -> (usize, Real, Real, Real) {
        let i = locate(&self.xs, x);
        let h = self.xs[i + 1] - self.xs[i];
        let t = x - self.xs[i];
        let b = (self.ys[i + 1] - self.ys[i]) / h - h * (2.0 * self.m[i] + self.m[i + 1]) / 6.0;
        (i, h, t, b)
    }

    /// First derivative at `x`.
    pub fn derivative(&self, x: Real) -> Real {
        let (i, h, t, b) = self.segment(x);
        b + self.m[i] * t + (self.m[i + 1] - self.m[i]) / (2.0 * h) * t * t
    }

    /// Second derivative at `x`.
    pub fn second_derivative(&self, x: Real) -> Real {
        let (i, h, t, _) = self.segment(x);
        self.m[i] + (self.m[i + 1] - self.m[i]) * t / h
    }
}

impl Interpolation1D for CubicNaturalSpline {
    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }

    fn operator(&self, x: Real) -> Real {
        let (i, h, t, b) = self.segment(x);
        self.ys[i]
            + t * (b + t * (0.5 * self.m[i] + t * (self.m[i + 1] - self.m[i]) / (6.0 * h)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn passes_through_nodes() {
        let xs = [0.0, 0.7, 1.1, 2.0, 3.5];
        let ys = [1.0, -0.5, 0.3, 2.0, 1.5];
        let s = CubicNaturalSpline::new(&xs, &ys).unwrap();
        for (&x, &y) in xs.iter().zip(ys.iter()) {
            assert_relative_eq!(s.operator(x), y, epsilon = 1e-12);
        }
        assert_relative_eq!(s.second_derivative(0.0), 0.0, epsilon = 1e-12);
        assert_relative_eq!(s.second_derivative(3.5), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn reproduces_linear_functions() {
        let xs = [0.0, 0.5, 1.5, 2.0, 4.0];
        let ys: Vec<Real> = xs.iter().map(|x| 3.0 * x - 1.0).collect();
        let s = CubicNaturalSpline::new(&xs, &ys).unwrap();
        for x in [0.25, 1.0, 1.75, 3.3] {
            assert_relative_eq!(s.operator(x), 3.0 * x - 1.0, epsilon = 1e-12);
            assert_relative_eq!(s.derivative(x), 3.0, epsilon = 1e-12);
            assert_relative_eq!(s.second_derivative(x), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn converges_on_smooth_function() {
        let n = 201;
        let xs: Vec<Real> = (0..n).map(|i| i as Real * std::f64::consts::PI / 200.0).collect();
        let ys: Vec<Real> = xs.iter().map(|x| x.sin()).collect();
        let s = CubicNaturalSpline::new(&xs, &ys).unwrap();
        let x = 1.234;
        assert_relative_eq!(s.operator(x), x.sin(), epsilon = 1e-8);
        assert_relative_eq!(s.derivative(x), x.cos(), epsilon = 1e-5);
        assert_relative_eq!(s.second_derivative(x), -x.sin(), epsilon = 1e-3);
    }

    #[test]
    fn two_points_is_linear() {
        let s = CubicNaturalSpline::new(&[1.0, 3.0], &[2.0, 6.0]).unwrap();
        assert_relative_eq!(s.operator(2.0), 4.0, epsilon = 1e-14);
        assert_relative_eq!(s.derivative(2.5), 2.0, epsilon = 1e-14);
    }
}
