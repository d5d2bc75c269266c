//! Gaussian quadrature rules.
//!
//! Nodes and weights come from the Golub-Welsch construction: the nodes are
//! the eigenvalues of the Jacobi matrix of the orthogonal-polynomial
//! recurrence and the weights follow from the first eigenvector components.

use nalgebra::DMatrix;
use ql_core::Real;

/// A Gauss quadrature rule defined by nodes and weights.
#[derive(Debug, Clone)]
pub struct GaussianQuadrature {
    x: Vec<Real>,
    w: Vec<Real>,
}

impl GaussianQuadrature {
    /// Quadrature nodes, ascending.
    pub fn x(&self) -> &[Real] {
        &self.x
    }

    /// Quadrature weights.
    pub fn w(&self) -> &[Real] {
        &self.w
    }

    /// Number of quadrature points.
    pub fn order(&self) -> usize {
        self.x.len()
    }

    /// Evaluate ∫ f(x) w(x) dx ≈ Σ wᵢ f(xᵢ).
    pub fn integrate<F: Fn(Real) -> Real>(&self, f: F) -> Real {
        self.x.iter().zip(self.w.iter()).map(|(&xi, &wi)| wi * f(xi)).sum()
    }
}

/// Gauss-Legendre quadrature on [−1, 1].
pub struct GaussLegendreIntegration;

impl GaussLegendreIntegration {
    /// Build a Gauss-Legendre quadrature of given `order`.
    pub fn new(order: usize) -> GaussianQuadrature {
        let alpha = vec![0.0; order];
        let beta: Vec<Real> = (0..order)
            .map(|i| {
                if i == 0 {
                    2.0
                } else {
                    let n = i as Real;
                    n * n / (4.0 * n * n - 1.0)
                }
            })
            .collect();
        golub_welsch(&alpha, &beta)
    }

    /// Integrate `f` on [a, b] by mapping to [−1, 1].
    pub fn integrate<F: Fn(Real) -> Real>(order: usize, f: F, a: Real, b: Real) -> Real {
        let q = Self::new(order);
        let half = 0.5 * (b - a);
        let mid = 0.5 * (a + b);
        q.integrate(|x| f(mid + half * x)) * half
    }
}

/// Gauss-Laguerre quadrature (weight x^s e^{-x} on [0, ∞)).
pub struct GaussLaguerreIntegration;

impl GaussLaguerreIntegration {
    /// Build a Gauss-Laguerre quadrature with generalized parameter `s`.
    pub fn new(order: usize, s: Real) -> GaussianQuadrature {
        // α_i = 2i + 1 + s, β_i = i(i + s)
        let alpha: Vec<Real> = (0..order).map(|i| 2.0 * (i as Real) + 1.0 + s).collect();
        let beta: Vec<Real> = (0..order)
            .map(|i| {
                if i == 0 {
                    statrs::function::gamma::gamma(s + 1.0)
                } else {
                    (i as Real) * ((i as Real) + s)
                }
            })
            .collect();
        golub_welsch(&alpha, &beta)
    }
}

/// `alpha[i]` are the diagonal recurrence coefficients; `beta[0]` is the
/// total mass μ₀ of the weight and `beta[i]` for i>0 the squared
/// sub-diagonal entries.
fn golub_welsch(alpha: &[Real], beta: &[Real]) -> GaussianQuadrature {
    let n = alpha.len();
    if n == 0 {
        return GaussianQuadrature {
            x: vec![],
            w: vec![],
        };
    }

    let mut jacobi = DMatrix::<Real>::zeros(n, n);
    for i in 0..n {
        jacobi[(i, i)] = alpha[i];
        if i + 1 < n {
            let b = beta[i + 1].abs().sqrt();
            jacobi[(i, i + 1)] = b;
            jacobi[(i + 1, i)] = b;
        }
    }
    let eigen = jacobi.symmetric_eigen();
    let mu0 = beta[0];

    let mut nodes: Vec<(Real, Real)> = (0..n)
        .map(|k| {
            let v0 = eigen.eigenvectors[(0, k)];
            (eigen.eigenvalues[k], mu0 * v0 * v0)
        })
        .collect();
    nodes.sort_by(|a, b| a.0.total_cmp(&b.0));

    GaussianQuadrature {
        x: nodes.iter().map(|p| p.0).collect(),
        w: nodes.iter().map(|p| p.1).collect(),
    }
}
