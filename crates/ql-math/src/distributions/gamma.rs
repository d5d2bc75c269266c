//! Gamma law in shape/rate form over `statrs`.
//!
//! Stationary distribution of the square-root process and of the
//! exponential-jump factor.

use ql_core::{
    ensure,
    errors::{Error, Result},
    Real,
};
use statrs::distribution::{Continuous, ContinuousCDF, Gamma};

/// `Γ(shape, rate)` with density `rate^a x^{a-1} e^{-rate x} / Γ(a)`.
#[derive(Debug, Clone)]
pub struct GammaDistribution {
    inner: Gamma,
}

impl GammaDistribution {
    /// Both parameters must be positive.
    pub fn new(shape: Real, rate: Real) -> Result<Self> {
        ensure!(
            shape > 0.0 && rate > 0.0,
            "gamma law needs positive shape and rate, got ({shape}, {rate})"
        );
        let inner = Gamma::new(shape, rate).map_err(|e| Error::InvalidArgument(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Shape parameter `k`.
    pub fn shape(&self) -> Real {
        self.inner.shape()
    }

    /// Rate parameter, the inverse scale.
    pub fn rate(&self) -> Real {
        self.inner.rate()
    }

    /// Density; zero on the negative half-line.
    pub fn pdf(&self, x: Real) -> Real {
        if x < 0.0 {
            0.0
        } else {
            self.inner.pdf(x)
        }
    }

    /// `P(X ≤ x)`.
    pub fn cdf(&self, x: Real) -> Real {
        if x <= 0.0 {
            0.0
        } else {
            self.inner.cdf(x)
        }
    }

    /// Quantile for `p ∈ [0, 1]`.
    pub fn inverse_cdf(&self, p: Real) -> Result<Real> {
        ensure!((0.0..=1.0).contains(&p), "probability {p} outside [0, 1]");
        Ok(self.inner.inverse_cdf(p))
    }

    /// `shape / rate`.
    pub fn mean(&self) -> Real {
        self.shape() / self.rate()
    }
}
