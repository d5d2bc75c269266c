//! Heston stochastic volatility process.
//!
//! The Heston model describes two coupled SDEs:
//!
//! ```text
//! dS = (r − q) S dt + √v S dW₁
//! dv = κ(θ − v) dt + σ √v dW₂
//! dW₁ dW₂ = ρ dt
//! ```
//!
//! The finite-difference engine works on `(ln S, v)`.

use crate::square_root_process::SquareRootProcess;
use ql_core::{ensure, errors::Result, DiscountFactor, Rate, Real, Time};

/// The Heston stochastic volatility process with flat rates.
///
/// * `v0`    — initial variance
/// * `kappa` — mean-reversion speed of variance
/// * `theta` — long-run variance level
/// * `sigma` — vol-of-vol
/// * `rho`   — correlation between the two Brownian motions
#[derive(Debug, Clone, PartialEq)]
pub struct HestonProcess {
    s0: Real,
    v0: Real,
    risk_free_rate: Rate,
    dividend_yield: Rate,
    kappa: Real,
    theta: Real,
    sigma: Real,
    rho: Real,
}

impl HestonProcess {
    /// Create a new Heston process.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        s0: Real,
        v0: Real,
        risk_free_rate: Rate,
        dividend_yield: Rate,
        kappa: Real,
        theta: Real,
        sigma: Real,
        rho: Real,
    ) -> Result<Self> {
        ensure!(s0 > 0.0, "spot must be positive, got {s0}");
        ensure!(
            (-1.0..=1.0).contains(&rho),
            "correlation ρ must be in [-1, 1], got {rho}"
        );
        ensure!(v0 >= 0.0, "initial variance must be non-negative, got {v0}");
        ensure!(kappa > 0.0, "mean reversion speed must be positive, got {kappa}");
        ensure!(theta >= 0.0, "long-run variance must be non-negative, got {theta}");
        ensure!(sigma > 0.0, "vol-of-vol must be positive, got {sigma}");

        Ok(Self {
            s0,
            v0,
            risk_free_rate,
            dividend_yield,
            kappa,
            theta,
            sigma,
            rho,
        })
    }

    /// Spot price.
    pub fn s0(&self) -> Real {
        self.s0
    }

    /// Initial variance.
    pub fn v0(&self) -> Real {
        self.v0
    }

    /// Mean-reversion speed.
    pub fn kappa(&self) -> Real {
        self.kappa
    }

    /// Long-run variance.
    pub fn theta(&self) -> Real {
        self.theta
    }

    /// Vol-of-vol.
    pub fn sigma(&self) -> Real {
        self.sigma
    }

    /// Correlation.
    pub fn rho(&self) -> Real {
        self.rho
    }

    /// Continuously compounded risk-free rate.
    pub fn risk_free_rate(&self) -> Rate {
        self.risk_free_rate
    }

    /// Continuous dividend yield.
    pub fn dividend_yield(&self) -> Rate {
        self.dividend_yield
    }

    /// Risk-free discount factor to `t`.
    pub fn risk_free_discount(&self, t: Time) -> DiscountFactor {
        (-self.risk_free_rate * t).exp()
    }

    /// Dividend discount factor to `t`.
    pub fn dividend_discount(&self, t: Time) -> DiscountFactor {
        (-self.dividend_yield * t).exp()
    }

    /// Forward price `S·e^{(r−q)t}`.
    pub fn forward(&self, t: Time) -> Real {
        self.s0 * ((self.risk_free_rate - self.dividend_yield) * t).exp()
    }

    /// The variance factor as a stand-alone square-root process.
    pub fn variance_process(&self) -> Result<SquareRootProcess> {
        SquareRootProcess::new(self.kappa, self.theta, self.sigma, self.v0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stochastic_process::StochasticProcess1D;
    use approx::assert_abs_diff_eq;

    fn make_heston() -> HestonProcess {
        HestonProcess::new(100.0, 0.04, 0.05, 0.02, 1.5, 0.04, 0.3, -0.7).unwrap()
    }

    #[test]
    fn heston_accessors() {
        let p = make_heston();
        assert_abs_diff_eq!(p.s0(), 100.0, epsilon = 1e-15);
        assert_abs_diff_eq!(p.v0(), 0.04, epsilon = 1e-15);
        assert_abs_diff_eq!(p.forward(1.0), 100.0 * 0.03_f64.exp(), epsilon = 1e-12);
    }

    #[test]
    fn heston_variance_process() {
        let p = make_heston();
        let v = p.variance_process().unwrap();
        assert_abs_diff_eq!(v.x0(), 0.04, epsilon = 1e-15);
        assert_abs_diff_eq!(v.drift_1d(0.0, 0.04), 0.0, epsilon = 1e-15);
    }

    #[test]
    fn heston_rejects_bad_correlation() {
        assert!(HestonProcess::new(100.0, 0.04, 0.05, 0.0, 1.5, 0.04, 0.3, -1.2).is_err());
        assert!(HestonProcess::new(100.0, -0.04, 0.05, 0.0, 1.5, 0.04, 0.3, 0.0).is_err());
    }
}
