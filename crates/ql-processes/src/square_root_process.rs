//! Cox-Ingersoll-Ross process `dX = κ(θ - X) dt + σ √X dW`.
//!
//! This is the variance factor of the Heston model. Both conditional
//! moments are available in closed form, which the process-driven meshers
//! use for their quantile bounds.

use crate::stochastic_process::StochasticProcess1D;
use ql_core::{ensure, errors::Result, Real, Time};

/// Square-root diffusion with mean reversion towards `mean`.
#[derive(Debug, Clone, PartialEq)]
pub struct SquareRootProcess {
    x0: Real,
    speed: Real,
    mean: Real,
    volatility: Real,
}

impl SquareRootProcess {
    /// Requires `speed > 0`, `volatility > 0` and non-negative `mean`
    /// and `x0`.
    pub fn new(speed: Real, mean: Real, volatility: Real, x0: Real) -> Result<Self> {
        ensure!(
            speed > 0.0 && volatility > 0.0,
            "CIR speed and volatility must be positive: κ = {speed}, σ = {volatility}"
        );
        ensure!(
            mean >= 0.0 && x0 >= 0.0,
            "CIR level and start must be non-negative: θ = {mean}, x0 = {x0}"
        );
        Ok(Self {
            x0,
            speed,
            mean,
            volatility,
        })
    }

    /// Mean-reversion speed `κ`.
    pub fn speed(&self) -> Real {
        self.speed
    }

    /// Long-run mean `θ`.
    pub fn mean(&self) -> Real {
        self.mean
    }

    /// Vol of the square-root diffusion `σ`.
    pub fn volatility(&self) -> Real {
        self.volatility
    }

    /// `2κθ/σ²`. Zero is unattainable from above once this is at least one.
    pub fn feller_ratio(&self) -> Real {
        2.0 * self.speed * self.mean / self.volatility.powi(2)
    }
}

impl StochasticProcess1D for SquareRootProcess {
    fn x0(&self) -> Real {
        self.x0
    }

    fn drift_1d(&self, _t: Time, x: Real) -> Real {
        self.speed * (self.mean - x)
    }

    fn diffusion_1d(&self, _t: Time, x: Real) -> Real {
        self.volatility * x.max(0.0).sqrt()
    }

    fn expectation_1d(&self, _t: Time, x: Real, dt: Time) -> Real {
        self.mean + (x - self.mean) * (-self.speed * dt).exp()
    }

    // Var = x σ²/κ (e^{-κt} - e^{-2κt}) + θ σ²/2κ (1 - e^{-κt})²
    fn variance_1d(&self, _t: Time, x: Real, dt: Time) -> Real {
        let k = self.speed;
        let e = (-k * dt).exp();
        let s2 = self.volatility.powi(2);
        x.max(0.0) * s2 / k * e * (1.0 - e) + self.mean * s2 / (2.0 * k) * (1.0 - e).powi(2)
    }

    fn std_deviation_1d(&self, t: Time, x: Real, dt: Time) -> Real {
        self.variance_1d(t, x, dt).sqrt()
    }
}
