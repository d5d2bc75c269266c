//! Generalized Black-Scholes process with flat rates and volatility.
//!
//! `dS/S = (r − q) dt + σ dW`
//!
//! where `r` is the risk-free rate, `q` the continuous dividend yield and
//! `σ` the Black volatility, all constant over the life of the snapshot.
//!
//! Concrete variants:
//! * `GeneralizedBlackScholesProcess` — the general form
//! * [`black_scholes_process`] — no dividends
//! * [`black_scholes_merton_process`] — continuous dividend yield

use crate::stochastic_process::StochasticProcess1D;
use ql_core::{ensure, errors::Result, DiscountFactor, Rate, Real, Time, Volatility};

/// A generalized Black-Scholes stochastic process.
///
/// `dS = (r − q) · S · dt + σ · S · dW`
#[derive(Debug, Clone, PartialEq)]
pub struct GeneralizedBlackScholesProcess {
    x0: Real,
    risk_free_rate: Rate,
    dividend_yield: Rate,
    volatility: Volatility,
}

impl GeneralizedBlackScholesProcess {
    /// Create a new process snapshot.
    pub fn new(
        x0: Real,
        risk_free_rate: Rate,
        dividend_yield: Rate,
        volatility: Volatility,
    ) -> Result<Self> {
        ensure!(x0 > 0.0, "spot must be positive, got {x0}");
        ensure!(volatility >= 0.0, "volatility must be non-negative, got {volatility}");
        Ok(Self {
            x0,
            risk_free_rate,
            dividend_yield,
            volatility,
        })
    }

    /// The spot price.
    pub fn spot(&self) -> Real {
        self.x0
    }

    /// Continuously compounded risk-free rate.
    pub fn risk_free_rate(&self) -> Rate {
        self.risk_free_rate
    }

    /// Continuous dividend yield.
    pub fn dividend_yield(&self) -> Rate {
        self.dividend_yield
    }

    /// Black volatility.
    pub fn volatility(&self) -> Volatility {
        self.volatility
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
        self.x0 * ((self.risk_free_rate - self.dividend_yield) * t).exp()
    }
}

impl StochasticProcess1D for GeneralizedBlackScholesProcess {
    fn x0(&self) -> Real {
        self.x0
    }

    fn drift_1d(&self, _t: Time, x: Real) -> Real {
        (self.risk_free_rate - self.dividend_yield) * x
    }

    fn diffusion_1d(&self, _t: Time, x: Real) -> Real {
        self.volatility * x
    }

    fn expectation_1d(&self, _t: Time, x: Real, dt: Time) -> Real {
        x * ((self.risk_free_rate - self.dividend_yield) * dt).exp()
    }

    fn evolve_1d(&self, _t: Time, x: Real, dt: Time, dw: Real) -> Real {
        // exact lognormal step
        let sigma = self.volatility;
        x * ((self.risk_free_rate - self.dividend_yield - 0.5 * sigma * sigma) * dt
            + sigma * dt.sqrt() * dw)
            .exp()
    }
}

/// A Black-Scholes process with no dividends (`q = 0`).
pub fn black_scholes_process(
    x0: Real,
    risk_free_rate: Rate,
    volatility: Volatility,
) -> Result<GeneralizedBlackScholesProcess> {
    GeneralizedBlackScholesProcess::new(x0, risk_free_rate, 0.0, volatility)
}

/// A Black-Scholes-Merton process with continuous dividend yield.
pub fn black_scholes_merton_process(
    x0: Real,
    risk_free_rate: Rate,
    dividend_yield: Rate,
    volatility: Volatility,
) -> Result<GeneralizedBlackScholesProcess> {
    GeneralizedBlackScholesProcess::new(x0, risk_free_rate, dividend_yield, volatility)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn make_bsm() -> GeneralizedBlackScholesProcess {
        black_scholes_merton_process(100.0, 0.05, 0.02, 0.20).unwrap()
    }

    #[test]
    fn bsm_forward_and_discounts() {
        let p = make_bsm();
        assert_abs_diff_eq!(p.forward(1.0), 100.0 * 0.03_f64.exp(), epsilon = 1e-12);
        assert_abs_diff_eq!(p.risk_free_discount(2.0), (-0.1_f64).exp(), epsilon = 1e-15);
        assert_abs_diff_eq!(p.dividend_discount(2.0), (-0.04_f64).exp(), epsilon = 1e-15);
    }

    #[test]
    fn bsm_diffusion() {
        let p = make_bsm();
        assert_abs_diff_eq!(p.diffusion_1d(0.0, 100.0), 20.0, epsilon = 1e-10);
    }

    #[test]
    fn bsm_evolve_zero_noise() {
        let p = make_bsm();
        let x_new = p.evolve_1d(0.0, 100.0, 1.0, 0.0);
        // S * exp((r-q-σ²/2)*dt) = 100 * exp(0.01)
        assert_abs_diff_eq!(x_new, 100.0 * (0.01_f64).exp(), epsilon = 1e-10);
    }

    #[test]
    fn black_scholes_no_div() {
        let p = black_scholes_process(100.0, 0.05, 0.20).unwrap();
        assert_abs_diff_eq!(p.dividend_yield(), 0.0, epsilon = 1e-15);
        assert!(black_scholes_process(-1.0, 0.05, 0.2).is_err());
    }
}
