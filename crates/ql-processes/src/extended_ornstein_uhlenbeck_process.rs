//! Ornstein-Uhlenbeck process with a time-dependent mean level.
//!
//! ```text
//! dX = a(b(t) − X) dt + σ dW
//! ```
//!
//! Used for de-seasonalised log commodity prices, where `b(t)` carries the
//! forward-curve shape.

use std::fmt;
use std::sync::Arc;

use crate::stochastic_process::StochasticProcess1D;
use ql_core::{ensure, errors::Result, Real, Time};
use ql_math::integrals::GaussLegendreIntegration;

/// Time-dependent mean level `b(t)`.
pub type LevelFn = Arc<dyn Fn(Time) -> Real + Send + Sync>;

/// How `a∫ b(u) e^{-a(t+Δt-u)} du` is approximated over one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Discretization {
    /// `b` frozen at the mid point of the step.
    #[default]
    MidPoint,
    /// `b` linear between the step end points (exact for linear levels).
    Trapezoidal,
    /// 32-point Gauss-Legendre quadrature of the level integral.
    GaussLegendre,
}

/// Extended Ornstein-Uhlenbeck process.
#[derive(Clone)]
pub struct ExtendedOrnsteinUhlenbeckProcess {
    speed: Real,
    volatility: Real,
    x0: Real,
    level: LevelFn,
    discretization: Discretization,
}

impl fmt::Debug for ExtendedOrnsteinUhlenbeckProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedOrnsteinUhlenbeckProcess")
            .field("speed", &self.speed)
            .field("volatility", &self.volatility)
            .field("x0", &self.x0)
            .field("discretization", &self.discretization)
            .finish_non_exhaustive()
    }
}

impl ExtendedOrnsteinUhlenbeckProcess {
    /// Create the process. `speed` must be positive.
    pub fn new(
        speed: Real,
        volatility: Real,
        x0: Real,
        level: LevelFn,
        discretization: Discretization,
    ) -> Result<Self> {
        ensure!(speed > 0.0, "mean-reversion speed must be positive, got {speed}");
        ensure!(volatility >= 0.0, "volatility must be non-negative, got {volatility}");
        Ok(Self {
            speed,
            volatility,
            x0,
            level,
            discretization,
        })
    }

    /// Mean-reversion speed `a`.
    pub fn speed(&self) -> Real {
        self.speed
    }

    /// Volatility `σ`.
    pub fn volatility(&self) -> Real {
        self.volatility
    }

    /// Level `b(t)`.
    pub fn level(&self, t: Time) -> Real {
        (self.level)(t)
    }

    /// Shared handle on the level function.
    pub fn level_fn(&self) -> LevelFn {
        Arc::clone(&self.level)
    }
}

impl StochasticProcess1D for ExtendedOrnsteinUhlenbeckProcess {
    fn x0(&self) -> Real {
        self.x0
    }

    fn drift_1d(&self, t: Time, x: Real) -> Real {
        self.speed * (self.level(t) - x)
    }

    fn diffusion_1d(&self, _t: Time, _x: Real) -> Real {
        self.volatility
    }

    fn expectation_1d(&self, t: Time, x: Real, dt: Time) -> Real {
        let a = self.speed;
        let ex = (-a * dt).exp();
        let level_part = match self.discretization {
            Discretization::MidPoint => self.level(t + 0.5 * dt) * (1.0 - ex),
            Discretization::Trapezoidal => {
                let b1 = self.level(t + dt);
                let b0 = self.level(t);
                b1 - ex * b0 - (b1 - b0) / (a * dt) * (1.0 - ex)
            }
            Discretization::GaussLegendre => {
                let end = t + dt;
                a * GaussLegendreIntegration::integrate(
                    32,
                    |u| self.level(u) * (-a * (end - u)).exp(),
                    t,
                    end,
                )
            }
        };
        x * ex + level_part
    }

    fn std_deviation_1d(&self, t: Time, x: Real, dt: Time) -> Real {
        self.variance_1d(t, x, dt).sqrt()
    }

    fn variance_1d(&self, _t: Time, _x: Real, dt: Time) -> Real {
        let a = self.speed;
        self.volatility * self.volatility * (1.0 - (-2.0 * a * dt).exp()) / (2.0 * a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn process(level: LevelFn, d: Discretization) -> ExtendedOrnsteinUhlenbeckProcess {
        ExtendedOrnsteinUhlenbeckProcess::new(1.5, 0.3, 0.2, level, d).unwrap()
    }

    #[test]
    fn constant_level_matches_plain_ou() {
        let level: LevelFn = Arc::new(|_| 0.7);
        for d in [
            Discretization::MidPoint,
            Discretization::Trapezoidal,
            Discretization::GaussLegendre,
        ] {
            let p = process(level.clone(), d);
            let expected = 0.7 + (0.2 - 0.7) * (-1.5_f64 * 0.5).exp();
            assert_abs_diff_eq!(p.expectation_1d(0.0, 0.2, 0.5), expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn trapezoidal_is_exact_for_linear_level() {
        let level: LevelFn = Arc::new(|t| 0.1 + 0.4 * t);
        let trap = process(level.clone(), Discretization::Trapezoidal);
        let quad = process(level, Discretization::GaussLegendre);
        let (t, dt) = (0.3, 0.8);
        assert_abs_diff_eq!(
            trap.expectation_1d(t, 0.2, dt),
            quad.expectation_1d(t, 0.2, dt),
            epsilon = 1e-12
        );
    }

    #[test]
    fn variance_is_ou_variance() {
        let p = process(Arc::new(|t| t.sin()), Discretization::MidPoint);
        let expected = 0.09 * (1.0 - (-3.0_f64).exp()) / 3.0;
        assert_abs_diff_eq!(p.variance_1d(0.0, 0.0, 1.0), expected, epsilon = 1e-15);
        assert_abs_diff_eq!(p.drift_1d(0.0, 0.0), 0.0, epsilon = 1e-15);
    }
}
