//! Constant-coefficient Ornstein-Uhlenbeck process
//! `dX = a (b - X) dt + σ dW`.
//!
//! Its transition law is Gaussian with closed-form moments, so the
//! process-driven meshers get exact quantiles instead of Euler ones.

use crate::stochastic_process::StochasticProcess1D;
use ql_core::{ensure, errors::Result, Real, Time};

/// Below this mean-reversion speed the process is treated as a
/// scaled Brownian motion.
const MIN_SPEED: Real = 1e-15;

/// Mean-reverting Gaussian process with constant speed, level and volatility.
#[derive(Debug, Clone)]
pub struct OrnsteinUhlenbeckProcess {
    x0: Real,
    speed: Real,
    level: Real,
    volatility: Real,
}

impl OrnsteinUhlenbeckProcess {
    /// `speed` and `volatility` must be non-negative.
    pub fn new(speed: Real, volatility: Real, x0: Real, level: Real) -> Result<Self> {
        ensure!(speed >= 0.0, "negative mean-reversion speed {speed}");
        ensure!(volatility >= 0.0, "negative volatility {volatility}");
        Ok(Self {
            x0,
            speed,
            level,
            volatility,
        })
    }

    /// Mean-reversion speed `a`.
    pub fn speed(&self) -> Real {
        self.speed
    }

    /// Long-run level.
    pub fn level(&self) -> Real {
        self.level
    }

    /// Diffusion coefficient `σ`.
    pub fn volatility(&self) -> Real {
        self.volatility
    }

    /// `(1 - e^{-2 a dt}) / 2a`, the variance of the noise accumulated over
    /// `dt` per unit of `σ²`.
    fn variance_factor(&self, dt: Time) -> Real {
        if self.speed < MIN_SPEED {
            dt
        } else {
            -(-2.0 * self.speed * dt).exp_m1() / (2.0 * self.speed)
        }
    }
}

impl StochasticProcess1D for OrnsteinUhlenbeckProcess {
    fn x0(&self) -> Real {
        self.x0
    }

    fn drift_1d(&self, _t: Time, x: Real) -> Real {
        self.speed * (self.level - x)
    }

    fn diffusion_1d(&self, _t: Time, _x: Real) -> Real {
        self.volatility
    }

    fn expectation_1d(&self, _t: Time, x: Real, dt: Time) -> Real {
        let decay = (-self.speed * dt).exp();
        self.level + (x - self.level) * decay
    }

    fn variance_1d(&self, _t: Time, _x: Real, dt: Time) -> Real {
        self.volatility.powi(2) * self.variance_factor(dt)
    }

    fn std_deviation_1d(&self, t: Time, x: Real, dt: Time) -> Real {
        self.variance_1d(t, x, dt).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn ou(speed: Real, level: Real) -> OrnsteinUhlenbeckProcess {
        OrnsteinUhlenbeckProcess::new(speed, 0.3, 0.5, level).unwrap()
    }

    #[test]
    fn pulls_towards_the_level() {
        let p = ou(2.0, 1.0);
        assert_abs_diff_eq!(p.drift_1d(0.0, 0.5), 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(p.drift_1d(0.0, 1.5), -1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(p.expectation_1d(0.0, 1.0, 0.7), 1.0, epsilon = 1e-15);

        let m = p.expectation_1d(0.0, 0.5, 0.5);
        assert_abs_diff_eq!(m, 1.0 - 0.5 * (-1f64).exp(), epsilon = 1e-14);
    }

    #[test]
    fn variance_saturates_at_the_stationary_level() {
        let p = ou(2.0, 0.0);
        let stationary = 0.09 / 4.0;
        assert!(p.variance_1d(0.0, 0.0, 0.1) < stationary);
        assert_abs_diff_eq!(p.variance_1d(0.0, 0.0, 50.0), stationary, epsilon = 1e-14);
        assert_abs_diff_eq!(
            p.std_deviation_1d(0.0, 0.0, 0.3).powi(2),
            p.variance_1d(0.0, 0.0, 0.3),
            epsilon = 1e-15
        );
    }

    #[test]
    fn zero_speed_is_brownian() {
        let p = ou(0.0, 0.0);
        assert_abs_diff_eq!(p.expectation_1d(0.0, 0.5, 2.0), 0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(p.variance_1d(0.0, 0.5, 2.0), 0.18, epsilon = 1e-15);
    }

    #[test]
    fn evolve_is_mean_plus_scaled_shock() {
        let p = ou(1.0, 0.0);
        let (m, s) = (p.expectation_1d(0.0, 0.5, 0.25), p.std_deviation_1d(0.0, 0.5, 0.25));
        assert_abs_diff_eq!(p.evolve_1d(0.0, 0.5, 0.25, -1.5), m - 1.5 * s, epsilon = 1e-15);
    }

    #[test]
    fn rejects_negative_parameters() {
        assert!(OrnsteinUhlenbeckProcess::new(-1.0, 0.2, 0.0, 0.0).is_err());
        assert!(OrnsteinUhlenbeckProcess::new(1.0, -0.2, 0.0, 0.0).is_err());
    }
}
