//! Grid for the jump factor of an OU process with exponential jumps.
//!
//! The jump factor `dY = -βY dt + J dN` with `J ~ Exp(η)` and intensity `λ`
//! has a Gamma(λ/β, η) stationary law. The nodes are exponential quantiles
//! rescaled by `1/(1 - exp(-β/λ))`.

use ql_core::{errors::Result, Real};
use ql_math::distributions::GammaDistribution;

use super::Fdm1dMesher;

/// Jump-axis mesher `x_i = -ln(1-p_i)/η · 1/(1-exp(-β/λ))`, `p_i` uniform on
/// `[0, 1-eps]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialJump1dMesher {
    mesher: Fdm1dMesher,
    beta: Real,
    jump_intensity: Real,
    eta: Real,
}

impl ExponentialJump1dMesher {
    /// Mesher with `eps = 1e-3`.
    pub fn new(size: usize, beta: Real, jump_intensity: Real, eta: Real) -> Result<Self> {
        Self::with_epsilon(size, beta, jump_intensity, eta, 1e-3)
    }

    /// Mesher cutting off `eps` of the upper tail.
    pub fn with_epsilon(
        size: usize,
        beta: Real,
        jump_intensity: Real,
        eta: Real,
        eps: Real,
    ) -> Result<Self> {
        ql_core::ensure!(eps > 0.0 && eps < 1.0, "eps must be in (0, 1), got {eps}");
        ql_core::ensure!(size >= 2, "jump mesher needs at least two nodes, got {size}");
        ql_core::ensure!(
            beta > 0.0 && jump_intensity > 0.0 && eta > 0.0,
            "beta, jump intensity and eta must be positive"
        );

        let dx = (1.0 - eps) / (size - 1) as Real;
        let scale = 1.0 / (1.0 - (-beta / jump_intensity).exp());
        let locations = (0..size)
            .map(|i| {
                let p = i as Real * dx;
                scale * (-(1.0 - p).ln() / eta)
            })
            .collect();

        Ok(Self {
            mesher: Fdm1dMesher::from_locations(locations)?,
            beta,
            jump_intensity,
            eta,
        })
    }

    fn stationary_law(&self) -> Result<GammaDistribution> {
        GammaDistribution::new(self.jump_intensity / self.beta, self.eta)
    }

    /// Stationary density of the jump factor at `x`.
    pub fn jump_size_density(&self, x: Real) -> Result<Real> {
        Ok(self.stationary_law()?.pdf(x))
    }

    /// Stationary distribution function of the jump factor at `x`.
    pub fn jump_size_distribution(&self, x: Real) -> Result<Real> {
        Ok(self.stationary_law()?.cdf(x))
    }
}

impl_fdm_1d_mesher!(ExponentialJump1dMesher);

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn starts_at_zero_and_grows() {
        let m = ExponentialJump1dMesher::new(20, 5.0, 4.0, 2.0).unwrap();
        assert_eq!(m.lower_bound(), 0.0);
        assert!(m.locations().windows(2).all(|w| w[1] > w[0]));
        let scale = 1.0 / (1.0 - (-5.0_f64 / 4.0).exp());
        assert_relative_eq!(m.upper_bound(), -scale * 1e-3_f64.ln() / 2.0, max_relative = 1e-12);
    }

    #[test]
    fn stationary_density_integrates_to_distribution() {
        let m = ExponentialJump1dMesher::new(10, 2.0, 4.0, 3.0).unwrap();
        let n = 20_000;
        let h = 2.0 / n as Real;
        let mut integral = 0.0;
        for i in 0..n {
            let x = (i as Real + 0.5) * h;
            integral += h * m.jump_size_density(x).unwrap();
        }
        assert_relative_eq!(
            integral,
            m.jump_size_distribution(2.0).unwrap(),
            max_relative = 1e-4
        );
    }
}
