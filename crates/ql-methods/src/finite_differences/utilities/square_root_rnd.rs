use ql_core::{errors::Result, Real, Time};
use ql_math::distributions::{GammaDistribution, NonCentralChiSquareDistribution};

/// Transition law of the square-root process
/// `dv = κ(θ - v)dt + σ√v dW` started at `v0`.
///
/// At time `t`, `k·v` is non-central chi-square with `d = 4κθ/σ²` degrees of
/// freedom and non-centrality `k·v0·e^{-κt}`, where
/// `k = 4κ / (σ²(1 - e^{-κt}))`.
#[derive(Debug, Clone, Copy)]
pub struct SquareRootProcessRNDCalculator {
    v0: Real,
    kappa: Real,
    theta: Real,
    sigma: Real,
}

impl SquareRootProcessRNDCalculator {
    /// Calculator for the given parameters.
    pub fn new(v0: Real, kappa: Real, theta: Real, sigma: Real) -> Result<Self> {
        ql_core::ensure!(
            kappa > 0.0 && theta > 0.0 && sigma > 0.0,
            "square-root parameters must be positive: kappa {kappa}, theta {theta}, sigma {sigma}"
        );
        Ok(Self {
            v0,
            kappa,
            theta,
            sigma,
        })
    }

    fn scaled(&self, t: Time) -> Result<(Real, NonCentralChiSquareDistribution)> {
        ql_core::ensure!(t > 0.0, "transition law needs t > 0, got {t}");
        let e = (-self.kappa * t).exp();
        let k = 4.0 * self.kappa / (self.sigma * self.sigma * (1.0 - e));
        let df = 4.0 * self.kappa * self.theta / (self.sigma * self.sigma);
        Ok((k, NonCentralChiSquareDistribution::new(df, k * self.v0 * e)?))
    }

    /// Density of `v` at time `t`.
    pub fn pdf(&self, v: Real, t: Time) -> Result<Real> {
        let (k, dist) = self.scaled(t)?;
        Ok(k * dist.pdf(k * v))
    }

    /// Distribution function of `v` at time `t`.
    pub fn cdf(&self, v: Real, t: Time) -> Result<Real> {
        let (k, dist) = self.scaled(t)?;
        dist.cdf(k * v)
    }

    /// Quantile of `v` at time `t`.
    pub fn invcdf(&self, q: Real, t: Time) -> Result<Real> {
        let (k, dist) = self.scaled(t)?;
        Ok(dist.inverse_cdf(q, 100, 1e-10)? / k)
    }

    /// Stationary gamma law with shape `2κθ/σ²` and mean `θ`.
    pub fn stationary_distribution(&self) -> Result<GammaDistribution> {
        let shape = 2.0 * self.kappa * self.theta / (self.sigma * self.sigma);
        GammaDistribution::new(shape, shape / self.theta)
    }

    /// Stationary density.
    pub fn stationary_pdf(&self, v: Real) -> Result<Real> {
        Ok(self.stationary_distribution()?.pdf(v))
    }

    /// Stationary distribution function.
    pub fn stationary_cdf(&self, v: Real) -> Result<Real> {
        Ok(self.stationary_distribution()?.cdf(v))
    }

    /// Stationary quantile.
    pub fn stationary_invcdf(&self, q: Real) -> Result<Real> {
        self.stationary_distribution()?.inverse_cdf(q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ql_math::integrals::discrete_simpson;

    #[test]
    fn density_integrates_to_one_and_approaches_stationarity() {
        let calc = SquareRootProcessRNDCalculator::new(0.4, 1.2, 0.4, 0.7).unwrap();
        let v: Vec<Real> = (1..=4000).map(|i| i as Real * 1e-3).collect();
        let p: Vec<Real> = v.iter().map(|&v| calc.pdf(v, 1.0).unwrap()).collect();
        assert_abs_diff_eq!(discrete_simpson(&v, &p), 1.0, epsilon = 2e-3);

        for &x in &[0.1, 0.4, 1.0] {
            assert_abs_diff_eq!(
                calc.pdf(x, 30.0).unwrap(),
                calc.stationary_pdf(x).unwrap(),
                epsilon = 1e-6
            );
        }
    }

    #[test]
    fn quantiles_invert_the_distribution() {
        let calc = SquareRootProcessRNDCalculator::new(0.04, 1.5, 0.04, 0.3).unwrap();
        let q = calc.invcdf(0.75, 0.5).unwrap();
        assert_abs_diff_eq!(calc.cdf(q, 0.5).unwrap(), 0.75, epsilon = 1e-6);
        let qs = calc.stationary_invcdf(0.25).unwrap();
        assert_abs_diff_eq!(calc.stationary_cdf(qs).unwrap(), 0.25, epsilon = 1e-6);
    }

    #[test]
    fn rejects_time_zero() {
        let calc = SquareRootProcessRNDCalculator::new(0.04, 1.5, 0.04, 0.3).unwrap();
        assert!(calc.pdf(0.04, 0.0).is_err());
    }
}
