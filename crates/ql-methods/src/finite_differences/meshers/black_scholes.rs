//! Log-spot grid for Black-Scholes type equity dimensions.

use ql_core::{errors::Result, Real, Time, Volatility};
use ql_math::normal_cdf_inverse;
use ql_processes::GeneralizedBlackScholesProcess;

use super::{Concentrating1dMesher, Fdm1dMesher, Uniform1dMesher};

/// Tuning knobs of [`FdmBlackScholesMesher`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlackScholesMesherOptions {
    /// Explicit lower bound in log-spot, overriding the quantile bound.
    pub x_min: Option<Real>,
    /// Explicit upper bound in log-spot, overriding the quantile bound.
    pub x_max: Option<Real>,
    /// Tail probability cut off on each side.
    pub eps: Real,
    /// Widening factor applied to the quantile distance.
    pub scale_factor: Real,
    /// Concentration `(spot, density)` given in spot terms.
    pub c_point: Option<(Real, Real)>,
}

impl Default for BlackScholesMesherOptions {
    fn default() -> Self {
        Self {
            x_min: None,
            x_max: None,
            eps: 1e-4,
            scale_factor: 1.5,
            c_point: None,
        }
    }
}

/// Log-spot mesher spanning the `eps`-quantiles of the terminal distribution.
///
/// The bounds are
/// `ln(min(S, F_T)) - σ√T·N⁻¹(1-eps)·scale` and
/// `ln(max(S, F_T)) + σ√T·N⁻¹(1-eps)·scale`.
#[derive(Debug, Clone, PartialEq)]
pub struct FdmBlackScholesMesher {
    mesher: Fdm1dMesher,
}

impl FdmBlackScholesMesher {
    /// Mesher with default options.
    pub fn new(size: usize, process: &GeneralizedBlackScholesProcess, maturity: Time) -> Result<Self> {
        Self::with_options(size, process, maturity, &BlackScholesMesherOptions::default())
    }

    /// Mesher with explicit options.
    pub fn with_options(
        size: usize,
        process: &GeneralizedBlackScholesProcess,
        maturity: Time,
        options: &BlackScholesMesherOptions,
    ) -> Result<Self> {
        let spot = process.spot();
        let forward = process.forward(maturity);
        let lo = spot.min(forward).ln();
        let hi = spot.max(forward).ln();

        let normal_inv_eps = normal_cdf_inverse(1.0 - options.eps);
        let sigma_sqrt_t = process.volatility() * maturity.sqrt();

        let x_min = options
            .x_min
            .unwrap_or(lo - sigma_sqrt_t * normal_inv_eps * options.scale_factor);
        let x_max = options
            .x_max
            .unwrap_or(hi + sigma_sqrt_t * normal_inv_eps * options.scale_factor);

        let mesher = match options.c_point {
            Some((c, density)) if (x_min..=x_max).contains(&c.ln()) => {
                Concentrating1dMesher::new(x_min, x_max, size, Some((c.ln(), density)), false)?
                    .into()
            }
            _ => Uniform1dMesher::new(x_min, x_max, size)?.into(),
        };
        Ok(Self { mesher })
    }

    /// Flat-rate Black-Scholes snapshot with volatility `vol`.
    pub fn process_helper(
        spot: Real,
        dividend_yield: Real,
        risk_free_rate: Real,
        vol: Volatility,
    ) -> Result<GeneralizedBlackScholesProcess> {
        GeneralizedBlackScholesProcess::new(spot, risk_free_rate, dividend_yield, vol)
    }
}

impl_fdm_1d_mesher!(FdmBlackScholesMesher);

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn bounds_cover_spot_and_forward() {
        let process = GeneralizedBlackScholesProcess::new(100.0, 0.05, 0.0, 0.2).unwrap();
        let m = FdmBlackScholesMesher::new(101, &process, 1.0).unwrap();
        let width = 0.2 * normal_cdf_inverse(1.0 - 1e-4) * 1.5;
        assert_abs_diff_eq!(m.lower_bound(), 100.0_f64.ln() - width, epsilon = 1e-12);
        assert_abs_diff_eq!(
            m.upper_bound(),
            process.forward(1.0).ln() + width,
            epsilon = 1e-12
        );
    }

    #[test]
    fn explicit_bounds_and_concentration() {
        let process = GeneralizedBlackScholesProcess::new(100.0, 0.05, 0.0, 0.2).unwrap();
        let options = BlackScholesMesherOptions {
            x_min: Some(80.0_f64.ln()),
            c_point: Some((100.0, 0.1)),
            ..Default::default()
        };
        let m = FdmBlackScholesMesher::with_options(50, &process, 1.0, &options).unwrap();
        assert_eq!(m.lower_bound(), 80.0_f64.ln());
        // concentrated around ln(100): spacing there is finer than at the top
        let i = m
            .locations()
            .iter()
            .position(|&x| x > 100.0_f64.ln())
            .unwrap();
        assert!(m.dplus(i) < m.dminus(m.size() - 1));
    }

    #[test]
    fn concentration_outside_bounds_is_ignored() {
        let process = GeneralizedBlackScholesProcess::new(100.0, 0.0, 0.0, 0.2).unwrap();
        let options = BlackScholesMesherOptions {
            c_point: Some((1e6, 0.1)),
            ..Default::default()
        };
        let m = FdmBlackScholesMesher::with_options(11, &process, 1.0, &options).unwrap();
        assert_abs_diff_eq!(m.dplus(0), m.dplus(9), epsilon = 1e-12);
    }
}
