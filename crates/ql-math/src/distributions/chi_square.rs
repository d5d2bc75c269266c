//! Central and non-central chi-square distributions.
//!
//! The central distribution wraps `statrs`. The non-central one is what the
//! square-root variance mesher needs: the transition law of a CIR process is
//! a scaled non-central chi-square.

use std::cell::RefCell;

use ql_core::{
    ensure,
    errors::{Error, Result},
    Real,
};
use statrs::distribution::{ChiSquared, Continuous, ContinuousCDF};
use statrs::function::gamma::ln_gamma;

use crate::solvers1d::brent_with_max_evaluations;

/// Chi-square distribution with `df` degrees of freedom.
#[derive(Debug, Clone)]
pub struct ChiSquareDistribution {
    dist: ChiSquared,
    df: Real,
}

impl ChiSquareDistribution {
    /// Create a chi-square distribution with the given degrees of freedom.
    pub fn new(df: Real) -> Result<Self> {
        ensure!(df > 0.0, "degrees of freedom must be positive, got {df}");
        let dist = ChiSquared::new(df).map_err(|e| Error::InvalidArgument(e.to_string()))?;
        Ok(Self { dist, df })
    }

    /// Degrees of freedom.
    pub fn df(&self) -> Real {
        self.df
    }

    /// Probability density function.
    pub fn pdf(&self, x: Real) -> Real {
        if x < 0.0 {
            return 0.0;
        }
        self.dist.pdf(x)
    }

    /// Cumulative distribution function P(X ≤ x).
    pub fn cdf(&self, x: Real) -> Real {
        if x <= 0.0 {
            return 0.0;
        }
        self.dist.cdf(x)
    }

    /// Inverse CDF (quantile function).
    pub fn inverse_cdf(&self, p: Real) -> Result<Real> {
        ensure!((0.0..=1.0).contains(&p), "p must be in [0, 1], got {p}");
        Ok(self.dist.inverse_cdf(p))
    }
}

/// Non-central chi-square distribution with `df` degrees of freedom and
/// non-centrality `ncp`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NonCentralChiSquareDistribution {
    df: Real,
    ncp: Real,
}

impl NonCentralChiSquareDistribution {
    const CDF_ERR_MAX: Real = 1e-12;
    const CDF_ITR_MAX: usize = 10_000;

    /// Create the distribution. `df` must be positive and `ncp` non-negative.
    pub fn new(df: Real, ncp: Real) -> Result<Self> {
        ensure!(df > 0.0, "degrees of freedom must be positive, got {df}");
        ensure!(ncp >= 0.0, "non-centrality must be non-negative, got {ncp}");
        Ok(Self { df, ncp })
    }

    /// Degrees of freedom.
    pub fn df(&self) -> Real {
        self.df
    }

    /// Non-centrality parameter.
    pub fn ncp(&self) -> Real {
        self.ncp
    }

    /// Density as a Poisson(ncp/2) mixture of central chi-square densities,
    /// summed outwards from the mode of the mixing weights.
    pub fn pdf(&self, x: Real) -> Real {
        if x <= 0.0 {
            return 0.0;
        }
        let lam = 0.5 * self.ncp;
        let term = |k: usize| -> Real {
            let kf = k as Real;
            let log_poisson = if lam > 0.0 {
                -lam + kf * lam.ln() - ln_gamma(kf + 1.0)
            } else if k == 0 {
                0.0
            } else {
                return 0.0;
            };
            let n = self.df + 2.0 * kf;
            let log_chi2 =
                (0.5 * n - 1.0) * x.ln() - 0.5 * x - 0.5 * n * std::f64::consts::LN_2
                    - ln_gamma(0.5 * n);
            (log_poisson + log_chi2).exp()
        };

        let mode = lam.floor() as usize;
        let mut sum = term(mode);
        let mut k = mode + 1;
        loop {
            let t = term(k);
            sum += t;
            if t <= 1e-16 * sum || k > mode + Self::CDF_ITR_MAX {
                break;
            }
            k += 1;
        }
        for k in (0..mode).rev() {
            let t = term(k);
            sum += t;
            if t <= 1e-16 * sum {
                break;
            }
        }
        sum
    }

    /// Cumulative distribution by Ding's series.
    ///
    /// Fails when the series bound does not drop below `1e-12` within
    /// 10 000 terms.
    pub fn cdf(&self, x: Real) -> Result<Real> {
        if x <= 0.0 {
            return Ok(0.0);
        }
        let lam = 0.5 * self.ncp;
        let mut u = (-lam).exp();
        let mut v = u;
        let x2 = 0.5 * x;
        let f2 = 0.5 * self.df;

        let mut t = if f2 * Real::EPSILON > 0.125
            && (x2 - f2).abs() < Real::EPSILON.sqrt() * f2
        {
            // large-f normal approximation of the leading term
            2.0_f64.exp() / (2.0 * std::f64::consts::PI * (f2 + 1.0)).sqrt()
        } else {
            (f2 * x2.ln() - x2 - ln_gamma(f2 + 1.0)).exp()
        };

        let mut ans = v * t;
        let mut n = 1_usize;
        let mut f_2n = self.df + 2.0;
        let mut f_x_2n = self.df - x + 2.0;
        let mut past_peak = false;

        loop {
            if f_x_2n > 0.0 {
                past_peak = true;
            }
            if past_peak {
                let bound = t * x / f_x_2n;
                if bound <= Self::CDF_ERR_MAX {
                    return Ok(ans);
                }
            }
            if n > Self::CDF_ITR_MAX {
                return Err(Error::Runtime(format!(
                    "non-central chi-square cdf did not converge (df={}, ncp={}, x={x})",
                    self.df, self.ncp
                )));
            }
            u *= lam / n as Real;
            v += u;
            t *= x / f_2n;
            ans += v * t;
            n += 1;
            f_2n += 2.0;
            f_x_2n += 2.0;
        }
    }

    /// Inverse CDF.
    ///
    /// Doubles an upper bracket from `df + ncp` until the CDF exceeds `p`,
    /// spending at most `max_evaluations` CDF calls on the search in total,
    /// then polishes with Brent to the given accuracy.
    pub fn inverse_cdf(&self, p: Real, max_evaluations: usize, accuracy: Real) -> Result<Real> {
        ensure!((0.0..1.0).contains(&p), "p must be in [0, 1), got {p}");
        let mut upper = self.df + self.ncp;
        let mut evaluations = max_evaluations;
        while self.cdf(upper)? < p {
            ensure!(
                evaluations > 0,
                "unable to bracket the {p}-quantile of the non-central chi-square \
                 (df={}, ncp={}) within {max_evaluations} evaluations",
                self.df,
                self.ncp
            );
            upper *= 2.0;
            evaluations -= 1;
        }
        let lower = if evaluations == max_evaluations {
            0.0
        } else {
            0.5 * upper
        };

        let failure = RefCell::new(None);
        let root = brent_with_max_evaluations(
            |y| match self.cdf(y) {
                Ok(c) => c - p,
                Err(e) => {
                    failure.borrow_mut().get_or_insert(e);
                    Real::NAN
                }
            },
            lower,
            upper,
            accuracy,
            evaluations.max(10) as u32,
        );
        if let Some(e) = failure.into_inner() {
            return Err(e);
        }
        root
    }
}
