//! Short-time transition density of the Heston model, used to seed the
//! forward equation away from the Dirac start.

use std::sync::Arc;

use ql_core::{errors::Result, Real, Time};
use ql_math::{normal_pdf, Array};
use ql_processes::HestonProcess;

use super::SquareRootProcessRNDCalculator;
use crate::finite_differences::meshers::FdmMesherComposite;
use crate::finite_differences::operators::FdmSquareRootFwdOpTransformation;

/// Approximation of the joint `(ln S, v)` density after a short time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FdmHestonGreensFctAlgorithm {
    /// Independent Gaussian log spot and exact CIR variance.
    ZeroCorrelation,
    /// Bivariate Gaussian with the Euler moments.
    #[default]
    Gaussian,
    /// Exact CIR variance and the conditional Gaussian log spot.
    SemiAnalytical,
}

/// Heston Greens function on a `(ln S, v)` or `(ln S, ln v)` mesh.
#[derive(Debug, Clone)]
pub struct FdmHestonGreensFct {
    mesher: Arc<FdmMesherComposite>,
    process: HestonProcess,
    transformation: FdmSquareRootFwdOpTransformation,
}

fn gaussian(x: Real, mean: Real, sd: Real) -> Real {
    normal_pdf((x - mean) / sd) / sd
}

impl FdmHestonGreensFct {
    /// Greens function on `mesher`; the unknown follows `transformation`.
    pub fn new(
        mesher: Arc<FdmMesherComposite>,
        process: HestonProcess,
        transformation: FdmSquareRootFwdOpTransformation,
    ) -> Self {
        Self {
            mesher,
            process,
            transformation,
        }
    }

    /// Values of the transformed unknown at every node at time `t > 0`.
    pub fn get(&self, t: Time, algorithm: FdmHestonGreensFctAlgorithm) -> Result<Array> {
        ql_core::ensure!(t > 0.0, "Greens function needs t > 0, got {t}");
        let p = &self.process;
        let (v0, kappa, theta, sigma, rho) = (p.v0(), p.kappa(), p.theta(), p.sigma(), p.rho());
        let x0 = p.s0().ln();
        let mu = p.risk_free_rate() - p.dividend_yield();
        let mean_x = x0 + (mu - 0.5 * v0) * t;
        let mean_v = v0 + kappa * (theta - v0) * t;
        let sd_x = (v0 * t).sqrt();
        let sd_v = sigma * sd_x;
        let alpha = 1.0 - 2.0 * kappa * theta / (sigma * sigma);
        let rnd = SquareRootProcessRNDCalculator::new(v0, kappa, theta, sigma)?;

        self.mesher
            .layout()
            .iter()
            .map(|iter| {
                let x = self.mesher.location(&iter, 0);
                let z = self.mesher.location(&iter, 1);
                let v = match self.transformation {
                    FdmSquareRootFwdOpTransformation::Log => z.exp(),
                    _ => z,
                };
                if v <= 0.0 {
                    return Ok(0.0);
                }

                let density = match algorithm {
                    FdmHestonGreensFctAlgorithm::ZeroCorrelation => {
                        gaussian(x, mean_x, sd_x) * rnd.pdf(v, t)?
                    }
                    FdmHestonGreensFctAlgorithm::Gaussian => {
                        let dx = (x - mean_x) / sd_x;
                        let dv = (v - mean_v) / sd_v;
                        let one_m_rho2 = 1.0 - rho * rho;
                        (-(dx * dx - 2.0 * rho * dx * dv + dv * dv) / (2.0 * one_m_rho2)).exp()
                            / (2.0 * std::f64::consts::PI * sd_x * sd_v * one_m_rho2.sqrt())
                    }
                    FdmHestonGreensFctAlgorithm::SemiAnalytical => {
                        let shift = rho / sigma * (v - mean_v);
                        let sd = ((1.0 - rho * rho) * v0 * t).sqrt();
                        gaussian(x, mean_x + shift, sd) * rnd.pdf(v, t)?
                    }
                };

                Ok(match self.transformation {
                    FdmSquareRootFwdOpTransformation::Plain => density,
                    FdmSquareRootFwdOpTransformation::Log => density * v,
                    FdmSquareRootFwdOpTransformation::Power => density * v.powf(alpha),
                })
            })
            .collect::<Result<Vec<Real>>>()
            .map(Array::from_vec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::Uniform1dMesher;
    use crate::finite_differences::utilities::FdmMesherIntegral;
    use approx::assert_abs_diff_eq;

    fn setup(transformation: FdmSquareRootFwdOpTransformation) -> FdmHestonGreensFct {
        let v_axis = match transformation {
            FdmSquareRootFwdOpTransformation::Log => Uniform1dMesher::new(-6.0, 0.0, 301),
            _ => Uniform1dMesher::new(1e-4, 0.3, 301),
        };
        let m = FdmMesherComposite::from_pair(
            Uniform1dMesher::new(100.0_f64.ln() - 0.8, 100.0_f64.ln() + 0.8, 201).unwrap(),
            v_axis.unwrap(),
        )
        .unwrap();
        let process = HestonProcess::new(100.0, 0.09, 0.05, 0.0, 1.0, 0.09, 0.3, -0.5).unwrap();
        FdmHestonGreensFct::new(Arc::new(m), process, transformation)
    }

    #[test]
    fn every_algorithm_carries_unit_mass() {
        let greens = setup(FdmSquareRootFwdOpTransformation::Plain);
        let integral = FdmMesherIntegral::simpson(Arc::clone(&greens.mesher));
        for algorithm in [
            FdmHestonGreensFctAlgorithm::ZeroCorrelation,
            FdmHestonGreensFctAlgorithm::Gaussian,
            FdmHestonGreensFctAlgorithm::SemiAnalytical,
        ] {
            let p = greens.get(0.1, algorithm).unwrap();
            assert_abs_diff_eq!(integral.integrate(&p), 1.0, epsilon = 1e-2);
        }
    }

    #[test]
    fn log_variance_density_carries_the_jacobian() {
        let greens = setup(FdmSquareRootFwdOpTransformation::Log);
        let integral = FdmMesherIntegral::simpson(Arc::clone(&greens.mesher));
        let p = greens
            .get(0.1, FdmHestonGreensFctAlgorithm::SemiAnalytical)
            .unwrap();
        assert_abs_diff_eq!(integral.integrate(&p), 1.0, epsilon = 1e-2);
    }

    #[test]
    fn rejects_time_zero() {
        let greens = setup(FdmSquareRootFwdOpTransformation::Plain);
        assert!(greens.get(0.0, FdmHestonGreensFctAlgorithm::Gaussian).is_err());
    }
}
