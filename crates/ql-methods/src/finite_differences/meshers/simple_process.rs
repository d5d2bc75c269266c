use ql_core::{errors::Result, Real, Time};
use ql_math::normal_cdf_inverse;
use ql_processes::StochasticProcess1D;

use super::Fdm1dMesher;

/// Grid of process quantiles averaged over several horizons.
///
/// Node `i` is the mean over `l = 1..=t_avg_steps` of
/// `evolve(0, x0, t_l, N⁻¹(p_i))`, `p_i` uniform on `[eps, 1-eps]` and
/// `t_l = maturity·l/t_avg_steps`. An optional mandatory point widens the
/// outermost nodes so that it is always covered.
#[derive(Debug, Clone, PartialEq)]
pub struct FdmSimpleProcess1dMesher {
    mesher: Fdm1dMesher,
}

impl FdmSimpleProcess1dMesher {
    /// Ten averaging horizons and `eps = 1e-4`.
    pub fn new(size: usize, process: &dyn StochasticProcess1D, maturity: Time) -> Result<Self> {
        Self::with_options(size, process, maturity, 10, 1e-4, None)
    }

    /// Full control over the averaging.
    pub fn with_options(
        size: usize,
        process: &dyn StochasticProcess1D,
        maturity: Time,
        t_avg_steps: usize,
        eps: Real,
        mandatory_point: Option<Real>,
    ) -> Result<Self> {
        ql_core::ensure!(size >= 2, "process mesher needs at least two nodes, got {size}");
        ql_core::ensure!(t_avg_steps > 0, "at least one averaging step is required");
        ql_core::ensure!(eps > 0.0 && eps < 0.5, "eps must be in (0, 0.5), got {eps}");

        let x0 = process.x0();
        let mp = mandatory_point.unwrap_or(x0);
        let (dw_lo, dw_hi) = (normal_cdf_inverse(eps), normal_cdf_inverse(1.0 - eps));
        let dp = (1.0 - 2.0 * eps) / (size - 1) as Real;

        let mut locations = vec![0.0; size];
        for l in 1..=t_avg_steps {
            let t = maturity * l as Real / t_avg_steps as Real;
            locations[0] += mp.min(x0).min(process.evolve_1d(0.0, x0, t, dw_lo));
            let mut p = eps;
            for loc in locations.iter_mut().take(size - 1).skip(1) {
                p += dp;
                *loc += process.evolve_1d(0.0, x0, t, normal_cdf_inverse(p));
            }
            locations[size - 1] += mp.max(x0).max(process.evolve_1d(0.0, x0, t, dw_hi));
        }
        for loc in &mut locations {
            *loc /= t_avg_steps as Real;
        }

        Ok(Self {
            mesher: Fdm1dMesher::from_locations(locations)?,
        })
    }
}

impl_fdm_1d_mesher!(FdmSimpleProcess1dMesher);

#[cfg(test)]
mod tests {
    use super::*;
    use ql_processes::{OrnsteinUhlenbeckProcess, SquareRootProcess};

    #[test]
    fn symmetric_around_the_stationary_level() {
        let ou = OrnsteinUhlenbeckProcess::new(1.0, 0.5, 0.0, 0.0).unwrap();
        let m = FdmSimpleProcess1dMesher::new(21, &ou, 2.0).unwrap();
        assert!(m.locations().windows(2).all(|w| w[1] > w[0]));
        assert!((m.lower_bound() + m.upper_bound()).abs() < 1e-7);
        assert!(m.locations()[10].abs() < 1e-7);
    }

    #[test]
    fn mandatory_point_is_covered() {
        let ou = OrnsteinUhlenbeckProcess::new(1.0, 0.1, 0.0, 0.0).unwrap();
        let m = FdmSimpleProcess1dMesher::with_options(11, &ou, 1.0, 5, 1e-4, Some(3.0)).unwrap();
        assert!(m.upper_bound() >= 3.0 - 1e-12);
    }

    #[test]
    fn cir_mesh_brackets_the_mean() {
        let cir = SquareRootProcess::new(1.5, 0.04, 0.3, 0.04).unwrap();
        let m = FdmSimpleProcess1dMesher::new(21, &cir, 1.0).unwrap();
        assert!(m.locations().windows(2).all(|w| w[1] > w[0]));
        // started at the mean, the median node stays there
        assert!((m.locations()[10] - 0.04).abs() < 1e-10);
        assert!(m.upper_bound() > 0.04 && m.lower_bound() < 0.04);
    }
}
