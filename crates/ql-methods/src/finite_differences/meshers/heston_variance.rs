//! Variance grid for the Heston model.
//!
//! The nodes are quantiles of the non-central chi-square transition law of
//! the square-root variance, averaged over several horizons up to maturity.

use ql_core::{errors::Result, Real, Time, Volatility};
use ql_math::{
    distributions::NonCentralChiSquareDistribution, interpolations::Interpolation1D,
    GaussLobattoIntegral, Integrator, LinearInterpolation,
};
use ql_processes::HestonProcess;
use tracing::warn;

use super::Fdm1dMesher;

/// Heston variance mesher with a volatility estimate for the equity axis.
#[derive(Debug, Clone, PartialEq)]
pub struct FdmHestonVarianceMesher {
    mesher: Fdm1dMesher,
    vola_estimate: Volatility,
}

impl FdmHestonVarianceMesher {
    /// Mesher with tail probability `1e-4`.
    pub fn new(
        size: usize,
        process: &HestonProcess,
        maturity: Time,
        t_avg_steps: usize,
    ) -> Result<Self> {
        Self::with_epsilon(size, process, maturity, t_avg_steps, 1e-4)
    }

    /// Mesher cutting off `epsilon` probability in the tails.
    pub fn with_epsilon(
        size: usize,
        process: &HestonProcess,
        maturity: Time,
        t_avg_steps: usize,
        epsilon: Real,
    ) -> Result<Self> {
        ql_core::ensure!(size >= 2, "variance mesher needs at least two nodes, got {size}");
        ql_core::ensure!(t_avg_steps > 0, "at least one averaging step is required");

        let (mut v_grid, mut p_grid) =
            match quantile_grid(size, process, maturity, t_avg_steps, epsilon) {
                Ok(grid) => grid,
                Err(e) => {
                    warn!(error = %e, "variance quantiles unavailable, using a uniform grid");
                    uniform_grid(size, process)
                }
            };

        let v0 = process.v0();
        // snap the interior neighbourhood of v0 onto v0
        if let Some(i) = (1..size).find(|&i| v_grid[i] >= v0) {
            if v_grid[i - 1] < v0 {
                let j = if (v_grid[i - 1] - v0).abs() < (v_grid[i] - v0).abs() {
                    i - 1
                } else {
                    i
                };
                v_grid[j] = v0;
            }
        }

        let skew_hint = (process.sigma() / process.kappa()).max(1.0);
        p_grid.sort_by(|a, b| a.total_cmp(b));
        let vola_estimate = average_volatility(&v_grid, &p_grid)? * skew_hint.powf(1.5);

        Ok(Self {
            mesher: Fdm1dMesher::from_locations(v_grid)?,
            vola_estimate,
        })
    }

    /// Average `sqrt(v)` over the probability grid, times the skew hint.
    pub fn vola_estimate(&self) -> Volatility {
        self.vola_estimate
    }
}

impl_fdm_1d_mesher!(FdmHestonVarianceMesher);

fn quantile_grid(
    size: usize,
    process: &HestonProcess,
    maturity: Time,
    t_avg_steps: usize,
    epsilon: Real,
) -> Result<(Vec<Real>, Vec<Real>)> {
    let (v0, kappa, theta, sigma) = (
        process.v0(),
        process.kappa(),
        process.theta(),
        process.sigma(),
    );
    let df = 4.0 * theta * kappa / (sigma * sigma);

    let mut pairs: Vec<(Real, Real)> = Vec::with_capacity(size * t_avg_steps);
    for l in 1..=t_avg_steps {
        let t = maturity * l as Real / t_avg_steps as Real;
        let e = (-kappa * t).exp();
        let ncp = 4.0 * kappa * e / (sigma * sigma * (1.0 - e)) * v0;
        let k = sigma * sigma * (1.0 - e) / (4.0 * kappa);

        let dist = NonCentralChiSquareDistribution::new(df, ncp)?;
        let q_max = v0.max(k * dist.inverse_cdf(1.0 - epsilon, 100, 1e-8)?);
        let min_v_step = q_max / (50.0 * size as Real);

        let mut p = 0.0;
        let mut v_tmp = 0.0;
        pairs.push((0.0, epsilon));
        for i in 1..size {
            let ps = (1.0 - epsilon - p) / (size - i) as Real;
            p += ps;
            let tmp = k * dist.inverse_cdf(p, 100, 1e-8)?;
            let vx = (v_tmp + min_v_step).max(tmp);
            p = dist.cdf(vx / k)?;
            v_tmp = vx;
            pairs.push((vx, p));
        }
    }
    ql_core::ensure!(
        pairs.len() == size * t_avg_steps,
        "inconsistent variance quantile grid"
    );

    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
    let n = pairs.len();
    let mut v_grid = Vec::with_capacity(size);
    let mut p_grid = Vec::with_capacity(size);
    for i in 0..size {
        let b = i * n / size;
        let e = (i + 1) * n / size;
        let w = (e - b) as Real;
        v_grid.push(pairs[b..e].iter().map(|x| x.0).sum::<Real>() / w);
        p_grid.push(pairs[b..e].iter().map(|x| x.1).sum::<Real>() / w);
    }
    ql_core::ensure!(
        v_grid.windows(2).all(|w| w[1] > w[0]),
        "variance quantile grid is not strictly increasing"
    );
    Ok((v_grid, p_grid))
}

fn uniform_grid(size: usize, process: &HestonProcess) -> (Vec<Real>, Vec<Real>) {
    let (v0, theta) = (process.v0(), process.theta());
    let vol = process.sigma() * (theta / (2.0 * process.kappa())).sqrt();
    let lower = (v0.min(theta) - 4.0 * vol).max(0.0);
    let upper = v0.max(theta) + 4.0 * vol;
    let n1 = (size - 1) as Real;
    let v_grid = (0..size)
        .map(|i| lower + i as Real * (upper - lower) / n1)
        .collect();
    let p_grid = (0..size).map(|i| i as Real / n1).collect();
    (v_grid, p_grid)
}

fn average_volatility(v_grid: &[Real], p_grid: &[Real]) -> Result<Volatility> {
    let mut ps = Vec::with_capacity(p_grid.len());
    let mut vs = Vec::with_capacity(v_grid.len());
    for (&p, &v) in p_grid.iter().zip(v_grid) {
        if ps.last().map_or(true, |&last| p > last) {
            ps.push(p);
            vs.push(v);
        }
    }
    if ps.len() < 2 {
        return Ok(vs.first().map_or(0.0, |v: &Real| v.max(0.0).sqrt()));
    }
    let (p_min, p_max) = (ps[0], ps[ps.len() - 1]);
    let interp = LinearInterpolation::new(&ps, &vs)?;
    let integral = GaussLobattoIntegral::new(1e-4, 100_000)
        .integrate(|p| interp.operator(p).max(0.0).sqrt(), p_min, p_max)?;
    Ok(integral / (p_max - p_min))
}
