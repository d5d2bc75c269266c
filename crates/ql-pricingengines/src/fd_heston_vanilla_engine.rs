//! Finite-difference Heston engine for vanilla options.
//!
//! Solves the two-dimensional Heston PDE on a `(ln S, v)` mesh with an ADI
//! scheme. European, American and Bermudan exercises are supported.

use std::sync::Arc;

use ql_core::{ensure, errors::Result, Real, Time};
use ql_instruments::{
    Exercise, Payoff, PricingEngine, PricingResults, VanillaOptionArguments,
};
use ql_methods::finite_differences::{
    meshers::BlackScholesMesherOptions, FdmBlackScholesMesher, FdmBoundaryConditionSet,
    FdmHestonSolver, FdmHestonVarianceMesher, FdmInnerValueCalculator, FdmLogInnerValue, FdmMesherComposite,
    FdmSolverDesc, FdmStepConditionComposite,
};
use ql_processes::HestonProcess;
use tracing::info;

use crate::fd_grid_spec::FdGridSpec;

/// Finite-difference Heston engine.
///
/// Default grid: 100 time steps, 100 log-spot nodes, 50 variance nodes,
/// no damping, Hundsdorfer scheme. The result carries `delta`, `gamma` and
/// `theta` at `(s0, v0)`.
#[derive(Debug)]
pub struct FdHestonVanillaEngine {
    process: Arc<HestonProcess>,
    grid: FdGridSpec,
}

impl FdHestonVanillaEngine {
    /// Engine with the default grid.
    pub fn new(process: Arc<HestonProcess>) -> Self {
        Self {
            process,
            grid: FdGridSpec::default(),
        }
    }

    /// Replace the discretisation.
    pub fn with_grid(mut self, grid: FdGridSpec) -> Self {
        self.grid = grid;
        self
    }

    /// The discretisation in use.
    pub fn grid(&self) -> &FdGridSpec {
        &self.grid
    }
}

/// Log-spot bounds forced onto the mesh, e.g. by a barrier.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct LogSpotBounds {
    pub x_min: Option<Real>,
    pub x_max: Option<Real>,
}

/// `(ln S, v)` mesh concentrated around `strike`.
pub(crate) fn heston_mesher(
    process: &HestonProcess,
    grid: &FdGridSpec,
    maturity: Time,
    strike: Real,
    bounds: LogSpotBounds,
) -> Result<Arc<FdmMesherComposite>> {
    let t_avg_steps = (grid.t_grid / 50).max(5);
    let v_mesher = FdmHestonVarianceMesher::new(grid.y_grid, process, maturity, t_avg_steps)?;

    let bs_process = FdmBlackScholesMesher::process_helper(
        process.s0(),
        process.dividend_yield(),
        process.risk_free_rate(),
        v_mesher.vola_estimate(),
    )?;
    let options = BlackScholesMesherOptions {
        x_min: bounds.x_min,
        x_max: bounds.x_max,
        scale_factor: 2.0,
        c_point: Some((strike, 0.1)),
        ..Default::default()
    };
    let x_mesher = FdmBlackScholesMesher::with_options(grid.x_grid, &bs_process, maturity, &options)?;

    Ok(Arc::new(FdmMesherComposite::from_pair(x_mesher, v_mesher)?))
}

/// Roll `payoff` back on `mesher` and return the solver for queries.
pub(crate) fn heston_rollback(
    process: &HestonProcess,
    grid: &FdGridSpec,
    mesher: Arc<FdmMesherComposite>,
    payoff: Arc<dyn Payoff>,
    exercise: &Exercise,
    bc_set: FdmBoundaryConditionSet,
) -> Result<FdmHestonSolver> {
    let calculator = Arc::new(FdmLogInnerValue::new(payoff, Arc::clone(&mesher), 0));
    let condition = FdmStepConditionComposite::vanilla_composite(
        exercise,
        Arc::clone(&mesher),
        Arc::clone(&calculator) as Arc<dyn FdmInnerValueCalculator>,
    )?;
    let desc = FdmSolverDesc {
        mesher,
        bc_set,
        condition,
        calculator,
        maturity: exercise.last_time(),
        time_steps: grid.t_grid,
        damping_steps: grid.damping_steps,
    };
    FdmHestonSolver::new(process, desc, grid.scheme)
}

/// Value and Greeks of a solved rollback at `(s0, v0)`.
pub(crate) fn heston_results(
    solver: &FdmHestonSolver,
    process: &HestonProcess,
) -> Result<PricingResults> {
    let (s0, v0) = (process.s0(), process.v0());
    Ok(PricingResults::from_npv(solver.value_at(s0, v0)?)
        .with_result("delta", solver.delta_at(s0, v0)?)
        .with_result("gamma", solver.gamma_at(s0, v0)?)
        .with_result("theta", solver.theta_at(s0, v0)?))
}

impl PricingEngine<VanillaOptionArguments> for FdHestonVanillaEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        let maturity = args.exercise.last_time();
        ensure!(maturity > 0.0, "option has expired (maturity {maturity})");

        let mesher = heston_mesher(
            &self.process,
            &self.grid,
            maturity,
            args.payoff.strike(),
            LogSpotBounds::default(),
        )?;
        let payoff: Arc<dyn Payoff> = Arc::new(Arc::clone(&args.payoff));
        let solver = heston_rollback(
            &self.process,
            &self.grid,
            mesher,
            payoff,
            &args.exercise,
            FdmBoundaryConditionSet::new(),
        )?;
        let results = heston_results(&solver, &self.process)?;
        info!(
            npv = results.npv,
            exercise = %args.exercise,
            "FD Heston vanilla price"
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytic_european_engine::black_scholes_merton;
    use crate::analytic_heston_engine::AnalyticHestonEngine;
    use approx::assert_abs_diff_eq;
    use ql_core::errors::Error;
    use ql_instruments::{Instrument, OptionType, VanillaOption};
    use ql_methods::FdmSchemeDesc;

    #[test]
    fn american_put() {
        let process = Arc::new(
            HestonProcess::new(100.0, 0.04, 0.05, 0.0, 2.5, 0.04, 0.66, -0.8).unwrap(),
        );
        let engine = FdHestonVanillaEngine::new(process).with_grid(FdGridSpec::new(200, 100, 50));
        let option = VanillaOption::american(OptionType::Put, 100.0, 1.0).unwrap();
        let results = option.price(&engine).unwrap();

        assert_abs_diff_eq!(results.npv, 5.66032, epsilon = 0.01);
        assert_abs_diff_eq!(results.result("delta").unwrap(), -0.30065, epsilon = 0.01);
        assert_abs_diff_eq!(results.result("gamma").unwrap(), 0.02202, epsilon = 0.01);
    }

    #[test]
    fn american_puts_of_ikonen_and_toivanen() {
        let expected = [
            (8.0, 2.0),
            (9.0, 1.107_63),
            (10.0, 0.520_038),
            (11.0, 0.213_681),
            (12.0, 0.082_046),
        ];
        let option = VanillaOption::american(OptionType::Put, 10.0, 0.25).unwrap();
        for (s0, npv) in expected {
            let process = Arc::new(
                HestonProcess::new(s0, 0.0625, 0.1, 0.0, 5.0, 0.16, 0.9, 0.1).unwrap(),
            );
            let engine =
                FdHestonVanillaEngine::new(process).with_grid(FdGridSpec::new(100, 400, 50));
            let calculated = option.price(&engine).unwrap().npv;
            assert_abs_diff_eq!(calculated, npv, epsilon = 1e-3);
        }
    }

    #[test]
    fn european_call_matches_semi_analytic_price() {
        let process = Arc::new(
            HestonProcess::new(100.0, 0.04, 0.025, 0.0, 1.5, 0.04, 0.3, -0.9).unwrap(),
        );
        let option = VanillaOption::european(OptionType::Call, 100.0, 1.0).unwrap();
        let expected = option
            .price(&AnalyticHestonEngine::new(Arc::clone(&process)))
            .unwrap()
            .npv;
        let engine = FdHestonVanillaEngine::new(process).with_grid(FdGridSpec::new(100, 400, 100));
        let calculated = option.price(&engine).unwrap().npv;
        assert_abs_diff_eq!(calculated, expected, epsilon = 0.02);
    }

    /// Relative 2% or absolute 0.002, whichever is looser.
    fn assert_close_to(calculated: Real, expected: Real, context: &str) {
        let diff = (calculated - expected).abs();
        assert!(
            diff / expected <= 0.02 || diff <= 0.002,
            "{context}: calculated {calculated}, expected {expected}"
        );
    }

    #[test]
    fn european_calls_converge_for_every_adi_scheme() {
        // kappa, theta, sigma, rho, r, q, maturity
        let parameters = [
            (1.5, 0.04, 0.3, -0.9, 0.025, 0.0, 1.0),
            (3.0, 0.12, 0.04, 0.6, 0.01, 0.04, 1.0),
            (0.6067, 0.0707, 0.2928, -0.7571, 0.03, 0.0, 3.0),
            (2.5, 0.06, 0.5, -0.1, 0.0507, 0.0469, 0.25),
        ];
        let schemes = [
            FdmSchemeDesc::hundsdorfer(),
            FdmSchemeDesc::modified_craig_sneyd(),
            FdmSchemeDesc::modified_hundsdorfer(),
            FdmSchemeDesc::craig_sneyd(),
        ];
        for (kappa, theta, sigma, rho, r, q, maturity) in parameters {
            let process = Arc::new(
                HestonProcess::new(75.0, 0.04, r, q, kappa, theta, sigma, rho).unwrap(),
            );
            let option = VanillaOption::european(OptionType::Call, 100.0, maturity).unwrap();
            let expected = option
                .price(&AnalyticHestonEngine::new(Arc::clone(&process)))
                .unwrap()
                .npv;
            for scheme in schemes {
                let engine = FdHestonVanillaEngine::new(Arc::clone(&process))
                    .with_grid(FdGridSpec::new(100, 400, 100).with_scheme(scheme));
                let calculated = option.price(&engine).unwrap().npv;
                assert_close_to(
                    calculated,
                    expected,
                    &format!("{:?} kappa {kappa}", scheme.scheme_type),
                );
            }
        }
    }

    #[test]
    fn european_calls_across_moneyness() {
        let process = Arc::new(
            HestonProcess::new(100.0, 0.04, 0.025, 0.0, 1.5, 0.04, 0.3, -0.9).unwrap(),
        );
        let analytic = AnalyticHestonEngine::new(Arc::clone(&process));
        let engine = FdHestonVanillaEngine::new(process).with_grid(FdGridSpec::new(100, 400, 100));
        for strike in [50.0, 100.0, 150.0] {
            let option = VanillaOption::european(OptionType::Call, strike, 1.0).unwrap();
            let expected = option.price(&analytic).unwrap().npv;
            let calculated = option.price(&engine).unwrap().npv;
            assert_close_to(calculated, expected, &format!("K {strike}"));
        }
    }

    #[test]
    fn degenerate_variance_recovers_black_scholes() {
        let process = Arc::new(
            HestonProcess::new(10.0, 0.0625, 0.1, 0.0, 1.0, 0.0625, 1e-4, 0.0).unwrap(),
        );
        let option = VanillaOption::european(OptionType::Put, 10.0, 0.25).unwrap();
        let expected = black_scholes_merton(OptionType::Put, 10.0, 10.0, 0.1, 0.0, 0.25, 0.25).npv;

        let engine = FdHestonVanillaEngine::new(Arc::clone(&process))
            .with_grid(FdGridSpec::new(100, 400, 50));
        assert_abs_diff_eq!(option.price(&engine).unwrap().npv, expected, epsilon = 1e-4);

        let explicit = FdHestonVanillaEngine::new(process).with_grid(
            FdGridSpec::new(10_000, 400, 5).with_scheme(FdmSchemeDesc::explicit_euler()),
        );
        assert_abs_diff_eq!(option.price(&explicit).unwrap().npv, expected, epsilon = 1e-4);
    }

    #[test]
    fn american_is_worth_at_least_european() {
        let process = Arc::new(
            HestonProcess::new(100.0, 0.04, 0.05, 0.0, 2.5, 0.04, 0.66, -0.8).unwrap(),
        );
        let engine = FdHestonVanillaEngine::new(process);
        let european = VanillaOption::european(OptionType::Put, 100.0, 1.0)
            .unwrap()
            .price(&engine)
            .unwrap()
            .npv;
        let american = VanillaOption::american(OptionType::Put, 100.0, 1.0)
            .unwrap()
            .price(&engine)
            .unwrap()
            .npv;
        assert!(american > european, "american {american}, european {european}");
    }

    #[test]
    fn expired_option_is_rejected() {
        let process = Arc::new(
            HestonProcess::new(100.0, 0.04, 0.05, 0.0, 2.5, 0.04, 0.66, -0.8).unwrap(),
        );
        let engine = FdHestonVanillaEngine::new(process);
        let option = VanillaOption::european(OptionType::Call, 100.0, 0.0).unwrap();
        assert!(matches!(option.price(&engine), Err(Error::Precondition(_))));
    }
}
