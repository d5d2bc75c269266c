//! Finite-difference Black-Scholes engine for single-barrier options.
//!
//! The barrier is a required node of a concentrating log-spot mesh and a
//! barrier step condition resets the knocked-out region to the rebate after
//! every time step. The barrier is therefore monitored on the time grid; no
//! continuity correction is applied.

use std::sync::Arc;

use ql_core::{errors::Result, Real, Time};
use ql_instruments::{
    BarrierOptionArguments, BarrierType, CashOrNothingPayoff, OptionType, Payoff, PricingEngine,
    PricingResults, VanillaOptionArguments,
};
use ql_methods::finite_differences::{
    step_conditions::FdmBarrierStepCondition, Concentrating1dMesher, CriticalPoint,
    FdmBlackScholesMesher, FdmBlackScholesSolver, FdmBoundaryConditionSet, FdmBoundarySide,
    FdmLogInnerValue, FdmMesherComposite, FdmSchemeDesc, FdmSolverDesc,
    FdmStepConditionComposite,
};
use ql_processes::GeneralizedBlackScholesProcess;
use tracing::info;

use crate::fd_black_scholes_vanilla_engine::FdBlackScholesVanillaEngine;
use crate::fd_grid_spec::FdGridSpec;
use crate::fd_heston_barrier_engine::{check_barrier_arguments, in_out_parity};

/// Finite-difference Black-Scholes barrier engine for European exercise.
#[derive(Debug)]
pub struct FdBlackScholesBarrierEngine {
    process: Arc<GeneralizedBlackScholesProcess>,
    grid: FdGridSpec,
}

impl FdBlackScholesBarrierEngine {
    /// Engine with 100 time steps, 100 nodes and the Douglas scheme.
    pub fn new(process: Arc<GeneralizedBlackScholesProcess>) -> Self {
        Self {
            process,
            grid: FdGridSpec::new(100, 100, 0).with_scheme(FdmSchemeDesc::douglas()),
        }
    }

    /// Replace the discretisation; `y_grid` is ignored.
    pub fn with_grid(mut self, grid: FdGridSpec) -> Self {
        self.grid = grid;
        self
    }

    /// Log-spot mesh covering the quantile range, the strike and a margin
    /// beyond the barrier, with `ln B` on a node.
    fn mesher(&self, maturity: Time, strike: Real, barrier: Real) -> Result<Arc<FdmMesherComposite>> {
        let quantiles = FdmBlackScholesMesher::new(self.grid.x_grid, &self.process, maturity)?;
        let (lo, hi) = (quantiles.lower_bound(), quantiles.upper_bound());
        let ln_b = barrier.ln();
        let margin = 0.1 * (hi - lo);
        let start = lo.min(ln_b - margin);
        let end = hi.max(ln_b + margin);

        let mut points = vec![CriticalPoint::new(ln_b, 0.1, true)];
        let ln_k = strike.ln();
        if strike > 0.0 && (start..=end).contains(&ln_k) {
            points.push(CriticalPoint::new(ln_k, 0.1, false));
        }
        let x = Concentrating1dMesher::with_points(start, end, self.grid.x_grid, &points, None)?;
        Ok(Arc::new(FdmMesherComposite::from_mesher(x)?))
    }

    /// Knock-out value of `payoff`, paying `rebate` once the barrier is hit.
    fn knock_out(
        &self,
        args: &BarrierOptionArguments,
        payoff: Arc<dyn Payoff>,
        rebate: Real,
    ) -> Result<PricingResults> {
        let maturity = args.exercise.last_time();
        let mesher = self.mesher(maturity, args.payoff.strike(), args.barrier)?;
        let side = if args.barrier_type.is_down() {
            FdmBoundarySide::Lower
        } else {
            FdmBoundarySide::Upper
        };
        let barrier = FdmBarrierStepCondition::new(&mesher, 0, args.barrier.ln(), side, rebate)?;
        // the maturity entry clips the payoff before the first step
        let condition = FdmStepConditionComposite::new(vec![vec![maturity]], vec![Box::new(barrier)]);

        let desc = FdmSolverDesc {
            calculator: Arc::new(FdmLogInnerValue::new(payoff, Arc::clone(&mesher), 0)),
            mesher,
            bc_set: FdmBoundaryConditionSet::new(),
            condition,
            maturity,
            time_steps: self.grid.t_grid,
            damping_steps: self.grid.damping_steps,
        };
        let solver = FdmBlackScholesSolver::new(&self.process, desc, self.grid.scheme)?;
        let spot = self.process.spot();
        Ok(PricingResults::from_npv(solver.value_at(spot)?)
            .with_result("delta", solver.delta_at(spot)?)
            .with_result("gamma", solver.gamma_at(spot)?)
            .with_result("theta", solver.theta_at(spot)?))
    }
}

impl PricingEngine<BarrierOptionArguments> for FdBlackScholesBarrierEngine {
    fn calculate(&self, args: &BarrierOptionArguments) -> Result<PricingResults> {
        check_barrier_arguments(args, self.process.spot(), "FD Black-Scholes barrier engine")?;
        let payoff: Arc<dyn Payoff> = Arc::new(Arc::clone(&args.payoff));

        let results = match args.barrier_type {
            BarrierType::DownOut | BarrierType::UpOut => {
                self.knock_out(args, payoff, args.rebate)?
            }
            BarrierType::DownIn | BarrierType::UpIn => {
                let vanilla = FdBlackScholesVanillaEngine::new(Arc::clone(&self.process))
                    .with_grid(self.grid)
                    .calculate(&VanillaOptionArguments {
                        payoff: Arc::clone(&args.payoff),
                        exercise: args.exercise.clone(),
                    })?;
                let out = self.knock_out(args, payoff, 0.0)?;
                // a knock-in pays its rebate at expiry if the barrier was never hit
                let rebate = if args.rebate != 0.0 {
                    let cash: Arc<dyn Payoff> =
                        Arc::new(CashOrNothingPayoff::new(OptionType::Call, 0.0, args.rebate));
                    self.knock_out(args, cash, 0.0)?
                } else {
                    PricingResults::from_npv(0.0)
                        .with_result("delta", 0.0)
                        .with_result("gamma", 0.0)
                        .with_result("theta", 0.0)
                };
                in_out_parity(&vanilla, &rebate, &out)
            }
        };
        info!(
            npv = results.npv,
            barrier_type = ?args.barrier_type,
            "FD Black-Scholes barrier price"
        );
        Ok(results)
    }
}
