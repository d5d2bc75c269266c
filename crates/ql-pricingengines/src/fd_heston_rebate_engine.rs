//! Rebate leg of a Heston barrier option.
//!
//! Values a claim paying the rebate when the barrier is hit and, failing
//! that, at expiry. The barrier engine uses it to price knock-ins by parity.

use std::sync::Arc;

use ql_core::errors::Result;
use ql_instruments::{
    BarrierOptionArguments, CashOrNothingPayoff, OptionType, Payoff, PricingEngine,
    PricingResults,
};
use ql_processes::HestonProcess;
use tracing::info;

use crate::fd_grid_spec::FdGridSpec;
use crate::fd_heston_barrier_engine::{barrier_bounds, check_barrier_arguments, rebate_boundary};
use crate::fd_heston_vanilla_engine::{heston_mesher, heston_results, heston_rollback};

/// Finite-difference Heston engine for the rebate of a barrier option.
#[derive(Debug)]
pub struct FdHestonRebateEngine {
    process: Arc<HestonProcess>,
    grid: FdGridSpec,
}

impl FdHestonRebateEngine {
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
}

impl PricingEngine<BarrierOptionArguments> for FdHestonRebateEngine {
    fn calculate(&self, args: &BarrierOptionArguments) -> Result<PricingResults> {
        check_barrier_arguments(args, self.process.s0(), "FD Heston rebate engine")?;

        let mesher = heston_mesher(
            &self.process,
            &self.grid,
            args.exercise.last_time(),
            args.payoff.strike(),
            barrier_bounds(args.barrier_type, args.barrier),
        )?;
        let bc_set = rebate_boundary(&mesher, args.barrier_type, args.rebate)?;
        // pays the rebate at every terminal spot
        let payoff: Arc<dyn Payoff> =
            Arc::new(CashOrNothingPayoff::new(OptionType::Call, 0.0, args.rebate));
        let solver = heston_rollback(
            &self.process,
            &self.grid,
            mesher,
            payoff,
            &args.exercise,
            bc_set,
        )?;

        let results = heston_results(&solver, &self.process)?;
        info!(npv = results.npv, rebate = args.rebate, "FD Heston rebate price");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ql_instruments::{BarrierOption, BarrierType, Exercise, Instrument, PlainVanillaPayoff};

    #[test]
    fn rebate_lies_between_discounted_and_undiscounted_amount() {
        let process =
            Arc::new(HestonProcess::new(100.0, 0.04, 0.05, 0.0, 2.5, 0.04, 0.66, -0.8).unwrap());
        let engine = FdHestonRebateEngine::new(process);
        let option = BarrierOption::new(
            Arc::new(PlainVanillaPayoff::new(OptionType::Call, 100.0)),
            Exercise::european(1.0).unwrap(),
            BarrierType::DownOut,
            80.0,
            3.0,
        );
        let npv = option.price(&engine).unwrap().npv;
        assert!(npv > 3.0 * (-0.05_f64).exp() - 1e-3, "npv {npv}");
        assert!(npv < 3.0 + 1e-3, "npv {npv}");
    }

    #[test]
    fn zero_rebate_is_worthless() {
        let process =
            Arc::new(HestonProcess::new(100.0, 0.04, 0.05, 0.0, 2.5, 0.04, 0.66, -0.8).unwrap());
        let option = BarrierOption::new(
            Arc::new(PlainVanillaPayoff::new(OptionType::Call, 100.0)),
            Exercise::european(1.0).unwrap(),
            BarrierType::UpIn,
            120.0,
            0.0,
        );
        let npv = option.price(&FdHestonRebateEngine::new(process)).unwrap().npv;
        assert_abs_diff_eq!(npv, 0.0, epsilon = 1e-12);
    }
}
