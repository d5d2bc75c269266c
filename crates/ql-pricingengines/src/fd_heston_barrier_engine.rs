//! Finite-difference Heston engine for single-barrier options.
//!
//! The log-spot axis is truncated at the barrier and a Dirichlet condition
//! holds the rebate there, so knock-outs are monitored continuously.
//! Knock-ins follow from in/out parity against the vanilla price.

use std::sync::Arc;

use ql_core::{
    ensure,
    errors::{Error, Result},
    Real,
};
use ql_instruments::{
    BarrierOptionArguments, BarrierType, ExerciseType, Payoff, PricingEngine, PricingResults,
    VanillaOptionArguments,
};
use ql_methods::finite_differences::{
    FdmBoundaryConditionSet, FdmBoundarySide, FdmDirichletBoundary, FdmMesherComposite,
};
use ql_processes::HestonProcess;
use tracing::info;

use crate::fd_grid_spec::FdGridSpec;
use crate::fd_heston_rebate_engine::FdHestonRebateEngine;
use crate::fd_heston_vanilla_engine::{
    heston_mesher, heston_results, heston_rollback, FdHestonVanillaEngine, LogSpotBounds,
};

/// Finite-difference Heston barrier engine for European exercise.
#[derive(Debug)]
pub struct FdHestonBarrierEngine {
    process: Arc<HestonProcess>,
    grid: FdGridSpec,
}

impl FdHestonBarrierEngine {
    /// Engine with 100 time steps, 100 log-spot and 50 variance nodes.
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

    fn knock_out(&self, args: &BarrierOptionArguments) -> Result<PricingResults> {
        let maturity = args.exercise.last_time();
        let mesher = heston_mesher(
            &self.process,
            &self.grid,
            maturity,
            args.payoff.strike(),
            barrier_bounds(args.barrier_type, args.barrier),
        )?;
        let bc_set = rebate_boundary(&mesher, args.barrier_type, args.rebate)?;
        let payoff: Arc<dyn Payoff> = Arc::new(Arc::clone(&args.payoff));
        let solver = heston_rollback(
            &self.process,
            &self.grid,
            mesher,
            payoff,
            &args.exercise,
            bc_set,
        )?;
        heston_results(&solver, &self.process)
    }
}

/// Validate a barrier contract for the Heston FD engines.
pub(crate) fn check_barrier_arguments(
    args: &BarrierOptionArguments,
    spot: Real,
    engine: &str,
) -> Result<()> {
    if args.exercise.exercise_type() != ExerciseType::European {
        return Err(Error::UnsupportedExercise(format!(
            "{engine} prices European barriers only, got {}",
            args.exercise
        )));
    }
    let maturity = args.exercise.last_time();
    ensure!(maturity > 0.0, "option has expired (maturity {maturity})");
    ensure!(args.barrier > 0.0, "barrier must be positive, got {}", args.barrier);
    ensure!(
        !args.barrier_type.is_triggered(spot, args.barrier),
        "spot {spot} has already touched the barrier {}",
        args.barrier
    );
    Ok(())
}

/// The log-spot mesh ends at the barrier.
pub(crate) fn barrier_bounds(barrier_type: BarrierType, barrier: Real) -> LogSpotBounds {
    if barrier_type.is_down() {
        LogSpotBounds {
            x_min: Some(barrier.ln()),
            x_max: None,
        }
    } else {
        LogSpotBounds {
            x_min: None,
            x_max: Some(barrier.ln()),
        }
    }
}

/// Dirichlet condition paying `rebate` on the barrier side of direction 0.
pub(crate) fn rebate_boundary(
    mesher: &FdmMesherComposite,
    barrier_type: BarrierType,
    rebate: Real,
) -> Result<FdmBoundaryConditionSet> {
    let side = if barrier_type.is_down() {
        FdmBoundarySide::Lower
    } else {
        FdmBoundarySide::Upper
    };
    let mut bc_set = FdmBoundaryConditionSet::new();
    bc_set.push(FdmDirichletBoundary::new(mesher, rebate, 0, side)?);
    Ok(bc_set)
}

/// `vanilla + rebate - out` for the value and every shared Greek.
pub(crate) fn in_out_parity(
    vanilla: &PricingResults,
    rebate: &PricingResults,
    out: &PricingResults,
) -> PricingResults {
    let mut results = PricingResults::from_npv(vanilla.npv + rebate.npv - out.npv);
    for key in ["delta", "gamma", "theta"] {
        if let (Some(v), Some(r), Some(o)) = (vanilla.result(key), rebate.result(key), out.result(key))
        {
            results = results.with_result(key, v + r - o);
        }
    }
    results
}

impl PricingEngine<BarrierOptionArguments> for FdHestonBarrierEngine {
    fn calculate(&self, args: &BarrierOptionArguments) -> Result<PricingResults> {
        check_barrier_arguments(args, self.process.s0(), "FD Heston barrier engine")?;

        let out = self.knock_out(args)?;
        if !args.barrier_type.is_knock_in() {
            info!(npv = out.npv, barrier_type = ?args.barrier_type, "FD Heston barrier price");
            return Ok(out);
        }

        let vanilla = FdHestonVanillaEngine::new(Arc::clone(&self.process))
            .with_grid(self.grid)
            .calculate(&VanillaOptionArguments {
                payoff: Arc::clone(&args.payoff),
                exercise: args.exercise.clone(),
            })?;
        let rebate_grid = FdGridSpec {
            x_grid: (self.grid.x_grid / 5).max(50).min(self.grid.x_grid),
            y_grid: (self.grid.y_grid / 5).max(50).min(self.grid.y_grid),
            ..self.grid
        };
        let rebate = FdHestonRebateEngine::new(Arc::clone(&self.process))
            .with_grid(rebate_grid)
            .calculate(args)?;

        let results = in_out_parity(&vanilla, &rebate, &out);
        info!(npv = results.npv, barrier_type = ?args.barrier_type, "FD Heston barrier price");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ql_instruments::{
        BarrierOption, Exercise, Instrument, OptionType, PlainVanillaPayoff, VanillaOption,
    };

    fn process() -> Arc<HestonProcess> {
        Arc::new(HestonProcess::new(100.0, 0.04, 0.05, 0.0, 2.5, 0.04, 0.66, -0.8).unwrap())
    }

    fn barrier_option(barrier_type: BarrierType, barrier: Real, rebate: Real) -> BarrierOption {
        BarrierOption::new(
            Arc::new(PlainVanillaPayoff::new(OptionType::Call, 100.0)),
            Exercise::european(1.0).unwrap(),
            barrier_type,
            barrier,
            rebate,
        )
    }

    #[test]
    fn up_and_out_call() {
        let engine = FdHestonBarrierEngine::new(process()).with_grid(FdGridSpec::new(50, 400, 100));
        let results = barrier_option(BarrierType::UpOut, 135.0, 0.0)
            .price(&engine)
            .unwrap();
        assert_abs_diff_eq!(results.npv, 9.1530, epsilon = 0.01);
        assert_abs_diff_eq!(results.result("delta").unwrap(), 0.5218, epsilon = 0.01);
        assert_abs_diff_eq!(results.result("gamma").unwrap(), -0.0354, epsilon = 0.01);
    }

    #[test]
    fn down_in_plus_down_out_is_vanilla() {
        let grid = FdGridSpec::new(100, 200, 50);
        let engine = FdHestonBarrierEngine::new(process()).with_grid(grid);
        let out = barrier_option(BarrierType::DownOut, 90.0, 0.0)
            .price(&engine)
            .unwrap()
            .npv;
        let knock_in = barrier_option(BarrierType::DownIn, 90.0, 0.0)
            .price(&engine)
            .unwrap()
            .npv;
        let vanilla = VanillaOption::european(OptionType::Call, 100.0, 1.0)
            .unwrap()
            .price(&FdHestonVanillaEngine::new(process()).with_grid(grid))
            .unwrap()
            .npv;
        assert_abs_diff_eq!(out + knock_in, vanilla, epsilon = 1e-3);
        assert!(out > 0.0 && knock_in > 0.0, "out {out}, in {knock_in}");
    }

    #[test]
    fn rebate_raises_the_knock_out_value() {
        let engine = FdHestonBarrierEngine::new(process());
        let without = barrier_option(BarrierType::UpOut, 130.0, 0.0)
            .price(&engine)
            .unwrap()
            .npv;
        let with = barrier_option(BarrierType::UpOut, 130.0, 2.0)
            .price(&engine)
            .unwrap()
            .npv;
        assert!(with > without, "with rebate {with}, without {without}");
    }

    #[test]
    fn american_exercise_is_unsupported() {
        let option = BarrierOption::new(
            Arc::new(PlainVanillaPayoff::new(OptionType::Put, 100.0)),
            Exercise::american(0.0, 1.0).unwrap(),
            BarrierType::DownOut,
            80.0,
            0.0,
        );
        let engine = FdHestonBarrierEngine::new(process());
        assert!(matches!(
            option.price(&engine),
            Err(Error::UnsupportedExercise(_))
        ));
    }

    #[test]
    fn triggered_barrier_is_rejected() {
        let engine = FdHestonBarrierEngine::new(process());
        assert!(barrier_option(BarrierType::UpOut, 95.0, 0.0)
            .price(&engine)
            .is_err());
    }
}
