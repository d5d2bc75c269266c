//! Finite-difference engine for gas storage under an extended OU log price.
//!
//! Direction 0 is the log spot price, direction 1 the storage level. The
//! terminal value is the stored volume at the final price and every exercise
//! date lets the holder inject, hold or withdraw up to the change rate.

use std::sync::Arc;

use ql_core::{errors::Error, errors::Result, Rate, Real};
use ql_instruments::{
    ExerciseType, OptionType, Payoff, PlainVanillaPayoff, PricingEngine, PricingResults,
    StorageOptionArguments,
};
use ql_math::close_enough;
use ql_methods::finite_differences::{
    step_conditions::FdmSimpleStorageCondition,
    utilities::{FdmExpExtOUInnerValueCalculator, FdmStorageValue, Shape},
    Fdm1dMesher, FdmBoundaryConditionSet, FdmMesherComposite, FdmSchemeDesc,
    FdmSimple2dExtOUSolver, FdmSimpleProcess1dMesher, FdmSolverDesc, FdmStepConditionComposite,
    Predefined1dMesher, Uniform1dMesher,
};
use ql_processes::{ExtendedOrnsteinUhlenbeckProcess, StochasticProcess1D};
use tracing::{debug, info};

use crate::fd_grid_spec::FdGridSpec;

/// Storage engine on a `(ln P, level)` mesh.
///
/// With `y_grid == 0` the level axis is the "elevator" mesh of every level
/// reachable from empty or full in whole change-rate steps; otherwise it is
/// a uniform mesh on `[0, capacity]` with `y_grid` nodes.
#[derive(Debug)]
pub struct FdSimpleExtOUStorageEngine {
    process: Arc<ExtendedOrnsteinUhlenbeckProcess>,
    rate: Rate,
    shape: Option<Shape>,
    grid: FdGridSpec,
}

impl FdSimpleExtOUStorageEngine {
    /// Engine with 50 time steps, 100 price nodes, the elevator level mesh
    /// and the Douglas scheme.
    pub fn new(process: Arc<ExtendedOrnsteinUhlenbeckProcess>, rate: Rate) -> Self {
        Self {
            process,
            rate,
            shape: None,
            grid: FdGridSpec::new(50, 100, 0).with_scheme(FdmSchemeDesc::douglas()),
        }
    }

    /// Seasonal shift added to the log price at each exercise.
    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = Some(shape);
        self
    }

    /// Replace the discretisation.
    pub fn with_grid(mut self, grid: FdGridSpec) -> Self {
        self.grid = grid;
        self
    }

    fn storage_mesher(&self, capacity: Real, change_rate: Real) -> Result<Fdm1dMesher> {
        if self.grid.y_grid > 0 {
            return Ok(Uniform1dMesher::new(0.0, capacity, self.grid.y_grid)?.into());
        }
        Ok(Predefined1dMesher::new(elevator_levels(capacity, change_rate))?.into())
    }
}

/// Levels `k·c` and `capacity - k·c` for `k·c ≤ capacity`, sorted with
/// near-duplicates removed.
pub(crate) fn elevator_levels(capacity: Real, change_rate: Real) -> Vec<Real> {
    let mut levels = vec![capacity];
    let mut level = 0.0;
    while level <= capacity {
        levels.push(level);
        levels.push(capacity - level);
        level += change_rate;
    }
    levels.sort_by(|a, b| a.total_cmp(b));
    levels.dedup_by(|a, b| close_enough(*a, *b, 100));
    levels
}

impl PricingEngine<StorageOptionArguments> for FdSimpleExtOUStorageEngine {
    fn calculate(&self, args: &StorageOptionArguments) -> Result<PricingResults> {
        if args.exercise.exercise_type() != ExerciseType::Bermudan {
            return Err(Error::UnsupportedExercise(format!(
                "FD storage engine supports Bermudan exercise only, got {}",
                args.exercise
            )));
        }
        let maturity = args.exercise.last_time();

        let x_mesher = FdmSimpleProcess1dMesher::new(self.grid.x_grid, &*self.process, maturity)?;
        let y_mesher = self.storage_mesher(args.capacity, args.change_rate)?;
        let mesher = Arc::new(FdmMesherComposite::new(vec![x_mesher.into(), y_mesher])?);
        debug!(
            levels = mesher.get_fdm_1d_meshers()[1].size(),
            capacity = args.capacity,
            "storage mesh"
        );

        let exercise_times = args.exercise.times().to_vec();
        let price: Arc<dyn Payoff> = Arc::new(PlainVanillaPayoff::new(OptionType::Call, 0.0));
        let price_calculator = Arc::new(FdmExpExtOUInnerValueCalculator::new(
            price,
            Arc::clone(&mesher),
            self.shape.clone(),
        ));
        let storage = FdmSimpleStorageCondition::new(
            exercise_times.clone(),
            Arc::clone(&mesher),
            price_calculator,
            args.change_rate,
        );
        let condition = FdmStepConditionComposite::new(vec![exercise_times], vec![Box::new(storage)]);

        let desc = FdmSolverDesc {
            calculator: Arc::new(FdmStorageValue::new(Arc::clone(&mesher))),
            mesher,
            bc_set: FdmBoundaryConditionSet::new(),
            condition,
            maturity,
            time_steps: self.grid.t_grid,
            damping_steps: self.grid.damping_steps,
        };
        let solver =
            FdmSimple2dExtOUSolver::new(Arc::clone(&self.process), self.rate, desc, self.grid.scheme)?;

        let npv = solver.value_at(self.process.x0(), args.load)?;
        info!(npv, capacity = args.capacity, load = args.load, "FD storage price");
        Ok(PricingResults::from_npv(npv))
    }
}
