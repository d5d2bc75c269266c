//! Finite-difference swing engine for the extended OU model with jumps.
//!
//! The log price is `x + y` with `x` an extended OU factor and `y` a
//! mean-reverting jump factor. The third mesh direction counts the
//! exercise rights already used.

use std::sync::Arc;

use ql_core::{
    ensure,
    errors::{Error, Result},
    Rate, Real,
};
use ql_instruments::{ExerciseType, Payoff, PricingEngine, PricingResults, SwingOptionArguments};
use ql_methods::finite_differences::{
    step_conditions::FdmSimpleSwingCondition,
    utilities::{FdmExtOUJumpModelInnerValue, FdmZeroInnerValue, Shape},
    ExponentialJump1dMesher, FdmBoundaryConditionSet, FdmMesherComposite,
    FdmSimple3dExtOUJumpSolver, FdmSimpleProcess1dMesher, FdmSolverDesc,
    FdmStepConditionComposite, Uniform1dMesher,
};
use ql_processes::ExtOUWithJumpsProcess;
use tracing::info;

use crate::fd_grid_spec::FdGridSpec;

const SWING_DIRECTION: usize = 2;

/// Swing engine on an `(x, y, rights used)` mesh.
///
/// Default grid: 50 time steps, 200 OU nodes, 50 jump nodes and the
/// Hundsdorfer scheme.
#[derive(Debug)]
pub struct FdSimpleExtOUJumpSwingEngine {
    process: Arc<ExtOUWithJumpsProcess>,
    rate: Rate,
    shape: Option<Shape>,
    grid: FdGridSpec,
}

impl FdSimpleExtOUJumpSwingEngine {
    /// Engine discounting at the flat rate `rate`.
    pub fn new(process: Arc<ExtOUWithJumpsProcess>, rate: Rate) -> Self {
        Self {
            process,
            rate,
            shape: None,
            grid: FdGridSpec::new(50, 200, 50),
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
}

impl PricingEngine<SwingOptionArguments> for FdSimpleExtOUJumpSwingEngine {
    fn calculate(&self, args: &SwingOptionArguments) -> Result<PricingResults> {
        if args.exercise.exercise_type() != ExerciseType::Swing {
            return Err(Error::UnsupportedExercise(format!(
                "FD jump swing engine supports swing exercise only, got {}",
                args.exercise
            )));
        }
        ensure!(
            args.max_exercise_rights > 0,
            "swing option needs at least one exercise right"
        );
        let exercise_times = args.exercise.times().to_vec();
        let maturity = args.exercise.last_time();
        let max_rights = args.max_exercise_rights;

        let ou = self.process.ext_ou_process();
        let mesher = Arc::new(FdmMesherComposite::new(vec![
            FdmSimpleProcess1dMesher::new(self.grid.x_grid, &**ou, maturity)?.into(),
            ExponentialJump1dMesher::new(
                self.grid.y_grid,
                self.process.beta(),
                self.process.jump_intensity(),
                self.process.eta(),
            )?
            .into(),
            Uniform1dMesher::new(0.0, max_rights as Real, max_rights + 1)?.into(),
        ])?);

        let payoff: Arc<dyn Payoff> = Arc::new(Arc::clone(&args.payoff));
        let cashflow = Arc::new(FdmExtOUJumpModelInnerValue::new(
            payoff,
            Arc::clone(&mesher),
            self.shape.clone(),
        ));
        let swing = FdmSimpleSwingCondition::new(
            exercise_times.clone(),
            Arc::clone(&mesher),
            cashflow,
            SWING_DIRECTION,
            args.min_exercise_rights,
        );
        let condition = FdmStepConditionComposite::new(vec![exercise_times], vec![Box::new(swing)]);

        // all value comes from the exercise dates
        let desc = FdmSolverDesc {
            calculator: Arc::new(FdmZeroInnerValue),
            mesher,
            bc_set: FdmBoundaryConditionSet::new(),
            condition,
            maturity,
            time_steps: self.grid.t_grid,
            damping_steps: self.grid.damping_steps,
        };
        let solver = FdmSimple3dExtOUJumpSolver::new(&self.process, self.rate, desc, self.grid.scheme)?;

        let [x0, y0] = self.process.initial_values();
        let npv = solver.value_at(x0, y0, 0.0)?;
        info!(
            npv,
            min_rights = args.min_exercise_rights,
            max_rights,
            "FD jump swing price"
        );
        Ok(PricingResults::from_npv(npv))
    }
}
