//! Full pricing rollbacks with interpolated queries.
//!
//! A solver takes an [`FdmSolverDesc`], rolls the payoff back to time zero
//! on its first query and answers `value_at`, Greeks and theta from spline
//! interpolants of the result.

mod backward_solver;
mod black_scholes_solver;
mod dim_solvers;
mod ext_ou_solvers;
mod heston_fwd_solver;
mod heston_solver;
mod lazy;

use std::fmt;
use std::sync::Arc;

use ql_core::{Real, Time};

pub use backward_solver::{FdmBackwardSolver, FiniteDifferenceModel, RollbackState};
pub use black_scholes_solver::FdmBlackScholesSolver;
pub use dim_solvers::{Fdm1DimSolver, Fdm2DimSolver, Fdm3DimSolver};
pub use ext_ou_solvers::{FdmSimple2dExtOUSolver, FdmSimple3dExtOUJumpSolver};
pub use heston_fwd_solver::FdmHestonFwdSolver;
pub use heston_solver::FdmHestonSolver;

use super::boundary_conditions::FdmBoundaryConditionSet;
use super::meshers::FdmMesherComposite;
use super::step_conditions::FdmStepConditionComposite;
use super::utilities::FdmInnerValueCalculator;

/// Everything a backward solver needs besides the operator and the scheme.
pub struct FdmSolverDesc {
    /// Spatial mesh.
    pub mesher: Arc<FdmMesherComposite>,
    /// Boundary conditions.
    pub bc_set: FdmBoundaryConditionSet,
    /// Step conditions and their stopping times.
    pub condition: FdmStepConditionComposite,
    /// Terminal payoff.
    pub calculator: Arc<dyn FdmInnerValueCalculator>,
    /// Rollback start.
    pub maturity: Time,
    /// Steps of the main scheme.
    pub time_steps: usize,
    /// Implicit Euler steps taken first.
    pub damping_steps: usize,
}

impl fmt::Debug for FdmSolverDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FdmSolverDesc")
            .field("dims", &self.mesher.layout().dim())
            .field("bc_set", &self.bc_set)
            .field("condition", &self.condition)
            .field("maturity", &self.maturity)
            .field("time_steps", &self.time_steps)
            .field("damping_steps", &self.damping_steps)
            .finish_non_exhaustive()
    }
}

impl FdmSolverDesc {
    /// Time of the theta snapshot: just short of one day, or of the first
    /// stopping time when that comes earlier.
    pub fn theta_time(&self) -> Time {
        let first = self
            .condition
            .stopping_times()
            .first()
            .copied()
            .unwrap_or(self.maturity);
        0.99 * (1.0 / 365.0 as Real).min(first)
    }
}
