use std::sync::Arc;

use ql_core::{errors::Result, Rate, Real};
use ql_processes::{ExtOUWithJumpsProcess, ExtendedOrnsteinUhlenbeckProcess};

use super::{Fdm2DimSolver, Fdm3DimSolver, FdmSolverDesc};
use crate::finite_differences::operators::{FdmExtOUJumpOp, FdmExtendedOrnsteinUhlenbeckOp};
use crate::finite_differences::schemes::FdmSchemeDesc;

/// Extended OU log price in direction 0 and a static state (storage level)
/// in direction 1.
pub struct FdmSimple2dExtOUSolver {
    solver: Fdm2DimSolver,
}

impl FdmSimple2dExtOUSolver {
    /// Solver discounting at the flat rate `rate`.
    pub fn new(
        process: Arc<ExtendedOrnsteinUhlenbeckProcess>,
        rate: Rate,
        desc: FdmSolverDesc,
        scheme_desc: FdmSchemeDesc,
    ) -> Result<Self> {
        let op = FdmExtendedOrnsteinUhlenbeckOp::new(&desc.mesher, process, rate, 0)?;
        Ok(Self {
            solver: Fdm2DimSolver::new(desc, scheme_desc, Box::new(op))?,
        })
    }

    /// Value at log price `x` and state `y`.
    pub fn value_at(&self, x: Real, y: Real) -> Result<Real> {
        self.solver.interpolate_at(x, y)
    }

    /// `∂V/∂t`.
    pub fn theta_at(&self, x: Real, y: Real) -> Result<Real> {
        self.solver.theta_at(x, y)
    }
}

/// OU factor, jump factor and a static state (exercise count) in
/// directions 0, 1 and 2.
pub struct FdmSimple3dExtOUJumpSolver {
    solver: Fdm3DimSolver,
}

impl FdmSimple3dExtOUJumpSolver {
    /// Solver discounting at the flat rate `rate`.
    pub fn new(
        process: &ExtOUWithJumpsProcess,
        rate: Rate,
        desc: FdmSolverDesc,
        scheme_desc: FdmSchemeDesc,
    ) -> Result<Self> {
        let op = FdmExtOUJumpOp::new(&desc.mesher, process, rate)?;
        Ok(Self {
            solver: Fdm3DimSolver::new(desc, scheme_desc, Box::new(op))?,
        })
    }

    /// Value at `(x, y, z)`.
    pub fn value_at(&self, x: Real, y: Real, z: Real) -> Result<Real> {
        self.solver.interpolate_at(x, y, z)
    }

    /// `∂V/∂t`.
    pub fn theta_at(&self, x: Real, y: Real, z: Real) -> Result<Real> {
        self.solver.theta_at(x, y, z)
    }
}
