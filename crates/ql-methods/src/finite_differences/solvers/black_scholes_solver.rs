use ql_core::{errors::Result, Real};
use ql_processes::GeneralizedBlackScholesProcess;

use super::{Fdm1DimSolver, FdmSolverDesc};
use crate::finite_differences::operators::FdmBlackScholesOp;
use crate::finite_differences::schemes::FdmSchemeDesc;

/// Black-Scholes rollback on a log-spot mesh, queried in spot terms.
pub struct FdmBlackScholesSolver {
    solver: Fdm1DimSolver,
}

impl FdmBlackScholesSolver {
    /// Solver with the Black-Scholes operator of `process`.
    pub fn new(
        process: &GeneralizedBlackScholesProcess,
        desc: FdmSolverDesc,
        scheme_desc: FdmSchemeDesc,
    ) -> Result<Self> {
        let op = FdmBlackScholesOp::new(&desc.mesher, process, 0)?;
        Ok(Self {
            solver: Fdm1DimSolver::new(desc, scheme_desc, Box::new(op))?,
        })
    }

    /// Value at spot `s`.
    pub fn value_at(&self, s: Real) -> Result<Real> {
        self.solver.interpolate_at(s.ln())
    }

    /// `∂V/∂S`.
    pub fn delta_at(&self, s: Real) -> Result<Real> {
        Ok(self.solver.derivative_x(s.ln())? / s)
    }

    /// `∂²V/∂S²`.
    pub fn gamma_at(&self, s: Real) -> Result<Real> {
        let x = s.ln();
        Ok((self.solver.derivative_xx(x)? - self.solver.derivative_x(x)?) / (s * s))
    }

    /// `∂V/∂t` at spot `s`.
    pub fn theta_at(&self, s: Real) -> Result<Real> {
        self.solver.theta_at(s.ln())
    }
}
