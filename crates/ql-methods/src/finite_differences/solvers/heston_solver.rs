use ql_core::{errors::Result, Real};
use ql_processes::HestonProcess;

use super::{Fdm2DimSolver, FdmSolverDesc};
use crate::finite_differences::operators::FdmHestonOp;
use crate::finite_differences::schemes::FdmSchemeDesc;

/// Heston rollback on a `(ln S, v)` mesh, queried in `(S, v)`.
pub struct FdmHestonSolver {
    solver: Fdm2DimSolver,
}

impl FdmHestonSolver {
    /// Solver with the Heston operator of `process`.
    pub fn new(
        process: &HestonProcess,
        desc: FdmSolverDesc,
        scheme_desc: FdmSchemeDesc,
    ) -> Result<Self> {
        let op = FdmHestonOp::new(&desc.mesher, process)?;
        Ok(Self {
            solver: Fdm2DimSolver::new(desc, scheme_desc, Box::new(op))?,
        })
    }

    /// Value at spot `s` and variance `v`.
    pub fn value_at(&self, s: Real, v: Real) -> Result<Real> {
        self.solver.interpolate_at(s.ln(), v)
    }

    /// `∂V/∂S`.
    pub fn delta_at(&self, s: Real, v: Real) -> Result<Real> {
        Ok(self.solver.derivative_x(s.ln(), v)? / s)
    }

    /// `∂²V/∂S²`.
    pub fn gamma_at(&self, s: Real, v: Real) -> Result<Real> {
        let x = s.ln();
        Ok((self.solver.derivative_xx(x, v)? - self.solver.derivative_x(x, v)?) / (s * s))
    }

    /// `∂V/∂v`.
    pub fn mean_variance_delta_at(&self, s: Real, v: Real) -> Result<Real> {
        self.solver.derivative_y(s.ln(), v)
    }

    /// `∂²V/∂v²`.
    pub fn mean_variance_gamma_at(&self, s: Real, v: Real) -> Result<Real> {
        self.solver.derivative_yy(s.ln(), v)
    }

    /// `∂V/∂t`.
    pub fn theta_at(&self, s: Real, v: Real) -> Result<Real> {
        self.solver.theta_at(s.ln(), v)
    }
}
