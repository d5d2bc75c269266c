use ql_core::{errors::Result, Real, Time};
use ql_math::Array;

use super::euler::DEFAULT_IMPLICIT_TOLERANCE;
use super::{FdmScheme, StepContext};
use crate::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use crate::finite_differences::operators::FdmLinearOpComposite;

/// θ-scheme: an explicit Euler step of weight `1 - θ` followed by an
/// implicit one of weight `θ`.
pub struct CrankNicolsonScheme<'a> {
    theta: Real,
    rel_tol: Real,
    ctx: StepContext<'a>,
}

impl<'a> CrankNicolsonScheme<'a> {
    /// Scheme with implicitness `theta`.
    pub fn new(
        theta: Real,
        map: &'a mut dyn FdmLinearOpComposite,
        bc_set: &'a mut FdmBoundaryConditionSet,
    ) -> Self {
        Self {
            theta,
            rel_tol: DEFAULT_IMPLICIT_TOLERANCE,
            ctx: StepContext::new(map, bc_set),
        }
    }
}

impl FdmScheme for CrankNicolsonScheme<'_> {
    fn set_step(&mut self, dt: Time) {
        self.ctx.dt = Some(dt);
    }

    fn step(&mut self, a: &mut Array, t: Time) -> Result<()> {
        let dt = self.ctx.begin(t)?;
        if self.theta != 1.0 {
            self.ctx.explicit_euler(a, dt, 1.0 - self.theta);
        }
        if self.theta != 0.0 {
            self.ctx.implicit_euler(a, dt, self.theta, self.rel_tol)?;
        }
        Ok(())
    }
}
