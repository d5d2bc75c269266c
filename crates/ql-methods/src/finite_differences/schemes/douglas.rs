use ql_core::{errors::Result, Real, Time};
use ql_math::Array;

use super::{FdmScheme, StepContext};
use crate::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use crate::finite_differences::operators::FdmLinearOpComposite;

/// Douglas ADI: an explicit predictor followed by one implicit correction
/// per direction.
pub struct DouglasScheme<'a> {
    theta: Real,
    ctx: StepContext<'a>,
}

impl<'a> DouglasScheme<'a> {
    /// Scheme with implicitness `theta`.
    pub fn new(
        theta: Real,
        map: &'a mut dyn FdmLinearOpComposite,
        bc_set: &'a mut FdmBoundaryConditionSet,
    ) -> Self {
        Self {
            theta,
            ctx: StepContext::new(map, bc_set),
        }
    }
}

impl FdmScheme for DouglasScheme<'_> {
    fn set_step(&mut self, dt: Time) {
        self.ctx.dt = Some(dt);
    }

    fn step(&mut self, a: &mut Array, t: Time) -> Result<()> {
        let dt = self.ctx.begin(t)?;
        let y = self.ctx.explicit(a, dt);
        let mut y = self.ctx.corrections(y, a, self.theta * dt)?;
        self.ctx.bc_set.apply_after_solving(&mut y);
        *a = y;
        Ok(())
    }
}
