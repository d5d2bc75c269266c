use ql_core::{errors::Result, Real, Time};
use ql_math::Array;

use super::{FdmScheme, StepContext};
use crate::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use crate::finite_differences::operators::FdmLinearOpComposite;

/// Hundsdorfer-Verwer ADI.
///
/// After the Douglas stage the full operator is reapplied to `y - a` with
/// weight `μ`, and the second sweep corrects against the stage value `y`.
pub struct HundsdorferScheme<'a> {
    theta: Real,
    mu: Real,
    ctx: StepContext<'a>,
}

impl<'a> HundsdorferScheme<'a> {
    /// Scheme with parameters `theta` and `mu`.
    pub fn new(
        theta: Real,
        mu: Real,
        map: &'a mut dyn FdmLinearOpComposite,
        bc_set: &'a mut FdmBoundaryConditionSet,
    ) -> Self {
        Self {
            theta,
            mu,
            ctx: StepContext::new(map, bc_set),
        }
    }
}

impl FdmScheme for HundsdorferScheme<'_> {
    fn set_step(&mut self, dt: Time) {
        self.ctx.dt = Some(dt);
    }

    fn step(&mut self, a: &mut Array, t: Time) -> Result<()> {
        let dt = self.ctx.begin(t)?;
        let y0 = self.ctx.explicit(a, dt);
        let y = self.ctx.corrections(y0.clone(), a, self.theta * dt)?;

        self.ctx.bc_set.apply_before_applying(&*self.ctx.map);
        let mut yt = &y0 + &(self.ctx.map.apply(&(&y - &*a)) * (self.mu * dt));
        self.ctx.bc_set.apply_after_applying(&mut yt);

        let mut yt = self.ctx.corrections(yt, &y, self.theta * dt)?;
        self.ctx.bc_set.apply_after_solving(&mut yt);
        *a = yt;
        Ok(())
    }
}
