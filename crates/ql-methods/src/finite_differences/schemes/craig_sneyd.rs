use ql_core::{errors::Result, Real, Time};
use ql_math::Array;

use super::{FdmScheme, StepContext};
use crate::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use crate::finite_differences::operators::FdmLinearOpComposite;

/// Craig-Sneyd ADI: a Douglas stage, then a second sweep that corrects the
/// explicit cross term by `μ·dt·L_mixed(y - a)`.
pub struct CraigSneydScheme<'a> {
    theta: Real,
    mu: Real,
    ctx: StepContext<'a>,
}

impl<'a> CraigSneydScheme<'a> {
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

impl FdmScheme for CraigSneydScheme<'_> {
    fn set_step(&mut self, dt: Time) {
        self.ctx.dt = Some(dt);
    }

    fn step(&mut self, a: &mut Array, t: Time) -> Result<()> {
        let dt = self.ctx.begin(t)?;
        let y0 = self.ctx.explicit(a, dt);
        let y = self.ctx.corrections(y0.clone(), a, self.theta * dt)?;

        self.ctx.bc_set.apply_before_applying(&*self.ctx.map);
        let mut yt = &y0 + &(self.ctx.map.apply_mixed(&(&y - &*a)) * (self.mu * dt));
        self.ctx.bc_set.apply_after_applying(&mut yt);

        let mut yt = self.ctx.corrections(yt, a, self.theta * dt)?;
        self.ctx.bc_set.apply_after_solving(&mut yt);
        *a = yt;
        Ok(())
    }
}

/// Modified Craig-Sneyd: the second stage also carries
/// `(1/2 - μ)·dt·L(y - a)`, which makes it second order for any `θ`.
pub struct ModifiedCraigSneydScheme<'a> {
    theta: Real,
    mu: Real,
    ctx: StepContext<'a>,
}

impl<'a> ModifiedCraigSneydScheme<'a> {
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

impl FdmScheme for ModifiedCraigSneydScheme<'_> {
    fn set_step(&mut self, dt: Time) {
        self.ctx.dt = Some(dt);
    }

    fn step(&mut self, a: &mut Array, t: Time) -> Result<()> {
        let dt = self.ctx.begin(t)?;
        let y0 = self.ctx.explicit(a, dt);
        let y = self.ctx.corrections(y0.clone(), a, self.theta * dt)?;

        let diff = &y - &*a;
        self.ctx.bc_set.apply_before_applying(&*self.ctx.map);
        let mut yt = &(&y0 + &(self.ctx.map.apply_mixed(&diff) * (self.mu * dt)))
            + &(self.ctx.map.apply(&diff) * ((0.5 - self.mu) * dt));
        self.ctx.bc_set.apply_after_applying(&mut yt);

        let mut yt = self.ctx.corrections(yt, a, self.theta * dt)?;
        self.ctx.bc_set.apply_after_solving(&mut yt);
        *a = yt;
        Ok(())
    }
}
