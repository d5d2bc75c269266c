use ql_core::{errors::Result, Real, Time};
use ql_math::{Array, BiCGStab};

use super::{FdmScheme, StepContext};
use crate::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use crate::finite_differences::operators::FdmLinearOpComposite;

/// Default relative tolerance of the BiCGStab solve.
pub const DEFAULT_IMPLICIT_TOLERANCE: Real = 1e-8;

impl StepContext<'_> {
    /// `a ← a + θ·dt·L a`.
    pub(super) fn explicit_euler(&self, a: &mut Array, dt: Time, theta: Real) {
        *a = self.explicit(a, theta * dt);
    }

    /// `a ← (I - θ·dt·L)⁻¹ a`.
    ///
    /// One direction is a banded solve; otherwise BiCGStab runs with the
    /// operator's own preconditioner, starting from `a`.
    pub(super) fn implicit_euler(
        &self,
        a: &mut Array,
        dt: Time,
        theta: Real,
        rel_tol: Real,
    ) -> Result<()> {
        let s = theta * dt;
        self.bc_set.apply_before_solving(&*self.map, a);
        let mut x = if self.map.size() == 1 {
            self.map.solve_splitting(0, a, -s)?
        } else {
            let map = &*self.map;
            let solver = BiCGStab::new(
                |r: &Array| r - &(map.apply(r) * s),
                a.size().max(10),
                rel_tol,
                |r: &Array| map.preconditioner(r, -s),
            );
            solver.solve(&*a, Some(&*a))?.x
        };
        self.bc_set.apply_after_solving(&mut x);
        *a = x;
        Ok(())
    }
}

/// `a(t - dt) = a(t) + dt·L a(t)`; conditionally stable.
pub struct ExplicitEulerScheme<'a> {
    ctx: StepContext<'a>,
}

impl<'a> ExplicitEulerScheme<'a> {
    /// Explicit Euler on `map`.
    pub fn new(
        map: &'a mut dyn FdmLinearOpComposite,
        bc_set: &'a mut FdmBoundaryConditionSet,
    ) -> Self {
        Self {
            ctx: StepContext::new(map, bc_set),
        }
    }
}

impl FdmScheme for ExplicitEulerScheme<'_> {
    fn set_step(&mut self, dt: Time) {
        self.ctx.dt = Some(dt);
    }

    fn step(&mut self, a: &mut Array, t: Time) -> Result<()> {
        let dt = self.ctx.begin(t)?;
        self.ctx.explicit_euler(a, dt, 1.0);
        Ok(())
    }
}

/// `(I - dt·L) a(t - dt) = a(t)`.
pub struct ImplicitEulerScheme<'a> {
    rel_tol: Real,
    ctx: StepContext<'a>,
}

impl<'a> ImplicitEulerScheme<'a> {
    /// Implicit Euler with the default solver tolerance.
    pub fn new(
        map: &'a mut dyn FdmLinearOpComposite,
        bc_set: &'a mut FdmBoundaryConditionSet,
    ) -> Self {
        Self::with_tolerance(map, bc_set, DEFAULT_IMPLICIT_TOLERANCE)
    }

    /// Implicit Euler with relative tolerance `rel_tol` for BiCGStab.
    pub fn with_tolerance(
        map: &'a mut dyn FdmLinearOpComposite,
        bc_set: &'a mut FdmBoundaryConditionSet,
        rel_tol: Real,
    ) -> Self {
        Self {
            rel_tol,
            ctx: StepContext::new(map, bc_set),
        }
    }
}

impl FdmScheme for ImplicitEulerScheme<'_> {
    fn set_step(&mut self, dt: Time) {
        self.ctx.dt = Some(dt);
    }

    fn step(&mut self, a: &mut Array, t: Time) -> Result<()> {
        let dt = self.ctx.begin(t)?;
        self.ctx.implicit_euler(a, dt, 1.0, self.rel_tol)
    }
}
