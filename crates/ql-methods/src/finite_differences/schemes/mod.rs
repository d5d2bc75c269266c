//! One-step time integrators for `∂u/∂t = L u`.
//!
//! A scheme borrows the operator and the boundary conditions for the
//! duration of a rollback. `step(a, t)` moves `a` from `t` to `t - dt`, the
//! direction of a backward pricing equation; forward equations are run in
//! reversed time by the caller.

mod craig_sneyd;
mod crank_nicolson;
mod douglas;
mod euler;
mod hundsdorfer;

use ql_core::{errors::Result, Real, Time};
use ql_math::Array;

pub use craig_sneyd::{CraigSneydScheme, ModifiedCraigSneydScheme};
pub use crank_nicolson::CrankNicolsonScheme;
pub use douglas::DouglasScheme;
pub use euler::{ExplicitEulerScheme, ImplicitEulerScheme};
pub use hundsdorfer::HundsdorferScheme;

use super::boundary_conditions::FdmBoundaryConditionSet;
use super::operators::FdmLinearOpComposite;

/// A single-step integrator.
pub trait FdmScheme {
    /// Set the step length for subsequent calls to [`FdmScheme::step`].
    fn set_step(&mut self, dt: Time);

    /// Advance `a` from `t` to `t - dt`.
    fn step(&mut self, a: &mut Array, t: Time) -> Result<()>;
}

/// Scheme family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FdmSchemeType {
    /// Hundsdorfer-Verwer ADI.
    Hundsdorfer,
    /// Douglas ADI.
    Douglas,
    /// Craig-Sneyd ADI.
    CraigSneyd,
    /// Modified Craig-Sneyd ADI.
    ModifiedCraigSneyd,
    /// Implicit Euler.
    ImplicitEuler,
    /// Explicit Euler.
    ExplicitEuler,
    /// Crank-Nicolson.
    CrankNicolson,
}

/// Scheme type with its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FdmSchemeDesc {
    /// Scheme family.
    pub scheme_type: FdmSchemeType,
    /// Implicitness of the directional corrections.
    pub theta: Real,
    /// Weight of the second corrector stage.
    pub mu: Real,
}

impl FdmSchemeDesc {
    /// Arbitrary parameters.
    pub fn new(scheme_type: FdmSchemeType, theta: Real, mu: Real) -> Self {
        Self {
            scheme_type,
            theta,
            mu,
        }
    }

    /// Douglas with `θ = 1/2`.
    pub fn douglas() -> Self {
        Self::new(FdmSchemeType::Douglas, 0.5, 0.0)
    }

    /// Craig-Sneyd with `θ = μ = 1/2`.
    pub fn craig_sneyd() -> Self {
        Self::new(FdmSchemeType::CraigSneyd, 0.5, 0.5)
    }

    /// Modified Craig-Sneyd with `θ = μ = 1/3`.
    pub fn modified_craig_sneyd() -> Self {
        Self::new(FdmSchemeType::ModifiedCraigSneyd, 1.0 / 3.0, 1.0 / 3.0)
    }

    /// Hundsdorfer with `θ = 1/2 + √3/6`, `μ = 1/2`.
    pub fn hundsdorfer() -> Self {
        Self::new(
            FdmSchemeType::Hundsdorfer,
            0.5 + 3.0_f64.sqrt() / 6.0,
            0.5,
        )
    }

    /// Hundsdorfer with `θ = 1 - √2/2`, `μ = 1/2`.
    pub fn modified_hundsdorfer() -> Self {
        Self::new(
            FdmSchemeType::Hundsdorfer,
            1.0 - 2.0_f64.sqrt() / 2.0,
            0.5,
        )
    }

    /// Explicit Euler.
    pub fn explicit_euler() -> Self {
        Self::new(FdmSchemeType::ExplicitEuler, 0.0, 0.0)
    }

    /// Implicit Euler.
    pub fn implicit_euler() -> Self {
        Self::new(FdmSchemeType::ImplicitEuler, 0.0, 0.0)
    }

    /// Crank-Nicolson with `θ = 1/2`.
    pub fn crank_nicolson() -> Self {
        Self::new(FdmSchemeType::CrankNicolson, 0.5, 0.0)
    }

    /// Instantiate the scheme on `map` and `bc_set`.
    pub fn build<'a>(
        &self,
        map: &'a mut dyn FdmLinearOpComposite,
        bc_set: &'a mut FdmBoundaryConditionSet,
    ) -> Box<dyn FdmScheme + 'a> {
        match self.scheme_type {
            FdmSchemeType::Hundsdorfer => {
                Box::new(HundsdorferScheme::new(self.theta, self.mu, map, bc_set))
            }
            FdmSchemeType::Douglas => Box::new(DouglasScheme::new(self.theta, map, bc_set)),
            FdmSchemeType::CraigSneyd => {
                Box::new(CraigSneydScheme::new(self.theta, self.mu, map, bc_set))
            }
            FdmSchemeType::ModifiedCraigSneyd => Box::new(ModifiedCraigSneydScheme::new(
                self.theta, self.mu, map, bc_set,
            )),
            FdmSchemeType::ImplicitEuler => Box::new(ImplicitEulerScheme::new(map, bc_set)),
            FdmSchemeType::ExplicitEuler => Box::new(ExplicitEulerScheme::new(map, bc_set)),
            FdmSchemeType::CrankNicolson => {
                Box::new(CrankNicolsonScheme::new(self.theta, map, bc_set))
            }
        }
    }
}

impl Default for FdmSchemeDesc {
    fn default() -> Self {
        Self::douglas()
    }
}

/// Operator, boundary conditions and step length shared by all schemes.
struct StepContext<'a> {
    map: &'a mut dyn FdmLinearOpComposite,
    bc_set: &'a mut FdmBoundaryConditionSet,
    dt: Option<Time>,
}

impl<'a> StepContext<'a> {
    fn new(map: &'a mut dyn FdmLinearOpComposite, bc_set: &'a mut FdmBoundaryConditionSet) -> Self {
        Self {
            map,
            bc_set,
            dt: None,
        }
    }

    /// Freeze the operator on `[t - dt, t]` and return `dt`.
    fn begin(&mut self, t: Time) -> Result<Time> {
        let Some(dt) = self.dt else {
            ql_core::fail!("step length not set");
        };
        ql_core::ensure!(t - dt > -1e-8, "a step towards negative time given");
        let t0 = (t - dt).max(0.0);
        self.map.set_time(t0, t);
        self.bc_set.set_time(t0);
        Ok(dt)
    }

    /// `a + s·L a` with the applying hooks around it.
    fn explicit(&self, a: &Array, s: Real) -> Array {
        self.bc_set.apply_before_applying(&*self.map);
        let mut y = a + &(self.map.apply(a) * s);
        self.bc_set.apply_after_applying(&mut y);
        y
    }

    /// Directional corrections `y ← (I - s·L_i)⁻¹ (y - s·L_i from)`.
    fn corrections(&self, mut y: Array, from: &Array, s: Real) -> Result<Array> {
        for i in 0..self.map.size() {
            let mut rhs = &y - &(self.map.apply_direction(i, from) * s);
            self.bc_set.apply_before_solving(&*self.map, &mut rhs);
            y = self.map.solve_splitting(i, &rhs, -s)?;
        }
        Ok(y)
    }
}
