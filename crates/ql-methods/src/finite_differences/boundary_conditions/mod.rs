//! Boundary conditions applied around each evolution step.

use ql_core::Time;
use ql_math::Array;

use super::operators::FdmLinearOpComposite;

mod dirichlet;
mod zero_flow;

pub use dirichlet::FdmDirichletBoundary;
pub use zero_flow::{FaceFlux, ZeroFlowBoundary};

/// Which end of a direction a boundary condition sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FdmBoundarySide {
    /// Coordinate 0.
    Lower,
    /// Last coordinate.
    Upper,
}

/// Hooks a scheme calls around its operator applications and solves.
///
/// Each scheme fixes the order in which the hooks run; all default to no-ops.
pub trait FdmBoundaryCondition: Send {
    /// Update time-dependent boundary data.
    fn set_time(&mut self, _t: Time) {}

    /// Called before the operator is applied.
    fn apply_before_applying(&self, _op: &dyn FdmLinearOpComposite) {}

    /// Called on the result of an operator application.
    fn apply_after_applying(&self, _a: &mut Array) {}

    /// Called on the right-hand side before a solve.
    fn apply_before_solving(&self, _op: &dyn FdmLinearOpComposite, _rhs: &mut Array) {}

    /// Called on the solution of a solve.
    fn apply_after_solving(&self, _a: &mut Array) {}
}

/// Ordered collection of boundary conditions.
#[derive(Default)]
pub struct FdmBoundaryConditionSet(Vec<Box<dyn FdmBoundaryCondition>>);

impl std::fmt::Debug for FdmBoundaryConditionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FdmBoundaryConditionSet")
            .field("len", &self.0.len())
            .finish()
    }
}

impl FdmBoundaryConditionSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a condition.
    pub fn push(&mut self, bc: impl FdmBoundaryCondition + 'static) {
        self.0.push(Box::new(bc));
    }

    /// Number of conditions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Forward `set_time` to every condition.
    pub fn set_time(&mut self, t: Time) {
        for bc in &mut self.0 {
            bc.set_time(t);
        }
    }

    /// Forward `apply_before_applying` to every condition.
    pub fn apply_before_applying(&self, op: &dyn FdmLinearOpComposite) {
        for bc in &self.0 {
            bc.apply_before_applying(op);
        }
    }

    /// Forward `apply_after_applying` to every condition.
    pub fn apply_after_applying(&self, a: &mut Array) {
        for bc in &self.0 {
            bc.apply_after_applying(a);
        }
    }

    /// Forward `apply_before_solving` to every condition.
    pub fn apply_before_solving(&self, op: &dyn FdmLinearOpComposite, rhs: &mut Array) {
        for bc in &self.0 {
            bc.apply_before_solving(op, rhs);
        }
    }

    /// Forward `apply_after_solving` to every condition.
    pub fn apply_after_solving(&self, a: &mut Array) {
        for bc in &self.0 {
            bc.apply_after_solving(a);
        }
    }
}

impl<B: FdmBoundaryCondition + 'static> FromIterator<B> for FdmBoundaryConditionSet {
    fn from_iter<I: IntoIterator<Item = B>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|bc| Box::new(bc) as Box<dyn FdmBoundaryCondition>)
                .collect(),
        )
    }
}
