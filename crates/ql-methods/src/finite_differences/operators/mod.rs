//! Difference operators on composite meshes.
//!
//! Derivative operators are banded along one direction ([`TripleBandLinearOp`])
//! or two ([`NinePointLinearOp`]). The model generators combine them into an
//! [`FdmLinearOpComposite`], the interface the evolution schemes work with.

use ql_core::{errors::Result, Real, Time};
use ql_math::Array;

mod black_scholes_op;
mod derivatives;
mod ext_ou_jump_op;
mod ext_ou_op;
mod heston_fwd_op;
mod heston_op;
mod layout;
mod nine_point;
mod square_root_fwd_op;
mod triple_band;

pub use black_scholes_op::FdmBlackScholesOp;
pub use derivatives::{first_derivative_weights, FirstDerivativeOp, SecondDerivativeOp};
pub use ext_ou_jump_op::FdmExtOUJumpOp;
pub use ext_ou_op::FdmExtendedOrnsteinUhlenbeckOp;
pub use heston_fwd_op::FdmHestonFwdOp;
pub use heston_op::FdmHestonOp;
pub use layout::{FdmLinearOpIterator, FdmLinearOpLayout, LayoutIter, MAX_DIMENSIONS};
pub use nine_point::{NinePointLinearOp, SecondOrderMixedDerivativeOp};
pub use square_root_fwd_op::{FdmSquareRootFwdOp, FdmSquareRootFwdOpTransformation};
pub use triple_band::TripleBandLinearOp;

/// A spatial operator split into per-direction parts plus cross terms.
///
/// `apply` is the full operator. `apply_direction(d, ·)` is the part acting
/// along direction `d` only and `apply_mixed` the remainder (correlation and
/// jump terms), which ADI schemes treat explicitly. `solve_splitting(d, r, s)`
/// returns `(I + s·L_d)⁻¹ r`.
pub trait FdmLinearOpComposite: Send {
    /// Number of directions the operator is split into.
    fn size(&self) -> usize;

    /// Freeze time-dependent coefficients for a step from `t1` to `t2`.
    fn set_time(&mut self, t1: Time, t2: Time);

    /// Full operator.
    fn apply(&self, r: &Array) -> Array;

    /// Cross terms only.
    fn apply_mixed(&self, r: &Array) -> Array;

    /// Part acting along `direction`; zero for directions without dynamics.
    fn apply_direction(&self, direction: usize, r: &Array) -> Array;

    /// Solve `(I + s·L_direction) x = r`; identity for directions without
    /// dynamics.
    fn solve_splitting(&self, direction: usize, r: &Array, s: Real) -> Result<Array>;

    /// Cheap approximate inverse of `I + s·L` for iterative solvers.
    fn preconditioner(&self, r: &Array, s: Real) -> Result<Array>;
}
