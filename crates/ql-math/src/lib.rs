//! # ql-math
//!
//! Numerical building blocks for the finite-difference engine: the `Array`
//! solution vector (over nalgebra), distributions (via statrs), quadrature,
//! cubic splines, an ODE integrator, root finding and BiCGStab.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Dense one-dimensional arrays.
pub mod array;

/// Preconditioned BiCGStab.
pub mod bicgstab;

/// Floating-point comparison utilities.
pub mod comparison;

/// Probability distributions.
pub mod distributions;

/// Numerical integration.
pub mod integrals;

/// 1D and 2D interpolation schemes.
pub mod interpolations;

/// Adaptive Runge-Kutta ODE integration.
pub mod ode;

/// 1D root-finding solvers.
pub mod solvers1d;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use array::Array;
pub use bicgstab::{BiCGStab, BiCGStabResult};
pub use comparison::{close, close_enough};
pub use distributions::{normal_cdf, normal_cdf_inverse, normal_pdf};
pub use integrals::{GaussLobattoIntegral, Integrator, SimpsonIntegral};
pub use interpolations::{
    BicubicSpline, CubicNaturalSpline, Interpolation1D, Interpolation2D, LinearInterpolation,
};
pub use solvers1d::brent;
