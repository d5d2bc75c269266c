//! Error types for quantlib-fdm.
//!
//! Every crate in the workspace reports failures through the single
//! `thiserror`-derived [`Error`] enum.  Precondition checks go through the
//! `ensure!` and `fail!` convenience macros defined here; the finite-difference
//! engine adds its own variants for mesh, operator, exercise and domain errors.

use thiserror::Error;

/// The top-level error type used throughout quantlib-fdm.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// General runtime error (raised by `fail!`).
    #[error("{0}")]
    Runtime(String),

    /// Precondition violated (raised by `ensure!`).
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A mesher was given too few points or degenerate bounds.
    #[error("insufficient mesher: {0}")]
    InsufficientMesher(String),

    /// A critical point of a concentrating mesher cannot be honoured.
    #[error("invalid critical point: {0}")]
    InvalidCriticalPoint(String),

    /// A tridiagonal system hit a zero pivot.
    #[error("singular operator: {0}")]
    SingularOperator(String),

    /// The exercise of a contract is not supported by the engine.
    #[error("unsupported exercise: {0}")]
    UnsupportedExercise(String),

    /// A query coordinate lies outside the mesh.
    #[error("{value} is outside the mesh domain [{min}, {max}]")]
    OutOfDomain {
        /// The offending coordinate.
        value: f64,
        /// Lower mesh bound.
        min: f64,
        /// Upper mesh bound.
        max: f64,
    },
}

/// Shorthand `Result` type used throughout quantlib-fdm.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Checks a precondition.
///
/// Returns `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use ql_core::{ensure, errors::Error};
/// fn positive(x: f64) -> ql_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(positive(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Bails out with a runtime error.
///
/// Returns `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use ql_core::{fail, errors::Error};
/// fn always_err() -> ql_core::errors::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}
