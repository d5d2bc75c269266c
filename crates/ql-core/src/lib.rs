//! # ql-core
//!
//! Core types and error definitions for quantlib-fdm.
//!
//! This crate provides the foundational building blocks shared across all
//! other crates in the workspace: numeric type aliases and the error enum
//! with its `ensure!` / `fail!` macros.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Error types and the `ensure!` / `fail!` macros.
pub mod errors;

// ── Primitive type aliases ────────────────────────────────────────────────────

/// Floating-point type used throughout the library.
pub type Real = f64;

/// A rate expressed as a decimal (e.g. 0.05 = 5 %).
pub type Rate = Real;

/// A discount factor in [0, 1].
pub type DiscountFactor = Real;

/// A volatility level expressed as a decimal.
pub type Volatility = Real;

/// A time measurement in years.
pub type Time = Real;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use errors::{Error, Result};

#[cfg(test)]
mod tests {
    use super::*;

    fn checked_sqrt(x: Real) -> Result<Real> {
        ensure!(x >= 0.0, "negative argument {x}");
        Ok(x.sqrt())
    }

    #[test]
    fn ensure_returns_precondition_error() {
        assert_eq!(checked_sqrt(4.0), Ok(2.0));
        match checked_sqrt(-1.0) {
            Err(Error::Precondition(msg)) => assert!(msg.contains("negative")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn out_of_domain_message_names_bounds() {
        let e = Error::OutOfDomain {
            value: 3.0,
            min: 0.0,
            max: 2.0,
        };
        assert_eq!(e.to_string(), "3 is outside the mesh domain [0, 2]");
    }
}
