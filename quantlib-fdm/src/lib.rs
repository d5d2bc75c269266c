//! # quantlib-fdm
//!
//! Finite-difference pricing of options on multi-factor stochastic models:
//! Heston stochastic volatility, the CIR square-root process, extended
//! Ornstein-Uhlenbeck log prices and OU with exponential jumps.
//!
//! This crate is a **façade** that re-exports the workspace crates.
//! Application code should depend on this crate rather than the individual
//! `ql-*` crates.
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use quantlib_fdm::instruments::{Instrument, OptionType, VanillaOption};
//! use quantlib_fdm::pricingengines::{FdGridSpec, FdHestonVanillaEngine};
//! use quantlib_fdm::processes::HestonProcess;
//!
//! let process = Arc::new(
//!     HestonProcess::new(100.0, 0.04, 0.05, 0.0, 2.5, 0.04, 0.66, -0.8).unwrap(),
//! );
//! let engine = FdHestonVanillaEngine::new(process).with_grid(FdGridSpec::new(50, 50, 25));
//! let put = VanillaOption::american(OptionType::Put, 100.0, 1.0).unwrap();
//! let results = put.price(&engine).unwrap();
//! assert!(results.npv > 5.0 && results.npv < 6.5);
//! ```
//!
//! Engines and solvers log through `tracing`; install a subscriber such as
//! `tracing_subscriber::fmt()` to see rollbacks and prices.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, and error definitions.
pub use ql_core as core;

/// Arrays, interpolation, quadrature, root finding and comparison helpers.
pub use ql_math as math;

/// Heston, Black-Scholes, square-root and Ornstein-Uhlenbeck processes.
pub use ql_processes as processes;

/// The finite-difference framework: meshers, operators, schemes, solvers.
pub use ql_methods as methods;

/// Payoffs, exercises and option contracts.
pub use ql_instruments as instruments;

/// Finite-difference and closed-form pricing engines.
pub use ql_pricingengines as pricingengines;
