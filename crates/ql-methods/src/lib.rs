//! # ql-methods
//!
//! Finite-difference PDE engine for multi-factor models: composite meshes,
//! banded spatial operators, ADI and θ-method schemes, step conditions and
//! solvers with interpolated value and Greek queries.
//!
//! # Modules
//!
//! * [`finite_differences`] — meshers, operators, schemes, solvers
//! * [`time_grid`] — time discretisations through mandatory dates
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use ql_instruments::{OptionType, PlainVanillaPayoff};
//! use ql_methods::finite_differences::{
//!     FdmLogInnerValue, FdmMesherComposite, FdmSchemeDesc, FdmSolverDesc,
//!     FdmStepConditionComposite, Fdm1DimSolver, FdmBoundaryConditionSet,
//!     FdmBlackScholesOp, Uniform1dMesher,
//! };
//! use ql_processes::GeneralizedBlackScholesProcess;
//!
//! let process = GeneralizedBlackScholesProcess::new(100.0, 0.05, 0.0, 0.2).unwrap();
//! let mesher = Arc::new(
//!     FdmMesherComposite::from_mesher(
//!         Uniform1dMesher::new(100f64.ln() - 1.5, 100f64.ln() + 1.5, 201).unwrap(),
//!     )
//!     .unwrap(),
//! );
//! let payoff = Arc::new(PlainVanillaPayoff::new(OptionType::Call, 100.0));
//! let desc = FdmSolverDesc {
//!     calculator: Arc::new(FdmLogInnerValue::new(payoff, Arc::clone(&mesher), 0)),
//!     bc_set: FdmBoundaryConditionSet::new(),
//!     condition: FdmStepConditionComposite::default(),
//!     maturity: 1.0,
//!     time_steps: 100,
//!     damping_steps: 0,
//!     mesher,
//! };
//! let op = FdmBlackScholesOp::new(&desc.mesher, &process, 0).unwrap();
//! let solver = Fdm1DimSolver::new(desc, FdmSchemeDesc::douglas(), Box::new(op)).unwrap();
//! let npv = solver.interpolate_at(100f64.ln()).unwrap();
//! assert!((npv - 10.4506).abs() < 0.05);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Finite-difference meshers, operators, schemes and solvers.
pub mod finite_differences;

/// Time grids.
pub mod time_grid;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use finite_differences::{
    FdmBackwardSolver, FdmInnerValueCalculator, FdmLinearOpComposite, FdmMesherComposite,
    FdmScheme, FdmSchemeDesc, FdmSchemeType, FdmSolverDesc, FdmStepConditionComposite,
    StepCondition,
};
pub use time_grid::TimeGrid;
