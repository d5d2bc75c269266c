//! Finite-difference PDE framework.
//!
//! A problem is assembled from independent parts:
//!
//! * [`meshers`] — 1D grids and their tensor-product composite
//! * [`operators`] — spatial operators on the composite layout
//! * [`boundary_conditions`] — Dirichlet and zero-flow closures
//! * [`step_conditions`] — exercise, barrier, snapshot and state-switching
//!   conditions applied between steps
//! * [`schemes`] — ADI and θ-method time stepping
//! * [`solvers`] — rollbacks with interpolated value and Greek queries
//! * [`utilities`] — payoff evaluation on the mesh, mesh integrals and
//!   forward-problem seeds

pub mod boundary_conditions;
pub mod meshers;
pub mod operators;
pub mod schemes;
pub mod solvers;
pub mod step_conditions;
pub mod utilities;

pub use boundary_conditions::{
    FdmBoundaryCondition, FdmBoundaryConditionSet, FdmBoundarySide, FdmDirichletBoundary,
    ZeroFlowBoundary,
};
pub use meshers::{
    Concentrating1dMesher, CriticalPoint, ExponentialJump1dMesher, Fdm1dMesher,
    FdmBlackScholesMesher, FdmHestonVarianceMesher, FdmMesherComposite,
    FdmSimpleProcess1dMesher, Predefined1dMesher, Uniform1dMesher,
};
pub use operators::{
    FdmBlackScholesOp, FdmExtOUJumpOp, FdmExtendedOrnsteinUhlenbeckOp, FdmHestonFwdOp,
    FdmHestonOp, FdmLinearOpComposite, FdmLinearOpIterator, FdmLinearOpLayout,
    FdmSquareRootFwdOp, FdmSquareRootFwdOpTransformation,
};
pub use schemes::{FdmScheme, FdmSchemeDesc, FdmSchemeType};
pub use solvers::{
    Fdm1DimSolver, Fdm2DimSolver, Fdm3DimSolver, FdmBackwardSolver, FdmBlackScholesSolver,
    FdmHestonFwdSolver, FdmHestonSolver, FdmSimple2dExtOUSolver, FdmSimple3dExtOUJumpSolver,
    FdmSolverDesc,
};
pub use step_conditions::{FdmStepConditionComposite, StepCondition};
pub use utilities::{FdmInnerValueCalculator, FdmLogInnerValue, FdmMesherIntegral};
