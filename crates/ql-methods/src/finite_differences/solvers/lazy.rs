use std::sync::{Arc, Mutex, OnceLock};

use ql_core::{
    errors::{Error, Result},
    Real, Time,
};
use ql_math::Array;

use super::{FdmBackwardSolver, FdmSolverDesc};
use crate::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use crate::finite_differences::meshers::FdmMesherComposite;
use crate::finite_differences::operators::FdmLinearOpComposite;
use crate::finite_differences::schemes::FdmSchemeDesc;
use crate::finite_differences::step_conditions::{FdmSnapshotCondition, FdmStepConditionComposite};
use crate::finite_differences::utilities::FdmInnerValueCalculator;

/// Interpolant of a mesh function.
pub(crate) trait MeshInterpolant: Sized + Send + Sync {
    fn build(mesher: &FdmMesherComposite, values: &Array) -> Result<Self>;
}

/// `Err(OutOfDomain)` unless `lo ≤ v ≤ hi`, up to rounding.
pub(crate) fn check_domain(v: Real, lo: Real, hi: Real) -> Result<()> {
    let tol = 1e-10 * (hi - lo).abs().max(1.0);
    if v < lo - tol || v > hi + tol || v.is_nan() {
        return Err(Error::OutOfDomain {
            value: v,
            min: lo,
            max: hi,
        });
    }
    Ok(())
}

/// Parts consumed by the one rollback.
struct Pending {
    op: Box<dyn FdmLinearOpComposite>,
    bc_set: FdmBoundaryConditionSet,
    condition: FdmStepConditionComposite,
}

/// Result of a rollback.
pub(crate) struct Solution<I> {
    pub values: Array,
    pub interp: I,
    pub theta_interp: I,
}

/// Rollback run on first use and cached, errors included.
pub(crate) struct LazyRollback<I> {
    mesher: Arc<FdmMesherComposite>,
    calculator: Arc<dyn FdmInnerValueCalculator>,
    maturity: Time,
    time_steps: usize,
    damping_steps: usize,
    scheme_desc: FdmSchemeDesc,
    snapshot: FdmSnapshotCondition,
    pending: Mutex<Option<Pending>>,
    solution: OnceLock<Result<Solution<I>>>,
}

impl<I: MeshInterpolant> LazyRollback<I> {
    pub fn new(
        desc: FdmSolverDesc,
        scheme_desc: FdmSchemeDesc,
        op: Box<dyn FdmLinearOpComposite>,
    ) -> Result<Self> {
        ql_core::ensure!(
            desc.maturity > 0.0,
            "maturity must be positive, got {}",
            desc.maturity
        );
        let theta_time = desc.theta_time();
        let snapshot = FdmSnapshotCondition::new(theta_time);
        let condition = FdmStepConditionComposite::join_conditions(
            FdmStepConditionComposite::new(vec![vec![theta_time]], vec![Box::new(snapshot.clone())]),
            desc.condition,
        );
        Ok(Self {
            mesher: desc.mesher,
            calculator: desc.calculator,
            maturity: desc.maturity,
            time_steps: desc.time_steps,
            damping_steps: desc.damping_steps,
            scheme_desc,
            snapshot,
            pending: Mutex::new(Some(Pending {
                op,
                bc_set: desc.bc_set,
                condition,
            })),
            solution: OnceLock::new(),
        })
    }

    pub fn mesher(&self) -> &Arc<FdmMesherComposite> {
        &self.mesher
    }

    pub fn theta_time(&self) -> Time {
        self.snapshot.time()
    }

    pub fn solution(&self) -> Result<&Solution<I>> {
        self.solution
            .get_or_init(|| self.solve())
            .as_ref()
            .map_err(Clone::clone)
    }

    fn solve(&self) -> Result<Solution<I>> {
        let mut pending = self
            .pending
            .lock()
            .map_err(|_| Error::Runtime("solver state poisoned".into()))?
            .take()
            .ok_or_else(|| Error::Runtime("rollback already consumed".into()))?;

        let mut a: Array = self
            .mesher
            .layout()
            .iter()
            .map(|iter| self.calculator.avg_inner_value(&iter, self.maturity))
            .collect();
        FdmBackwardSolver::new(
            pending.op.as_mut(),
            &mut pending.bc_set,
            &mut pending.condition,
            self.scheme_desc,
        )
        .rollback(&mut a, self.maturity, 0.0, self.time_steps, self.damping_steps)?;

        let Some(theta_values) = self.snapshot.values() else {
            ql_core::fail!("theta snapshot at {} was not taken", self.snapshot.time());
        };
        Ok(Solution {
            interp: I::build(&self.mesher, &a)?,
            theta_interp: I::build(&self.mesher, theta_values)?,
            values: a,
        })
    }

    /// `(V(t_θ) - V(0)) / t_θ` from two interpolated values.
    pub fn theta(&self, at_theta: Real, at_zero: Real) -> Result<Real> {
        let t = self.theta_time();
        ql_core::ensure!(t > 0.0, "theta snapshot at time zero");
        Ok((at_theta - at_zero) / t)
    }
}
