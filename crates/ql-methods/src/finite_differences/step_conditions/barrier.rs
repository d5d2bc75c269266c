use ql_core::{errors::Result, Real, Time};
use ql_math::Array;

use super::StepCondition;
use crate::finite_differences::boundary_conditions::FdmBoundarySide;
use crate::finite_differences::meshers::FdmMesherComposite;

/// Knock-out barrier monitored at every evaluation time.
///
/// Nodes on or beyond `barrier` along `direction` take the rebate. The
/// barrier is given in mesh coordinates, i.e. `ln B` on a log-spot axis.
#[derive(Debug, Clone)]
pub struct FdmBarrierStepCondition {
    knocked_out: Vec<usize>,
    rebate: Real,
}

impl FdmBarrierStepCondition {
    /// `Lower` knocks out nodes at or below the barrier, `Upper` those at or
    /// above it.
    pub fn new(
        mesher: &FdmMesherComposite,
        direction: usize,
        barrier: Real,
        side: FdmBoundarySide,
        rebate: Real,
    ) -> Result<Self> {
        ql_core::ensure!(
            direction < mesher.layout().ndim(),
            "barrier direction {direction} out of range"
        );
        let knocked_out = mesher
            .layout()
            .iter()
            .filter(|iter| {
                let x = mesher.location(iter, direction);
                match side {
                    FdmBoundarySide::Lower => x <= barrier,
                    FdmBoundarySide::Upper => x >= barrier,
                }
            })
            .map(|iter| iter.index())
            .collect();
        Ok(Self {
            knocked_out,
            rebate,
        })
    }

    /// Flat offsets held at the rebate.
    pub fn knocked_out(&self) -> &[usize] {
        &self.knocked_out
    }
}

impl StepCondition for FdmBarrierStepCondition {
    fn apply_to(&mut self, a: &mut Array, _t: Time) {
        for &i in &self.knocked_out {
            a[i] = self.rebate;
        }
    }
}
