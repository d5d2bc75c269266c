use ql_core::{errors::Result, Real};
use ql_math::Array;

use super::{FdmBoundaryCondition, FdmBoundarySide};
use crate::finite_differences::meshers::FdmMesherComposite;
use crate::finite_differences::operators::FdmLinearOpComposite;

/// Fixed value on one side of one direction.
///
/// The pinned nodes are overwritten after every operator application, in the
/// right-hand side of every solve and in its solution.
#[derive(Debug, Clone, PartialEq)]
pub struct FdmDirichletBoundary {
    value: Real,
    direction: usize,
    side: FdmBoundarySide,
    indices: Vec<usize>,
}

impl FdmDirichletBoundary {
    /// Pin every node on `side` of `direction` to `value`.
    pub fn new(
        mesher: &FdmMesherComposite,
        value: Real,
        direction: usize,
        side: FdmBoundarySide,
    ) -> Result<Self> {
        let layout = mesher.layout();
        ql_core::ensure!(
            direction < layout.ndim(),
            "direction {direction} out of range for a {}-dimensional mesher",
            layout.ndim()
        );
        let edge = match side {
            FdmBoundarySide::Lower => 0,
            FdmBoundarySide::Upper => layout.dim()[direction] - 1,
        };
        let indices = layout
            .iter()
            .filter(|iter| iter.coordinate(direction) == edge)
            .map(|iter| iter.index())
            .collect();
        Ok(Self {
            value,
            direction,
            side,
            indices,
        })
    }

    /// The pinned value.
    pub fn value(&self) -> Real {
        self.value
    }

    /// Direction and side of the boundary.
    pub fn position(&self) -> (usize, FdmBoundarySide) {
        (self.direction, self.side)
    }

    fn pin(&self, a: &mut Array) {
        for &i in &self.indices {
            a[i] = self.value;
        }
    }
}

impl FdmBoundaryCondition for FdmDirichletBoundary {
    fn apply_after_applying(&self, a: &mut Array) {
        self.pin(a);
    }

    fn apply_before_solving(&self, _op: &dyn FdmLinearOpComposite, rhs: &mut Array) {
        self.pin(rhs);
    }

    fn apply_after_solving(&self, a: &mut Array) {
        self.pin(a);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
    use crate::finite_differences::meshers::Uniform1dMesher;
    use crate::finite_differences::schemes::tests::Decay;

    #[test]
    fn pins_only_its_side() {
        let m = FdmMesherComposite::from_pair(
            Uniform1dMesher::new(0.0, 1.0, 3).unwrap(),
            Uniform1dMesher::new(0.0, 1.0, 2).unwrap(),
        )
        .unwrap();
        let bc = FdmDirichletBoundary::new(&m, 7.0, 0, FdmBoundarySide::Upper).unwrap();
        let set: FdmBoundaryConditionSet = std::iter::once(bc).collect();
        let mut a = Array::zeros(6);
        set.apply_after_solving(&mut a);
        assert_eq!(a.to_vec(), vec![0.0, 0.0, 7.0, 0.0, 0.0, 7.0]);
    }

    #[test]
    fn right_hand_side_is_pinned_before_a_solve() {
        let m = FdmMesherComposite::from_mesher(Uniform1dMesher::new(0.0, 1.0, 4).unwrap()).unwrap();
        let lower = FdmDirichletBoundary::new(&m, -1.0, 0, FdmBoundarySide::Lower).unwrap();
        let upper = FdmDirichletBoundary::new(&m, 2.0, 0, FdmBoundarySide::Upper).unwrap();
        let mut set = FdmBoundaryConditionSet::new();
        set.push(lower);
        set.push(upper);

        let op = Decay { lambda: 1.0, ndim: 1 };
        let mut rhs = Array::from_element(4, 0.5);
        set.apply_before_solving(&op, &mut rhs);
        assert_eq!(rhs.to_vec(), vec![-1.0, 0.5, 0.5, 2.0]);
    }
}
