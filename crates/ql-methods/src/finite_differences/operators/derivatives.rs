//! First and second derivative operators on non-uniform grids.

use std::ops::Deref;

use ql_core::{errors::Result, Real};

use super::TripleBandLinearOp;
use crate::finite_differences::meshers::FdmMesherComposite;

/// Weights `(previous, self, next)` of the first derivative at coordinate
/// `c` of a line with `n` nodes.
///
/// Interior nodes use the second-order three-point formula; the edges fall
/// back to one-sided differences.
pub fn first_derivative_weights(hm: Real, hp: Real, c: usize, n: usize) -> [Real; 3] {
    if c == 0 {
        [0.0, -1.0 / hp, 1.0 / hp]
    } else if c == n - 1 {
        [-1.0 / hm, 1.0 / hm, 0.0]
    } else {
        let zeta = hm * (hm + hp);
        let zetap = hp * (hm + hp);
        [-hp / zeta, (hp - hm) / (hm * hp), hm / zetap]
    }
}

/// Central first derivative along one direction.
#[derive(Debug, Clone, PartialEq)]
pub struct FirstDerivativeOp(TripleBandLinearOp);

impl FirstDerivativeOp {
    /// Build `∂/∂x_direction` on `mesher`.
    pub fn new(direction: usize, mesher: &FdmMesherComposite) -> Result<Self> {
        let mut op = TripleBandLinearOp::new(direction, mesher)?;
        let layout = mesher.layout();
        let n = layout.dim()[direction];
        for iter in layout {
            let [l, d, u] = first_derivative_weights(
                mesher.dminus(&iter, direction),
                mesher.dplus(&iter, direction),
                iter.coordinate(direction),
                n,
            );
            op.set_row(iter.index(), l, d, u);
        }
        Ok(Self(op))
    }

    /// The underlying banded operator.
    pub fn into_inner(self) -> TripleBandLinearOp {
        self.0
    }
}

impl Deref for FirstDerivativeOp {
    type Target = TripleBandLinearOp;

    fn deref(&self) -> &TripleBandLinearOp {
        &self.0
    }
}

/// Central second derivative along one direction, zero on the edge rows.
#[derive(Debug, Clone, PartialEq)]
pub struct SecondDerivativeOp(TripleBandLinearOp);

impl SecondDerivativeOp {
    /// Build `∂²/∂x_direction²` on `mesher`.
    pub fn new(direction: usize, mesher: &FdmMesherComposite) -> Result<Self> {
        let mut op = TripleBandLinearOp::new(direction, mesher)?;
        let layout = mesher.layout();
        let n = layout.dim()[direction];
        for iter in layout {
            let c = iter.coordinate(direction);
            if c == 0 || c == n - 1 {
                continue;
            }
            let hm = mesher.dminus(&iter, direction);
            let hp = mesher.dplus(&iter, direction);
            let zeta = hm * hp * (hm + hp);
            op.set_row(iter.index(), 2.0 * hp / zeta, -2.0 / (hm * hp), 2.0 * hm / zeta);
        }
        Ok(Self(op))
    }

    /// The underlying banded operator.
    pub fn into_inner(self) -> TripleBandLinearOp {
        self.0
    }
}

impl Deref for SecondDerivativeOp {
    type Target = TripleBandLinearOp;

    fn deref(&self) -> &TripleBandLinearOp {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::{Concentrating1dMesher, Uniform1dMesher};
    use approx::assert_abs_diff_eq;
    use ql_math::Array;

    fn mesher() -> FdmMesherComposite {
        FdmMesherComposite::from_pair(
            Concentrating1dMesher::new(-1.0, 2.0, 30, Some((0.3, 0.2)), false).unwrap(),
            Uniform1dMesher::new(0.0, 1.0, 4).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn exact_on_quadratics_in_the_interior() {
        let m = mesher();
        let x = m.locations(0);
        let f = x.map(|x| 3.0 * x * x - x + 2.0);
        let d1 = FirstDerivativeOp::new(0, &m).unwrap().apply(&f);
        let d2 = SecondDerivativeOp::new(0, &m).unwrap().apply(&f);
        for iter in m.layout() {
            let (i, c) = (iter.index(), iter.coordinate(0));
            if c == 0 || c == 29 {
                assert_eq!(d2[i], 0.0);
                continue;
            }
            assert_abs_diff_eq!(d1[i], 6.0 * x[i] - 1.0, epsilon = 1e-9);
            assert_abs_diff_eq!(d2[i], 6.0, epsilon = 1e-8);
        }
    }

    #[test]
    fn edges_are_one_sided() {
        let m = mesher();
        let x = m.locations(0);
        let f: Array = x.map(|x| 2.0 * x + 1.0);
        let d1 = FirstDerivativeOp::new(0, &m).unwrap().apply(&f);
        for i in 0..m.layout().size() {
            assert_abs_diff_eq!(d1[i], 2.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn acts_only_along_its_direction() {
        let m = mesher();
        let f = m.locations(0).map(|x| x.sin());
        let d = FirstDerivativeOp::new(1, &m).unwrap().apply(&f);
        assert!(d.iter().all(|v| v.abs() < 1e-12));
    }
}
