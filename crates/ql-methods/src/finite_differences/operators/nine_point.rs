//! Nine-point stencils coupling two directions.

use std::ops::Deref;
use std::sync::Arc;

use ql_core::{errors::Result, Real};
use ql_math::Array;

use super::first_derivative_weights;
use crate::finite_differences::meshers::FdmMesherComposite;

/// Operator coupling each node with its 3×3 neighbourhood in the plane
/// spanned by `d0` and `d1`.
///
/// Stencil slot `k = I + 3·J` holds the neighbour offset by `I - 1` along
/// `d0` and `J - 1` along `d1`.
#[derive(Debug, Clone, PartialEq)]
pub struct NinePointLinearOp {
    d0: usize,
    d1: usize,
    index: Arc<[[usize; 9]]>,
    coeffs: Vec<[Real; 9]>,
}

impl NinePointLinearOp {
    /// Zero operator in the `(d0, d1)` plane.
    pub fn new(d0: usize, d1: usize, mesher: &FdmMesherComposite) -> Result<Self> {
        let layout = mesher.layout();
        ql_core::ensure!(
            d0 != d1 && d0 < layout.ndim() && d1 < layout.ndim(),
            "invalid direction pair ({d0}, {d1}) for a {}-dimensional mesher",
            layout.ndim()
        );
        let index: Vec<[usize; 9]> = layout
            .iter()
            .map(|iter| {
                let mut row = [0; 9];
                for (k, slot) in row.iter_mut().enumerate() {
                    let o0 = (k % 3) as isize - 1;
                    let o1 = (k / 3) as isize - 1;
                    *slot = layout.neighbourhood2(&iter, d0, o0, d1, o1);
                }
                row
            })
            .collect();
        Ok(Self {
            d0,
            d1,
            coeffs: vec![[0.0; 9]; index.len()],
            index: index.into(),
        })
    }

    /// The two directions the stencil spans.
    pub fn directions(&self) -> (usize, usize) {
        (self.d0, self.d1)
    }

    /// `L·r`.
    pub fn apply(&self, r: &Array) -> Array {
        let r = r.as_slice();
        self.index
            .iter()
            .zip(&self.coeffs)
            .map(|(idx, a)| idx.iter().zip(a).map(|(&j, c)| c * r[j]).sum())
            .collect()
    }

    /// Row scaling: row `i` multiplied by `u[i]`.
    pub fn mult(&self, u: &Array) -> Self {
        let mut ret = self.clone();
        for (i, row) in ret.coeffs.iter_mut().enumerate() {
            for c in row.iter_mut() {
                *c *= u[i];
            }
        }
        ret
    }
}

/// `∂²/∂x_d0 ∂x_d1` as the tensor product of the first-derivative stencils.
#[derive(Debug, Clone, PartialEq)]
pub struct SecondOrderMixedDerivativeOp(NinePointLinearOp);

impl SecondOrderMixedDerivativeOp {
    /// Build the mixed derivative on `mesher`.
    pub fn new(d0: usize, d1: usize, mesher: &FdmMesherComposite) -> Result<Self> {
        let mut op = NinePointLinearOp::new(d0, d1, mesher)?;
        let layout = mesher.layout();
        let (n0, n1) = (layout.dim()[d0], layout.dim()[d1]);
        for iter in layout {
            let w0 = first_derivative_weights(
                mesher.dminus(&iter, d0),
                mesher.dplus(&iter, d0),
                iter.coordinate(d0),
                n0,
            );
            let w1 = first_derivative_weights(
                mesher.dminus(&iter, d1),
                mesher.dplus(&iter, d1),
                iter.coordinate(d1),
                n1,
            );
            let row = &mut op.coeffs[iter.index()];
            for (k, c) in row.iter_mut().enumerate() {
                *c = w0[k % 3] * w1[k / 3];
            }
        }
        Ok(Self(op))
    }

    /// The underlying stencil.
    pub fn into_inner(self) -> NinePointLinearOp {
        self.0
    }
}

impl Deref for SecondOrderMixedDerivativeOp {
    type Target = NinePointLinearOp;

    fn deref(&self) -> &NinePointLinearOp {
        &self.0
    }
}
