//! Three-band operator along one direction of a composite mesh.

use std::sync::Arc;

use ql_core::{errors::Error, errors::Result, Real};
use ql_math::Array;

use super::FdmLinearOpLayout;
use crate::finite_differences::meshers::FdmMesherComposite;

/// Operator with one lower, diagonal and upper coefficient per node.
///
/// Row `i` couples node `i` with its two neighbours along `direction`
/// (reflected at the edges). The neighbour tables are shared between copies.
#[derive(Debug, Clone, PartialEq)]
pub struct TripleBandLinearOp {
    direction: usize,
    i0: Arc<[usize]>,
    i2: Arc<[usize]>,
    reverse_index: Arc<[usize]>,
    lower: Vec<Real>,
    diag: Vec<Real>,
    upper: Vec<Real>,
}

impl TripleBandLinearOp {
    /// Zero operator along `direction`.
    pub fn new(direction: usize, mesher: &FdmMesherComposite) -> Result<Self> {
        let layout = mesher.layout();
        ql_core::ensure!(
            direction < layout.ndim(),
            "direction {direction} out of range for a {}-dimensional mesher",
            layout.ndim()
        );

        // direction-major ordering so the Thomas sweep runs along lines
        let mut new_dim = layout.dim().to_vec();
        new_dim.swap(0, direction);
        let mut new_spacing = FdmLinearOpLayout::new(&new_dim)?.spacing().to_vec();
        new_spacing.swap(0, direction);

        let size = layout.size();
        let mut i0 = vec![0; size];
        let mut i2 = vec![0; size];
        let mut reverse_index = vec![0; size];
        for iter in layout {
            let i = iter.index();
            i0[i] = layout.neighbourhood(&iter, direction, -1);
            i2[i] = layout.neighbourhood(&iter, direction, 1);
            let new_index: usize = iter
                .coordinates()
                .iter()
                .zip(&new_spacing)
                .map(|(c, s)| c * s)
                .sum();
            reverse_index[new_index] = i;
        }

        Ok(Self {
            direction,
            i0: i0.into(),
            i2: i2.into(),
            reverse_index: reverse_index.into(),
            lower: vec![0.0; size],
            diag: vec![0.0; size],
            upper: vec![0.0; size],
        })
    }

    /// Direction the operator acts along.
    pub fn direction(&self) -> usize {
        self.direction
    }

    /// Number of rows.
    pub fn size(&self) -> usize {
        self.diag.len()
    }

    /// Coefficients on the previous node.
    pub fn lower(&self) -> &[Real] {
        &self.lower
    }

    /// Coefficients on the node itself.
    pub fn diag(&self) -> &[Real] {
        &self.diag
    }

    /// Coefficients on the next node.
    pub fn upper(&self) -> &[Real] {
        &self.upper
    }

    pub(crate) fn set_row(&mut self, i: usize, lower: Real, diag: Real, upper: Real) {
        self.lower[i] = lower;
        self.diag[i] = diag;
        self.upper[i] = upper;
    }

    /// `L·r`.
    pub fn apply(&self, r: &Array) -> Array {
        let r = r.as_slice();
        (0..self.size())
            .map(|i| {
                r[self.i0[i]] * self.lower[i] + r[i] * self.diag[i] + r[self.i2[i]] * self.upper[i]
            })
            .collect()
    }

    /// Solve `(b·I + a·L) x = r` with the Thomas algorithm.
    ///
    /// Lines along the direction are decoupled because the edge rows carry no
    /// coefficient towards the reflected neighbour.
    pub fn solve_splitting(&self, r: &Array, a: Real, b: Real) -> Result<Array> {
        let n = self.size();
        ql_core::ensure!(
            r.size() == n,
            "right-hand side has size {}, operator has {n} rows",
            r.size()
        );
        let singular = |j: usize| {
            Error::SingularOperator(format!(
                "zero pivot at row {} of a tridiagonal solve along direction {}",
                self.reverse_index[j], self.direction
            ))
        };

        let mut ret = vec![0.0; n];
        let mut tmp = vec![0.0; n];

        let mut rim1 = self.reverse_index[0];
        let pivot = a * self.diag[rim1] + b;
        if pivot == 0.0 || !pivot.is_finite() {
            return Err(singular(0));
        }
        let mut bet = 1.0 / pivot;
        ret[rim1] = r[rim1] * bet;

        for j in 1..n {
            let ri = self.reverse_index[j];
            tmp[j] = a * self.upper[rim1] * bet;
            let pivot = b + a * (self.diag[ri] - tmp[j] * self.lower[ri]);
            if pivot == 0.0 || !pivot.is_finite() {
                return Err(singular(j));
            }
            bet = 1.0 / pivot;
            ret[ri] = (r[ri] - a * self.lower[ri] * ret[rim1]) * bet;
            rim1 = ri;
        }
        for j in (0..n - 1).rev() {
            let (rj, rj1) = (self.reverse_index[j], self.reverse_index[j + 1]);
            ret[rj] -= tmp[j + 1] * ret[rj1];
        }
        Ok(Array::from_vec(ret))
    }

    /// Row scaling: row `i` multiplied by `u[i]`.
    pub fn mult(&self, u: &Array) -> Self {
        let mut ret = self.clone();
        for i in 0..self.size() {
            ret.lower[i] *= u[i];
            ret.diag[i] *= u[i];
            ret.upper[i] *= u[i];
        }
        ret
    }

    /// Multiply every coefficient by `s`.
    pub fn scale(&self, s: Real) -> Self {
        let mut ret = self.clone();
        for v in ret
            .lower
            .iter_mut()
            .chain(ret.diag.iter_mut())
            .chain(ret.upper.iter_mut())
        {
            *v *= s;
        }
        ret
    }

    /// Sum of two operators along the same direction.
    pub fn add(&self, m: &TripleBandLinearOp) -> Self {
        let mut ret = self.clone();
        for i in 0..self.size() {
            ret.lower[i] += m.lower[i];
            ret.diag[i] += m.diag[i];
            ret.upper[i] += m.upper[i];
        }
        ret
    }

    /// `L + diag(u)`.
    pub fn add_diagonal(&self, u: &Array) -> Self {
        let mut ret = self.clone();
        for i in 0..self.size() {
            ret.diag[i] += u[i];
        }
        ret
    }

    /// Overwrite with `diag(a)·x + y + diag(b)`.
    ///
    /// `a` and `b` are either empty (term dropped), of length one
    /// (broadcast) or one entry per row.
    pub fn axpyb(&mut self, a: &[Real], x: &TripleBandLinearOp, y: &TripleBandLinearOp, b: &[Real]) {
        let at = |i: usize| if a.len() > 1 { a[i] } else { a[0] };
        let bt = |i: usize| if b.len() > 1 { b[i] } else { b[0] };
        for i in 0..self.size() {
            let (mut l, mut d, mut u) = (y.lower[i], y.diag[i], y.upper[i]);
            if !a.is_empty() {
                let s = at(i);
                l += s * x.lower[i];
                d += s * x.diag[i];
                u += s * x.upper[i];
            }
            if !b.is_empty() {
                d += bt(i);
            }
            self.lower[i] = l;
            self.diag[i] = d;
            self.upper[i] = u;
        }
    }
}
