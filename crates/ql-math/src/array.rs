//! `Array`: the flat solution vector of the finite-difference engine.
//!
//! A newtype over `nalgebra::DVector<Real>`. The operators and schemes only
//! need indexing, vector-space arithmetic, the element-wise product used to
//! scale operator rows, and the dot product and norm of the iterative
//! solver, so that is all it exposes.

use nalgebra::DVector;
use ql_core::Real;
use std::ops::{Add, AddAssign, Div, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign};

/// A dynamically-sized vector of `Real` values laid out like the mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Array(DVector<Real>);

impl Array {
    /// `n` zeros.
    pub fn zeros(n: usize) -> Self {
        Self(DVector::zeros(n))
    }

    /// `n` copies of `value`.
    pub fn from_element(n: usize, value: Real) -> Self {
        Self(DVector::from_element(n, value))
    }

    /// Copy of `data`.
    pub fn from_slice(data: &[Real]) -> Self {
        Self(DVector::from_column_slice(data))
    }

    /// Take ownership of `data`.
    pub fn from_vec(data: Vec<Real>) -> Self {
        Self(DVector::from_vec(data))
    }

    /// Number of elements.
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// `true` for a zero-length array.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The elements in mesh order.
    pub fn as_slice(&self) -> &[Real] {
        self.0.as_slice()
    }

    /// The elements in mesh order, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [Real] {
        self.0.as_mut_slice()
    }

    /// `Σ self[i]·other[i]`.
    pub fn dot(&self, other: &Array) -> Real {
        self.0.dot(&other.0)
    }

    /// Euclidean norm.
    pub fn norm(&self) -> Real {
        self.0.norm()
    }

    /// Sum of the elements.
    pub fn sum(&self) -> Real {
        self.0.sum()
    }

    /// `f` applied to every element.
    pub fn map<F: Fn(Real) -> Real>(&self, f: F) -> Self {
        Self(self.0.map(f))
    }

    /// `scalar · self`.
    pub fn scale(&self, scalar: Real) -> Self {
        Self(&self.0 * scalar)
    }

    /// Iterator over the elements.
    pub fn iter(&self) -> impl Iterator<Item = &Real> {
        self.0.iter()
    }

    /// Mutable iterator over the elements.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Real> {
        self.0.iter_mut()
    }

    /// `self += a · x`.
    pub fn axpy(&mut self, a: Real, x: &Array) {
        self.0.axpy(a, &x.0, 1.0);
    }

    /// The elements as a `Vec`.
    pub fn to_vec(&self) -> Vec<Real> {
        self.as_slice().to_vec()
    }
}

impl FromIterator<Real> for Array {
    fn from_iter<I: IntoIterator<Item = Real>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl From<Vec<Real>> for Array {
    fn from(v: Vec<Real>) -> Self {
        Self::from_vec(v)
    }
}

impl From<&[Real]> for Array {
    fn from(s: &[Real]) -> Self {
        Self::from_slice(s)
    }
}

impl Index<usize> for Array {
    type Output = Real;
    fn index(&self, i: usize) -> &Real {
        &self.0[i]
    }
}

impl IndexMut<usize> for Array {
    fn index_mut(&mut self, i: usize) -> &mut Real {
        &mut self.0[i]
    }
}

// owned and borrowed forms of `a ⊕ b` for both arrays and scalars
macro_rules! vector_op {
    ($tr:ident, $f:ident, $op:tt) => {
        impl $tr for &Array {
            type Output = Array;
            fn $f(self, rhs: &Array) -> Array {
                Array(&self.0 $op &rhs.0)
            }
        }

        impl $tr for Array {
            type Output = Array;
            fn $f(self, rhs: Array) -> Array {
                Array(self.0 $op rhs.0)
            }
        }
    };
}

macro_rules! scalar_op {
    ($tr:ident, $f:ident, $op:tt) => {
        impl $tr<Real> for &Array {
            type Output = Array;
            fn $f(self, rhs: Real) -> Array {
                Array(&self.0 $op rhs)
            }
        }

        impl $tr<Real> for Array {
            type Output = Array;
            fn $f(self, rhs: Real) -> Array {
                Array(self.0 $op rhs)
            }
        }
    };
}

vector_op!(Add, add, +);
vector_op!(Sub, sub, -);
scalar_op!(Mul, mul, *);
scalar_op!(Div, div, /);

impl Mul<&Array> for Real {
    type Output = Array;
    fn mul(self, rhs: &Array) -> Array {
        Array(&rhs.0 * self)
    }
}

/// Element-wise product.
impl Mul<&Array> for &Array {
    type Output = Array;
    fn mul(self, rhs: &Array) -> Array {
        Array(self.0.component_mul(&rhs.0))
    }
}

impl AddAssign<&Array> for Array {
    fn add_assign(&mut self, rhs: &Array) {
        self.0 += &rhs.0;
    }
}

impl SubAssign<&Array> for Array {
    fn sub_assign(&mut self, rhs: &Array) {
        self.0 -= &rhs.0;
    }
}

impl MulAssign<Real> for Array {
    fn mul_assign(&mut self, rhs: Real) {
        self.0 *= rhs;
    }
}

impl Neg for &Array {
    type Output = Array;
    fn neg(self) -> Array {
        Array(-&self.0)
    }
}

impl Neg for Array {
    type Output = Array;
    fn neg(self) -> Array {
        Array(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn a() -> Array {
        Array::from_slice(&[1.0, -2.0, 3.0])
    }

    #[test]
    fn constructors_agree() {
        assert_eq!(Array::zeros(3), Array::from_element(3, 0.0));
        assert_eq!(Array::from_vec(vec![1.0, -2.0, 3.0]), a());
        assert_eq!([1.0, -2.0, 3.0].into_iter().collect::<Array>(), a());
        assert!(Array::zeros(0).is_empty());
    }

    #[test]
    fn vector_space_arithmetic() {
        let b = Array::from_slice(&[0.5, 0.5, 0.5]);
        assert_eq!((&a() + &b).to_vec(), vec![1.5, -1.5, 3.5]);
        assert_eq!((a() - b.clone()).to_vec(), vec![0.5, -2.5, 2.5]);
        assert_eq!((2.0 * &a()).to_vec(), (&a() * 2.0).to_vec());
        assert_eq!((a() / 2.0).to_vec(), a().scale(0.5).to_vec());
        assert_eq!((-a()).to_vec(), vec![-1.0, 2.0, -3.0]);
    }

    #[test]
    fn element_wise_product_and_axpy() {
        let w = Array::from_slice(&[2.0, 0.5, -1.0]);
        assert_eq!((&a() * &w).to_vec(), vec![2.0, -1.0, -3.0]);

        let mut c = a();
        c.axpy(2.0, &w);
        assert_eq!(c.to_vec(), vec![5.0, -1.0, 1.0]);
        c -= &a();
        c *= 0.5;
        assert_eq!(c, w);
        c += &a();
        assert_eq!(c.to_vec(), vec![3.0, -1.5, 2.0]);
    }

    #[test]
    fn reductions() {
        assert_abs_diff_eq!(a().dot(&a()), 14.0, epsilon = 1e-15);
        assert_abs_diff_eq!(a().norm(), 14f64.sqrt(), epsilon = 1e-15);
        assert_abs_diff_eq!(a().sum(), 2.0, epsilon = 1e-15);
    }
}
