use ql_core::{errors::Result, Real};
use ql_math::{Array, BicubicSpline, CubicNaturalSpline, Interpolation1D, Interpolation2D};

use super::lazy::{check_domain, LazyRollback, MeshInterpolant};
use super::FdmSolverDesc;
use crate::finite_differences::meshers::FdmMesherComposite;
use crate::finite_differences::operators::FdmLinearOpComposite;
use crate::finite_differences::schemes::FdmSchemeDesc;

impl MeshInterpolant for CubicNaturalSpline {
    fn build(mesher: &FdmMesherComposite, values: &Array) -> Result<Self> {
        CubicNaturalSpline::new(mesher.get_fdm_1d_meshers()[0].locations(), values.as_slice())
    }
}

impl MeshInterpolant for BicubicSpline {
    fn build(mesher: &FdmMesherComposite, values: &Array) -> Result<Self> {
        let m = mesher.get_fdm_1d_meshers();
        BicubicSpline::new(m[0].locations(), m[1].locations(), values.as_slice())
    }
}

/// Bicubic splines on each `z` layer, joined linearly in `z`.
#[derive(Debug, Clone)]
pub(crate) struct LayeredBicubic {
    z: Vec<Real>,
    layers: Vec<BicubicSpline>,
}

impl MeshInterpolant for LayeredBicubic {
    fn build(mesher: &FdmMesherComposite, values: &Array) -> Result<Self> {
        let m = mesher.get_fdm_1d_meshers();
        let (x, y) = (m[0].locations(), m[1].locations());
        let layer_size = x.len() * y.len();
        let layers = values
            .as_slice()
            .chunks(layer_size)
            .map(|layer| BicubicSpline::new(x, y, layer))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            z: m[2].locations().to_vec(),
            layers,
        })
    }
}

impl LayeredBicubic {
    fn value(&self, x: Real, y: Real, z: Real) -> Real {
        let n = self.z.len();
        let k = self.z.partition_point(|&v| v <= z).clamp(1, n - 1) - 1;
        let (f0, f1) = (self.layers[k].operator(x, y), self.layers[k + 1].operator(x, y));
        let s = (z - self.z[k]) / (self.z[k + 1] - self.z[k]);
        f0 + s * (f1 - f0)
    }
}

fn check_dims(mesher: &FdmMesherComposite, ndim: usize) -> Result<()> {
    ql_core::ensure!(
        mesher.layout().ndim() == ndim,
        "{ndim}-dimensional solver given a {}-dimensional mesher",
        mesher.layout().ndim()
    );
    Ok(())
}

fn check_axis(mesher: &FdmMesherComposite, direction: usize, v: Real) -> Result<()> {
    let m = &mesher.get_fdm_1d_meshers()[direction];
    check_domain(v, m.lower_bound(), m.upper_bound())
}

/// Backward solver on a one-dimensional mesh.
pub struct Fdm1DimSolver {
    rollback: LazyRollback<CubicNaturalSpline>,
}

impl Fdm1DimSolver {
    /// Solver for `op`; nothing is computed until the first query.
    pub fn new(
        desc: FdmSolverDesc,
        scheme_desc: FdmSchemeDesc,
        op: Box<dyn FdmLinearOpComposite>,
    ) -> Result<Self> {
        check_dims(&desc.mesher, 1)?;
        Ok(Self {
            rollback: LazyRollback::new(desc, scheme_desc, op)?,
        })
    }

    /// Value at `x`.
    pub fn interpolate_at(&self, x: Real) -> Result<Real> {
        check_axis(self.rollback.mesher(), 0, x)?;
        Ok(self.rollback.solution()?.interp.operator(x))
    }

    /// `∂V/∂x` at `x`.
    pub fn derivative_x(&self, x: Real) -> Result<Real> {
        check_axis(self.rollback.mesher(), 0, x)?;
        Ok(self.rollback.solution()?.interp.derivative(x))
    }

    /// `∂²V/∂x²` at `x`.
    pub fn derivative_xx(&self, x: Real) -> Result<Real> {
        check_axis(self.rollback.mesher(), 0, x)?;
        Ok(self.rollback.solution()?.interp.second_derivative(x))
    }

    /// Time decay at `x`.
    pub fn theta_at(&self, x: Real) -> Result<Real> {
        check_axis(self.rollback.mesher(), 0, x)?;
        let s = self.rollback.solution()?;
        self.rollback
            .theta(s.theta_interp.operator(x), s.interp.operator(x))
    }

    /// Values on the mesh nodes at time zero.
    pub fn values(&self) -> Result<&Array> {
        Ok(&self.rollback.solution()?.values)
    }
}

/// Backward solver on a two-dimensional mesh.
pub struct Fdm2DimSolver {
    rollback: LazyRollback<BicubicSpline>,
}

impl Fdm2DimSolver {
    /// Solver for `op`; nothing is computed until the first query.
    pub fn new(
        desc: FdmSolverDesc,
        scheme_desc: FdmSchemeDesc,
        op: Box<dyn FdmLinearOpComposite>,
    ) -> Result<Self> {
        check_dims(&desc.mesher, 2)?;
        Ok(Self {
            rollback: LazyRollback::new(desc, scheme_desc, op)?,
        })
    }

    fn spline(&self, x: Real, y: Real) -> Result<&BicubicSpline> {
        check_axis(self.rollback.mesher(), 0, x)?;
        check_axis(self.rollback.mesher(), 1, y)?;
        Ok(&self.rollback.solution()?.interp)
    }

    /// Value at `(x, y)`.
    pub fn interpolate_at(&self, x: Real, y: Real) -> Result<Real> {
        Ok(self.spline(x, y)?.operator(x, y))
    }

    /// `∂V/∂x`.
    pub fn derivative_x(&self, x: Real, y: Real) -> Result<Real> {
        Ok(self.spline(x, y)?.derivative_x(x, y))
    }

    /// `∂V/∂y`.
    pub fn derivative_y(&self, x: Real, y: Real) -> Result<Real> {
        Ok(self.spline(x, y)?.derivative_y(x, y))
    }

    /// `∂²V/∂x²`.
    pub fn derivative_xx(&self, x: Real, y: Real) -> Result<Real> {
        Ok(self.spline(x, y)?.second_derivative_x(x, y))
    }

    /// `∂²V/∂y²`.
    pub fn derivative_yy(&self, x: Real, y: Real) -> Result<Real> {
        Ok(self.spline(x, y)?.second_derivative_y(x, y))
    }

    /// `∂²V/∂x∂y`.
    pub fn derivative_xy(&self, x: Real, y: Real) -> Result<Real> {
        Ok(self.spline(x, y)?.derivative_xy(x, y))
    }

    /// Time decay at `(x, y)`.
    pub fn theta_at(&self, x: Real, y: Real) -> Result<Real> {
        let at_zero = self.spline(x, y)?.operator(x, y);
        let at_theta = self.rollback.solution()?.theta_interp.operator(x, y);
        self.rollback.theta(at_theta, at_zero)
    }

    /// Values on the mesh nodes at time zero.
    pub fn values(&self) -> Result<&Array> {
        Ok(&self.rollback.solution()?.values)
    }
}

/// Backward solver on a three-dimensional mesh.
pub struct Fdm3DimSolver {
    rollback: LazyRollback<LayeredBicubic>,
}

impl Fdm3DimSolver {
    /// Solver for `op`; nothing is computed until the first query.
    pub fn new(
        desc: FdmSolverDesc,
        scheme_desc: FdmSchemeDesc,
        op: Box<dyn FdmLinearOpComposite>,
    ) -> Result<Self> {
        check_dims(&desc.mesher, 3)?;
        Ok(Self {
            rollback: LazyRollback::new(desc, scheme_desc, op)?,
        })
    }

    fn check(&self, x: Real, y: Real, z: Real) -> Result<()> {
        let m = self.rollback.mesher();
        check_axis(m, 0, x)?;
        check_axis(m, 1, y)?;
        check_axis(m, 2, z)
    }

    /// Value at `(x, y, z)`.
    pub fn interpolate_at(&self, x: Real, y: Real, z: Real) -> Result<Real> {
        self.check(x, y, z)?;
        Ok(self.rollback.solution()?.interp.value(x, y, z))
    }

    /// Time decay at `(x, y, z)`.
    pub fn theta_at(&self, x: Real, y: Real, z: Real) -> Result<Real> {
        self.check(x, y, z)?;
        let s = self.rollback.solution()?;
        self.rollback
            .theta(s.theta_interp.value(x, y, z), s.interp.value(x, y, z))
    }

    /// Values on the mesh nodes at time zero.
    pub fn values(&self) -> Result<&Array> {
        Ok(&self.rollback.solution()?.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
    use crate::finite_differences::meshers::Uniform1dMesher;
    use crate::finite_differences::schemes::tests::Decay;
    use crate::finite_differences::step_conditions::FdmStepConditionComposite;
    use crate::finite_differences::utilities::FdmInnerValueCalculator;
    use crate::finite_differences::operators::FdmLinearOpIterator;
    use approx::assert_abs_diff_eq;
    use ql_core::{errors::Error, Time};
    use std::sync::Arc;

    /// Terminal value `x + 2y + 3z` on whatever dimensions exist.
    struct Linear(Arc<FdmMesherComposite>);

    impl FdmInnerValueCalculator for Linear {
        fn inner_value(&self, iter: &FdmLinearOpIterator, _t: Time) -> Real {
            (0..self.0.layout().ndim())
                .map(|d| (d + 1) as Real * self.0.location(iter, d))
                .sum()
        }

        fn avg_inner_value(&self, iter: &FdmLinearOpIterator, t: Time) -> Real {
            self.inner_value(iter, t)
        }
    }

    fn desc(dims: usize) -> FdmSolverDesc {
        let axes = (0..dims)
            .map(|_| Uniform1dMesher::new(0.0, 1.0, 11).unwrap().into())
            .collect();
        let mesher = Arc::new(FdmMesherComposite::new(axes).unwrap());
        FdmSolverDesc {
            calculator: Arc::new(Linear(Arc::clone(&mesher))),
            mesher,
            bc_set: FdmBoundaryConditionSet::new(),
            condition: FdmStepConditionComposite::default(),
            maturity: 1.0,
            time_steps: 50,
            damping_steps: 0,
        }
    }

    fn decay(ndim: usize) -> Box<dyn FdmLinearOpComposite> {
        Box::new(Decay { lambda: 0.1, ndim })
    }

    #[test]
    fn one_dim_solver_discounts_the_payoff() {
        let solver =
            Fdm1DimSolver::new(desc(1), FdmSchemeDesc::douglas(), decay(1)).unwrap();
        let df = (-0.1_f64).exp();
        assert_abs_diff_eq!(solver.interpolate_at(0.35).unwrap(), 0.35 * df, epsilon = 1e-4);
        assert_abs_diff_eq!(solver.derivative_x(0.35).unwrap(), df, epsilon = 1e-4);
        assert_abs_diff_eq!(solver.derivative_xx(0.35).unwrap(), 0.0, epsilon = 1e-6);
        // V(t) = x·e^{-0.1(1-t)}, so ∂V/∂t = 0.1·V
        assert_abs_diff_eq!(solver.theta_at(0.35).unwrap(), 0.1 * 0.35 * df, epsilon = 1e-3);
        assert!(matches!(
            solver.interpolate_at(1.5),
            Err(Error::OutOfDomain { .. })
        ));
    }

    #[test]
    fn two_and_three_dim_solvers_interpolate() {
        let df2 = (-0.2_f64).exp();
        let s2 = Fdm2DimSolver::new(desc(2), FdmSchemeDesc::hundsdorfer(), decay(2)).unwrap();
        assert_abs_diff_eq!(s2.interpolate_at(0.35, 0.6).unwrap(), 1.55 * df2, epsilon = 1e-4);
        assert_abs_diff_eq!(s2.derivative_y(0.35, 0.6).unwrap(), 2.0 * df2, epsilon = 1e-4);
        assert_abs_diff_eq!(s2.derivative_xy(0.35, 0.6).unwrap(), 0.0, epsilon = 1e-6);

        let df3 = (-0.3_f64).exp();
        let s3 = Fdm3DimSolver::new(desc(3), FdmSchemeDesc::douglas(), decay(3)).unwrap();
        assert_abs_diff_eq!(
            s3.interpolate_at(0.35, 0.6, 0.25).unwrap(),
            2.3 * df3,
            epsilon = 1e-4
        );
        assert!(s3.interpolate_at(0.35, 0.6, -0.1).is_err());
    }

    #[test]
    fn wrong_dimension_is_rejected() {
        assert!(Fdm2DimSolver::new(desc(1), FdmSchemeDesc::douglas(), decay(1)).is_err());
    }
}
