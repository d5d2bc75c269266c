//! Two-factor spike model: OU factor in direction 0, jump factor in
//! direction 1.

use std::sync::Arc;

use ql_core::{errors::Result, Rate, Real, Time};
use ql_math::integrals::GaussLaguerreIntegration;
use ql_math::Array;
use ql_processes::ExtOUWithJumpsProcess;

use super::{
    FdmExtendedOrnsteinUhlenbeckOp, FdmLinearOpComposite, FdmLinearOpLayout, FirstDerivativeOp,
    TripleBandLinearOp,
};
use crate::finite_differences::meshers::FdmMesherComposite;

/// Interpolation stencil of `V(y_j + J)` averaged over the jump law, for
/// one node `j` of the jump axis: pairs of (node, weight).
type JumpRow = Vec<(usize, Real)>;

/// Generator of `(x, y)` under the extended OU process with exponential
/// jumps:
///
/// ```text
/// L = L_OU(x) - βy·∂ᵧ + λ(E[V(x, y + J)] - V),   J ~ Exp(η)
/// ```
///
/// The jump expectation is the explicit (`apply_mixed`) part. It is built
/// once from Gauss-Laguerre nodes `u_k` as `Σ w_k V(y + u_k/η)`, linearly
/// interpolated on the jump mesh and flat beyond its last node.
#[derive(Debug, Clone)]
pub struct FdmExtOUJumpOp {
    ndim: usize,
    jump_intensity: Real,
    layout: FdmLinearOpLayout,
    ou_op: FdmExtendedOrnsteinUhlenbeckOp,
    dy_map: TripleBandLinearOp,
    jump_rows: Arc<[JumpRow]>,
}

impl FdmExtOUJumpOp {
    /// Build the operator with a 32-point Gauss-Laguerre rule.
    pub fn new(
        mesher: &FdmMesherComposite,
        process: &ExtOUWithJumpsProcess,
        rate: Rate,
    ) -> Result<Self> {
        Self::with_integration_order(mesher, process, rate, 32)
    }

    /// Build the operator with a Gauss-Laguerre rule of the given order.
    pub fn with_integration_order(
        mesher: &FdmMesherComposite,
        process: &ExtOUWithJumpsProcess,
        rate: Rate,
        order: usize,
    ) -> Result<Self> {
        let layout = mesher.layout();
        ql_core::ensure!(
            layout.ndim() >= 2,
            "jump operator needs at least two dimensions, got {}",
            layout.ndim()
        );
        ql_core::ensure!(order > 0, "integration order must be positive");

        let y = mesher.get_fdm_1d_meshers()[1].locations();
        let quadrature = GaussLaguerreIntegration::new(order, 0.0);
        let eta = process.eta();
        let jump_rows: Vec<JumpRow> = y
            .iter()
            .map(|&yj| {
                let mut row: JumpRow = Vec::with_capacity(2 * order);
                for (&u, &w) in quadrature.x().iter().zip(quadrature.w()) {
                    let target = yj + u / eta;
                    let n = y.len();
                    if target >= y[n - 1] {
                        row.push((n - 1, w));
                        continue;
                    }
                    let k = y.partition_point(|&v| v <= target).saturating_sub(1);
                    let s = (target - y[k]) / (y[k + 1] - y[k]);
                    row.push((k, w * (1.0 - s)));
                    row.push((k + 1, w * s));
                }
                row
            })
            .collect();

        let dy_map = FirstDerivativeOp::new(1, mesher)?
            .mult(&mesher.locations(1).scale(-process.beta()));

        Ok(Self {
            ndim: layout.ndim(),
            jump_intensity: process.jump_intensity(),
            layout: layout.clone(),
            ou_op: FdmExtendedOrnsteinUhlenbeckOp::new(
                mesher,
                Arc::clone(process.ext_ou_process()),
                rate,
                0,
            )?,
            dy_map,
            jump_rows: jump_rows.into(),
        })
    }

    fn integro(&self, r: &Array) -> Array {
        let stride = self.layout.spacing()[1];
        self.layout
            .iter()
            .map(|iter| {
                let i = iter.index();
                let base = i - iter.coordinate(1) * stride;
                let expected: Real = self.jump_rows[iter.coordinate(1)]
                    .iter()
                    .map(|&(k, w)| w * r[base + k * stride])
                    .sum();
                self.jump_intensity * (expected - r[i])
            })
            .collect()
    }
}

impl FdmLinearOpComposite for FdmExtOUJumpOp {
    fn size(&self) -> usize {
        self.ndim
    }

    fn set_time(&mut self, t1: Time, t2: Time) {
        self.ou_op.set_time(t1, t2);
    }

    fn apply(&self, r: &Array) -> Array {
        self.ou_op.apply(r) + self.dy_map.apply(r) + self.integro(r)
    }

    fn apply_mixed(&self, r: &Array) -> Array {
        self.integro(r)
    }

    fn apply_direction(&self, direction: usize, r: &Array) -> Array {
        match direction {
            0 => self.ou_op.apply(r),
            1 => self.dy_map.apply(r),
            _ => Array::zeros(r.size()),
        }
    }

    fn solve_splitting(&self, direction: usize, r: &Array, s: Real) -> Result<Array> {
        match direction {
            0 => self.ou_op.solve_splitting(0, r, s),
            1 => self.dy_map.solve_splitting(r, s, 1.0),
            _ => Ok(r.clone()),
        }
    }

    fn preconditioner(&self, r: &Array, s: Real) -> Result<Array> {
        self.solve_splitting(0, r, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::{ExponentialJump1dMesher, Uniform1dMesher};
    use approx::assert_abs_diff_eq;
    use ql_processes::{Discretization, ExtendedOrnsteinUhlenbeckProcess};

    fn setup() -> (FdmMesherComposite, ExtOUWithJumpsProcess) {
        let ou = ExtendedOrnsteinUhlenbeckProcess::new(
            1.0,
            0.2,
            0.0,
            Arc::new(|_: Time| 0.0),
            Discretization::MidPoint,
        )
        .unwrap();
        let process = ExtOUWithJumpsProcess::new(Arc::new(ou), 0.0, 5.0, 2.0, 4.0).unwrap();
        let m = FdmMesherComposite::from_pair(
            Uniform1dMesher::new(-1.0, 1.0, 5).unwrap(),
            ExponentialJump1dMesher::new(60, 5.0, 2.0, 4.0).unwrap(),
        )
        .unwrap();
        (m, process)
    }

    #[test]
    fn jump_term_annihilates_constants() {
        let (m, process) = setup();
        let op = FdmExtOUJumpOp::new(&m, &process, 0.0).unwrap();
        let one = Array::from_element(m.layout().size(), 1.0);
        for v in op.apply_mixed(&one).iter() {
            assert_abs_diff_eq!(*v, 0.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn jump_term_shifts_linear_functions_by_the_mean_jump() {
        // λ(E[y + J] - y) = λ/η away from the flat extrapolation region
        let (m, process) = setup();
        let op = FdmExtOUJumpOp::new(&m, &process, 0.0).unwrap();
        let y = m.locations(1);
        let jumps = op.apply_mixed(&y);
        let y_max = m.get_fdm_1d_meshers()[1].upper_bound();
        for iter in m.layout() {
            let i = iter.index();
            if (y_max - y[i]) * 4.0 > 6.0 {
                assert_abs_diff_eq!(jumps[i], 2.0 * 0.25, epsilon = 3e-3);
            }
        }
    }
}
