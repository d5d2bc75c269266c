//! Fokker-Planck operator of the square-root (CIR) process.
//!
//! The density is evolved in flux form on cells centred at the nodes, so the
//! trapezoidal mass `Σ w_i·Δ_i·u_i` is preserved by every step and the two
//! outer faces carry no flux. Three choices of unknown are supported:
//!
//! | transformation | coordinate | unknown `u`  | face flux `F`                                   |
//! |----------------|------------|--------------|-------------------------------------------------|
//! | `Plain`        | `v`        | `p`          | `κ(θ-v)p - ∂ᵥ(σ²v/2·p)`                         |
//! | `Log`          | `z = ln v` | `v·p`        | `M(z)u - ∂_z(D(z)u)`                            |
//! | `Power`        | `v`        | `v^α·p`      | `-v^{1-α}(κu + σ²/2·∂ᵥu)`, `α = 1 - 2κθ/σ²`      |
//!
//! with `M(z) = (κθ - σ²/2)e^{-z} - κ` and `D(z) = σ²e^{-z}/2`.

use ql_core::{errors::Result, Real, Time};
use ql_math::Array;

use super::{FdmLinearOpComposite, TripleBandLinearOp};
use crate::finite_differences::boundary_conditions::{FaceFlux, FdmBoundarySide, ZeroFlowBoundary};
use crate::finite_differences::meshers::FdmMesherComposite;

/// Unknown used for the variance density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FdmSquareRootFwdOpTransformation {
    /// The density itself on a variance grid.
    #[default]
    Plain,
    /// `v^α·p` on a variance grid; smooth at zero when the Feller condition
    /// fails.
    Power,
    /// `v·p` on a log-variance grid.
    Log,
}

/// Model constants and the flux discretisation for one transformation.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FluxModel {
    kappa: Real,
    theta: Real,
    sigma: Real,
    transformation: FdmSquareRootFwdOpTransformation,
}

impl FluxModel {
    fn alpha(&self) -> Real {
        1.0 - 2.0 * self.kappa * self.theta / (self.sigma * self.sigma)
    }

    fn v(&self, z: Real) -> Real {
        match self.transformation {
            FdmSquareRootFwdOpTransformation::Log => z.exp(),
            _ => z,
        }
    }

    fn weight(&self, z: Real) -> Real {
        match self.transformation {
            FdmSquareRootFwdOpTransformation::Power => z.powf(-self.alpha()),
            _ => 1.0,
        }
    }

    fn face_flux(&self, zl: Real, zr: Real) -> FaceFlux {
        let h = zr - zl;
        let zf = 0.5 * (zl + zr);
        let (kappa, theta, s2) = (self.kappa, self.theta, self.sigma * self.sigma);

        let (left, right) = match self.transformation {
            FdmSquareRootFwdOpTransformation::Plain => {
                let m = kappa * (theta - zf);
                (0.5 * m + 0.5 * s2 * zl / h, 0.5 * m - 0.5 * s2 * zr / h)
            }
            FdmSquareRootFwdOpTransformation::Log => {
                let m = (kappa * theta - 0.5 * s2) * (-zf).exp() - kappa;
                let d = |z: Real| 0.5 * s2 * (-z).exp();
                (0.5 * m + d(zl) / h, 0.5 * m - d(zr) / h)
            }
            FdmSquareRootFwdOpTransformation::Power => {
                let g = zf.powf(1.0 - self.alpha());
                (-g * (0.5 * kappa - 0.5 * s2 / h), -g * (0.5 * kappa + 0.5 * s2 / h))
            }
        };
        FaceFlux {
            left,
            right,
            location: zf,
        }
    }
}

fn cell_width(z: &[Real], i: usize) -> Real {
    if i == 0 {
        0.5 * (z[1] - z[0])
    } else if i == z.len() - 1 {
        0.5 * (z[i] - z[i - 1])
    } else {
        0.5 * (z[i + 1] - z[i - 1])
    }
}

/// Forward CIR operator along one direction, zero flux at both ends.
#[derive(Debug, Clone)]
pub struct FdmSquareRootFwdOp {
    direction: usize,
    ndim: usize,
    model: FluxModel,
    locations: Vec<Real>,
    map: TripleBandLinearOp,
    lower: ZeroFlowBoundary,
    upper: ZeroFlowBoundary,
}

impl FdmSquareRootFwdOp {
    /// Build the operator along `direction`; for `Log` the mesher holds
    /// `ln v` in that direction.
    pub fn new(
        mesher: &FdmMesherComposite,
        kappa: Real,
        theta: Real,
        sigma: Real,
        direction: usize,
        transformation: FdmSquareRootFwdOpTransformation,
    ) -> Result<Self> {
        ql_core::ensure!(
            kappa > 0.0 && theta > 0.0 && sigma > 0.0,
            "kappa, theta and sigma must be positive"
        );
        let layout = mesher.layout();
        ql_core::ensure!(
            direction < layout.ndim(),
            "direction {direction} out of range for a {}-dimensional mesher",
            layout.ndim()
        );
        let z = mesher.get_fdm_1d_meshers()[direction].locations().to_vec();
        let n = z.len();
        ql_core::ensure!(n >= 3, "forward operator needs at least three nodes, got {n}");
        match transformation {
            FdmSquareRootFwdOpTransformation::Plain => ql_core::ensure!(
                z[0] >= 0.0,
                "variance grid must be non-negative, starts at {}",
                z[0]
            ),
            FdmSquareRootFwdOpTransformation::Power => ql_core::ensure!(
                z[0] > 0.0,
                "power transformation needs a positive variance grid, starts at {}",
                z[0]
            ),
            FdmSquareRootFwdOpTransformation::Log => {}
        }

        let model = FluxModel {
            kappa,
            theta,
            sigma,
            transformation,
        };
        let faces: Vec<FaceFlux> = z.windows(2).map(|w| model.face_flux(w[0], w[1])).collect();
        let cells: Vec<Real> = (0..n).map(|i| model.weight(z[i]) * cell_width(&z, i)).collect();
        let lower = ZeroFlowBoundary::new(
            direction,
            FdmBoundarySide::Lower,
            z[0],
            cells[0],
            [faces[0], faces[1]],
        )?;
        let upper = ZeroFlowBoundary::new(
            direction,
            FdmBoundarySide::Upper,
            z[n - 1],
            cells[n - 1],
            [faces[n - 2], faces[n - 3]],
        )?;

        let mut map = TripleBandLinearOp::new(direction, mesher)?;
        let (lower_diag, lower_off) = lower.row_coefficients();
        let (upper_diag, upper_off) = upper.row_coefficients();
        for iter in layout {
            let (i, c) = (iter.index(), iter.coordinate(direction));
            if c == 0 {
                map.set_row(i, 0.0, lower_diag, lower_off);
            } else if c == n - 1 {
                map.set_row(i, upper_off, upper_diag, 0.0);
            } else {
                let (below, above) = (&faces[c - 1], &faces[c]);
                map.set_row(
                    i,
                    below.left / cells[c],
                    (below.right - above.left) / cells[c],
                    -above.right / cells[c],
                );
            }
        }

        Ok(Self {
            direction,
            ndim: layout.ndim(),
            model,
            locations: z,
            map,
            lower,
            upper,
        })
    }

    /// Exponent `α = 1 - 2κθ/σ²` of the power transformation.
    pub fn alpha(&self) -> Real {
        self.model.alpha()
    }

    /// The transformation in use.
    pub fn transformation(&self) -> FdmSquareRootFwdOpTransformation {
        self.model.transformation
    }

    /// Variance at node `i` of the direction.
    pub fn v(&self, i: usize) -> Real {
        self.model.v(self.locations[i])
    }

    /// Factor `w_i` such that the density in the mesh coordinate is
    /// `w_i·u_i`.
    pub fn weight(&self, i: usize) -> Real {
        self.model.weight(self.locations[i])
    }

    /// The banded operator along the direction.
    pub fn map(&self) -> &TripleBandLinearOp {
        &self.map
    }

    /// Zero-flow closure at `side`.
    pub fn boundary(&self, side: FdmBoundarySide) -> &ZeroFlowBoundary {
        match side {
            FdmBoundarySide::Lower => &self.lower,
            FdmBoundarySide::Upper => &self.upper,
        }
    }
}

impl FdmLinearOpComposite for FdmSquareRootFwdOp {
    fn size(&self) -> usize {
        self.ndim
    }

    fn set_time(&mut self, _t1: Time, _t2: Time) {}

    fn apply(&self, r: &Array) -> Array {
        self.map.apply(r)
    }

    fn apply_mixed(&self, r: &Array) -> Array {
        Array::zeros(r.size())
    }

    fn apply_direction(&self, direction: usize, r: &Array) -> Array {
        if direction == self.direction {
            self.map.apply(r)
        } else {
            Array::zeros(r.size())
        }
    }

    fn solve_splitting(&self, direction: usize, r: &Array, s: Real) -> Result<Array> {
        if direction == self.direction {
            self.map.solve_splitting(r, s, 1.0)
        } else {
            Ok(r.clone())
        }
    }

    fn preconditioner(&self, r: &Array, s: Real) -> Result<Array> {
        self.solve_splitting(self.direction, r, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::Uniform1dMesher;
    use approx::assert_abs_diff_eq;
    use ql_math::distributions::GammaDistribution;

    const KAPPA: Real = 1.2;
    const THETA: Real = 0.4;
    const SIGMA: Real = 0.7;

    fn operator(t: FdmSquareRootFwdOpTransformation, n: usize) -> (FdmMesherComposite, FdmSquareRootFwdOp) {
        let (lo, hi) = match t {
            FdmSquareRootFwdOpTransformation::Log => (0.01_f64.ln(), 3.0_f64.ln()),
            _ => (0.01, 3.0),
        };
        let m = FdmMesherComposite::from_mesher(Uniform1dMesher::new(lo, hi, n).unwrap()).unwrap();
        let op = FdmSquareRootFwdOp::new(&m, KAPPA, THETA, SIGMA, 0, t).unwrap();
        (m, op)
    }

    const ALL: [FdmSquareRootFwdOpTransformation; 3] = [
        FdmSquareRootFwdOpTransformation::Plain,
        FdmSquareRootFwdOpTransformation::Log,
        FdmSquareRootFwdOpTransformation::Power,
    ];

    #[test]
    fn operator_conserves_weighted_mass() {
        for t in ALL {
            let (_, op) = operator(t, 50);
            let u: Array = (0..50).map(|i| 1.0 + (i as Real * 0.37).sin()).collect();
            let lu = op.apply(&u);
            let mass_change: Real = (0..50).map(|i| op.weight(i) * cell_width(&op.locations, i) * lu[i]).sum();
            assert_abs_diff_eq!(mass_change, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn stationary_density_has_no_boundary_flux() {
        let shape = 2.0 * KAPPA * THETA / (SIGMA * SIGMA);
        let gamma = GammaDistribution::new(shape, shape / THETA).unwrap();
        for t in ALL {
            let (m, op) = operator(t, 500);
            let u: Array = (0..500)
                .map(|i| {
                    let v = op.v(i);
                    let p = gamma.pdf(v);
                    match t {
                        FdmSquareRootFwdOpTransformation::Plain => p,
                        FdmSquareRootFwdOpTransformation::Log => p * v,
                        FdmSquareRootFwdOpTransformation::Power => p * v.powf(op.alpha()),
                    }
                })
                .collect();
            for side in [FdmBoundarySide::Lower, FdmBoundarySide::Upper] {
                let flux = op.boundary(side).flux(m.layout(), &u);
                assert_eq!(flux.size(), 1);
                assert!(flux[0].abs() < 5e-3, "{t:?} {side:?}: flux {}", flux[0]);
            }
        }
    }

    #[test]
    fn power_needs_a_positive_grid() {
        let m = FdmMesherComposite::from_mesher(Uniform1dMesher::new(0.0, 1.0, 10).unwrap()).unwrap();
        assert!(FdmSquareRootFwdOp::new(
            &m,
            KAPPA,
            THETA,
            SIGMA,
            0,
            FdmSquareRootFwdOpTransformation::Power
        )
        .is_err());
    }
}
