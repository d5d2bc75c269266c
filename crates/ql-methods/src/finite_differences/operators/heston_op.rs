//! Backward Heston generator on `(ln S, v)`.

use ql_core::{errors::Result, Rate, Real, Time};
use ql_math::Array;
use ql_processes::HestonProcess;

use super::{
    FdmLinearOpComposite, FirstDerivativeOp, NinePointLinearOp, SecondDerivativeOp,
    SecondOrderMixedDerivativeOp, TripleBandLinearOp,
};
use crate::finite_differences::meshers::FdmMesherComposite;

/// Heston pricing operator, direction 0 is `x = ln S`, direction 1 the
/// variance:
///
/// ```text
/// L = (r - q - v/2) ∂ₓ + v/2 ∂ₓₓ + κ(θ - v) ∂ᵥ + σ²v/2 ∂ᵥᵥ + ρσv ∂ₓᵥ - r
/// ```
///
/// The discount term is split evenly between the two directions.
#[derive(Debug, Clone)]
pub struct FdmHestonOp {
    r: Rate,
    q: Rate,
    var_half: Array,
    dx_map: TripleBandLinearOp,
    dxx_map: TripleBandLinearOp,
    map_x: TripleBandLinearOp,
    dy_map: TripleBandLinearOp,
    map_y: TripleBandLinearOp,
    correlation_map: NinePointLinearOp,
}

impl FdmHestonOp {
    /// Build the operator on a two-dimensional mesher.
    pub fn new(mesher: &FdmMesherComposite, process: &HestonProcess) -> Result<Self> {
        ql_core::ensure!(
            mesher.layout().ndim() == 2,
            "Heston operator needs a two-dimensional mesher"
        );
        let v = mesher.locations(1);
        let var_half = v.scale(0.5);
        let (kappa, theta, sigma, rho) = (
            process.kappa(),
            process.theta(),
            process.sigma(),
            process.rho(),
        );

        let dy_map = SecondDerivativeOp::new(1, mesher)?
            .mult(&v.scale(0.5 * sigma * sigma))
            .add(&FirstDerivativeOp::new(1, mesher)?.mult(&v.map(|v| kappa * (theta - v))));

        Ok(Self {
            r: process.risk_free_rate(),
            q: process.dividend_yield(),
            dx_map: FirstDerivativeOp::new(0, mesher)?.into_inner(),
            dxx_map: SecondDerivativeOp::new(0, mesher)?.mult(&var_half),
            var_half,
            map_x: TripleBandLinearOp::new(0, mesher)?,
            dy_map,
            map_y: TripleBandLinearOp::new(1, mesher)?,
            correlation_map: SecondOrderMixedDerivativeOp::new(0, 1, mesher)?
                .mult(&v.scale(rho * sigma)),
        })
    }
}

impl FdmLinearOpComposite for FdmHestonOp {
    fn size(&self) -> usize {
        2
    }

    fn set_time(&mut self, _t1: Time, _t2: Time) {
        let drift: Vec<Real> = self
            .var_half
            .iter()
            .map(|h| self.r - self.q - h)
            .collect();
        self.map_x
            .axpyb(&drift, &self.dx_map, &self.dxx_map, &[-0.5 * self.r]);
        self.map_y
            .axpyb(&[], &self.dy_map, &self.dy_map, &[-0.5 * self.r]);
    }

    fn apply(&self, r: &Array) -> Array {
        self.map_x.apply(r) + self.map_y.apply(r) + self.correlation_map.apply(r)
    }

    fn apply_mixed(&self, r: &Array) -> Array {
        self.correlation_map.apply(r)
    }

    fn apply_direction(&self, direction: usize, r: &Array) -> Array {
        match direction {
            0 => self.map_x.apply(r),
            1 => self.map_y.apply(r),
            _ => Array::zeros(r.size()),
        }
    }

    fn solve_splitting(&self, direction: usize, r: &Array, s: Real) -> Result<Array> {
        match direction {
            0 => self.map_x.solve_splitting(r, s, 1.0),
            1 => self.map_y.solve_splitting(r, s, 1.0),
            _ => Ok(r.clone()),
        }
    }

    fn preconditioner(&self, r: &Array, s: Real) -> Result<Array> {
        self.solve_splitting(1, &self.solve_splitting(0, r, s)?, s)
    }
}
