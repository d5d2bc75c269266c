//! Fokker-Planck operator of the Heston model on `(ln S, v)`.

use ql_core::{errors::Result, Real, Time};
use ql_math::Array;
use ql_processes::HestonProcess;

use super::{
    FdmLinearOpComposite, FdmSquareRootFwdOp, FdmSquareRootFwdOpTransformation,
    FirstDerivativeOp, NinePointLinearOp, SecondDerivativeOp, SecondOrderMixedDerivativeOp,
    TripleBandLinearOp,
};
use crate::finite_differences::meshers::FdmMesherComposite;

/// Forward Heston operator.
///
/// Direction 0 carries `x = ln S` with
/// `-(r - q - v/2)∂ₓ + v/2·∂ₓₓ`, direction 1 the forward CIR operator in the
/// chosen transformation. The correlation term `∂ₓᵥ(ρσv·p)` contributes a
/// cross derivative and, for `Plain` and `Power`, an extra drift in `x`.
#[derive(Debug, Clone)]
pub struct FdmHestonFwdOp {
    map_x: TripleBandLinearOp,
    map_y: FdmSquareRootFwdOp,
    correlation: NinePointLinearOp,
}

impl FdmHestonFwdOp {
    /// Build the operator; for `Log` direction 1 of the mesher holds `ln v`.
    pub fn new(
        mesher: &FdmMesherComposite,
        process: &HestonProcess,
        transformation: FdmSquareRootFwdOpTransformation,
    ) -> Result<Self> {
        ql_core::ensure!(
            mesher.layout().ndim() == 2,
            "forward Heston operator needs a two-dimensional mesher"
        );
        let map_y = FdmSquareRootFwdOp::new(
            mesher,
            process.kappa(),
            process.theta(),
            process.sigma(),
            1,
            transformation,
        )?;
        let (r, q) = (process.risk_free_rate(), process.dividend_yield());
        let rho_sigma = process.rho() * process.sigma();
        let extra_drift = match transformation {
            FdmSquareRootFwdOpTransformation::Plain => rho_sigma,
            FdmSquareRootFwdOpTransformation::Power => rho_sigma * (1.0 - map_y.alpha()),
            FdmSquareRootFwdOpTransformation::Log => 0.0,
        };

        let v: Array = mesher
            .layout()
            .iter()
            .map(|iter| map_y.v(iter.coordinate(1)))
            .collect();
        let drift = v.map(|v| -(r - q - 0.5 * v) + extra_drift);
        let map_x = FirstDerivativeOp::new(0, mesher)?
            .mult(&drift)
            .add(&SecondDerivativeOp::new(0, mesher)?.mult(&v.scale(0.5)));

        let mixed = SecondOrderMixedDerivativeOp::new(0, 1, mesher)?;
        let correlation = match transformation {
            FdmSquareRootFwdOpTransformation::Log => {
                mixed.mult(&Array::from_element(v.size(), rho_sigma))
            }
            _ => mixed.mult(&v.scale(rho_sigma)),
        };

        Ok(Self {
            map_x,
            map_y,
            correlation,
        })
    }

    /// The variance-direction operator.
    pub fn variance_op(&self) -> &FdmSquareRootFwdOp {
        &self.map_y
    }
}

impl FdmLinearOpComposite for FdmHestonFwdOp {
    fn size(&self) -> usize {
        2
    }

    fn set_time(&mut self, _t1: Time, _t2: Time) {}

    fn apply(&self, r: &Array) -> Array {
        self.map_x.apply(r) + self.map_y.map().apply(r) + self.correlation.apply(r)
    }

    fn apply_mixed(&self, r: &Array) -> Array {
        self.correlation.apply(r)
    }

    fn apply_direction(&self, direction: usize, r: &Array) -> Array {
        match direction {
            0 => self.map_x.apply(r),
            1 => self.map_y.map().apply(r),
            _ => Array::zeros(r.size()),
        }
    }

    fn solve_splitting(&self, direction: usize, r: &Array, s: Real) -> Result<Array> {
        match direction {
            0 => self.map_x.solve_splitting(r, s, 1.0),
            1 => self.map_y.map().solve_splitting(r, s, 1.0),
            _ => Ok(r.clone()),
        }
    }

    fn preconditioner(&self, r: &Array, s: Real) -> Result<Array> {
        self.solve_splitting(0, r, s)
    }
}
