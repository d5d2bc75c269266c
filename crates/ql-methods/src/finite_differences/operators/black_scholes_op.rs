//! Black-Scholes generator in log-spot coordinates.

use ql_core::{errors::Result, Rate, Real, Time, Volatility};
use ql_math::Array;
use ql_processes::GeneralizedBlackScholesProcess;

use super::{FdmLinearOpComposite, FirstDerivativeOp, SecondDerivativeOp, TripleBandLinearOp};
use crate::finite_differences::meshers::FdmMesherComposite;

/// `L = (r - q - σ²/2) ∂ₓ + σ²/2 ∂ₓₓ - r` along `direction`, `x = ln S`.
#[derive(Debug, Clone)]
pub struct FdmBlackScholesOp {
    direction: usize,
    ndim: usize,
    r: Rate,
    q: Rate,
    vol: Volatility,
    dx_map: TripleBandLinearOp,
    dxx_map: TripleBandLinearOp,
    map_t: TripleBandLinearOp,
}

impl FdmBlackScholesOp {
    /// Build the operator along `direction` of `mesher`.
    pub fn new(
        mesher: &FdmMesherComposite,
        process: &GeneralizedBlackScholesProcess,
        direction: usize,
    ) -> Result<Self> {
        let vol = process.volatility();
        let dxx_map = SecondDerivativeOp::new(direction, mesher)?.scale(0.5 * vol * vol);
        Ok(Self {
            direction,
            ndim: mesher.layout().ndim(),
            r: process.risk_free_rate(),
            q: process.dividend_yield(),
            vol,
            dx_map: FirstDerivativeOp::new(direction, mesher)?.into_inner(),
            dxx_map,
            map_t: TripleBandLinearOp::new(direction, mesher)?,
        })
    }
}

impl FdmLinearOpComposite for FdmBlackScholesOp {
    fn size(&self) -> usize {
        self.ndim
    }

    fn set_time(&mut self, _t1: Time, _t2: Time) {
        let drift = self.r - self.q - 0.5 * self.vol * self.vol;
        self.map_t
            .axpyb(&[drift], &self.dx_map, &self.dxx_map, &[-self.r]);
    }

    fn apply(&self, r: &Array) -> Array {
        self.map_t.apply(r)
    }

    fn apply_mixed(&self, r: &Array) -> Array {
        Array::zeros(r.size())
    }

    fn apply_direction(&self, direction: usize, r: &Array) -> Array {
        if direction == self.direction {
            self.map_t.apply(r)
        } else {
            Array::zeros(r.size())
        }
    }

    fn solve_splitting(&self, direction: usize, r: &Array, s: Real) -> Result<Array> {
        if direction == self.direction {
            self.map_t.solve_splitting(r, s, 1.0)
        } else {
            Ok(r.clone())
        }
    }

    fn preconditioner(&self, r: &Array, s: Real) -> Result<Array> {
        self.solve_splitting(self.direction, r, s)
    }
}
