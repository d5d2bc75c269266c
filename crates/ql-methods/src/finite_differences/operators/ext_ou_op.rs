use std::sync::Arc;

use ql_core::{errors::Result, Rate, Real, Time};
use ql_math::Array;
use ql_processes::{ExtendedOrnsteinUhlenbeckProcess, StochasticProcess1D};

use super::{FdmLinearOpComposite, FirstDerivativeOp, SecondDerivativeOp, TripleBandLinearOp};
use crate::finite_differences::meshers::FdmMesherComposite;

/// `L = a(b(t) - x)∂ₓ + σ²/2·∂ₓₓ - r` along `direction`.
///
/// The level is frozen at the mid point of each step.
#[derive(Debug, Clone)]
pub struct FdmExtendedOrnsteinUhlenbeckOp {
    direction: usize,
    ndim: usize,
    process: Arc<ExtendedOrnsteinUhlenbeckProcess>,
    rate: Rate,
    x: Array,
    dx_map: TripleBandLinearOp,
    dxx_map: TripleBandLinearOp,
    map_x: TripleBandLinearOp,
}

impl FdmExtendedOrnsteinUhlenbeckOp {
    /// Build the operator along `direction` with flat discount rate `rate`.
    pub fn new(
        mesher: &FdmMesherComposite,
        process: Arc<ExtendedOrnsteinUhlenbeckProcess>,
        rate: Rate,
        direction: usize,
    ) -> Result<Self> {
        let vol = process.volatility();
        Ok(Self {
            direction,
            ndim: mesher.layout().ndim(),
            rate,
            x: mesher.locations(direction),
            dx_map: FirstDerivativeOp::new(direction, mesher)?.into_inner(),
            dxx_map: SecondDerivativeOp::new(direction, mesher)?.scale(0.5 * vol * vol),
            map_x: TripleBandLinearOp::new(direction, mesher)?,
            process,
        })
    }
}

impl FdmLinearOpComposite for FdmExtendedOrnsteinUhlenbeckOp {
    fn size(&self) -> usize {
        self.ndim
    }

    fn set_time(&mut self, t1: Time, t2: Time) {
        let t = 0.5 * (t1 + t2);
        let drift: Vec<Real> = self
            .x
            .iter()
            .map(|&x| self.process.drift_1d(t, x))
            .collect();
        self.map_x
            .axpyb(&drift, &self.dx_map, &self.dxx_map, &[-self.rate]);
    }

    fn apply(&self, r: &Array) -> Array {
        self.map_x.apply(r)
    }

    fn apply_mixed(&self, r: &Array) -> Array {
        Array::zeros(r.size())
    }

    fn apply_direction(&self, direction: usize, r: &Array) -> Array {
        if direction == self.direction {
            self.map_x.apply(r)
        } else {
            Array::zeros(r.size())
        }
    }

    fn solve_splitting(&self, direction: usize, r: &Array, s: Real) -> Result<Array> {
        if direction == self.direction {
            self.map_x.solve_splitting(r, s, 1.0)
        } else {
            Ok(r.clone())
        }
    }

    fn preconditioner(&self, r: &Array, s: Real) -> Result<Array> {
        self.solve_splitting(self.direction, r, s)
    }
}
