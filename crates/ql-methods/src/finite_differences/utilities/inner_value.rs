//! Payoff evaluation on mesh nodes.

use std::fmt;
use std::sync::{Arc, OnceLock};

use ql_core::{errors::Result, Real, Time};
use ql_instruments::{BasketPayoff, Payoff};
use ql_math::{Integrator, SimpsonIntegral};

use crate::finite_differences::meshers::FdmMesherComposite;
use crate::finite_differences::operators::FdmLinearOpIterator;

/// Seasonal shift of the log price: `(time, shift)` pairs sorted by time.
pub type Shape = Arc<[(Time, Real)]>;

/// Shift in force at `t`: the first entry not earlier than `t`, or the
/// last one after the end of the table. Zero without a shape.
pub fn shape_shift(shape: Option<&Shape>, t: Time) -> Real {
    let Some(shape) = shape else {
        return 0.0;
    };
    let tol = Real::EPSILON.sqrt();
    shape
        .iter()
        .find(|(ts, _)| *ts >= t - tol)
        .or_else(|| shape.last())
        .map_or(0.0, |(_, s)| *s)
}

/// Payoff value at a mesh node.
pub trait FdmInnerValueCalculator: Send + Sync {
    /// Payoff at the node itself.
    fn inner_value(&self, iter: &FdmLinearOpIterator, t: Time) -> Real;

    /// Payoff averaged over the node's cell; used for the initial condition
    /// and for early exercise, where kinks would otherwise spoil convergence.
    fn avg_inner_value(&self, iter: &FdmLinearOpIterator, t: Time) -> Real;
}

/// Payoff of `exp(x)` along one log-price direction.
pub struct FdmLogInnerValue {
    payoff: Arc<dyn Payoff>,
    mesher: Arc<FdmMesherComposite>,
    direction: usize,
    avg_inner_values: OnceLock<Vec<Real>>,
}

impl fmt::Debug for FdmLogInnerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FdmLogInnerValue")
            .field("payoff", &self.payoff)
            .field("direction", &self.direction)
            .finish_non_exhaustive()
    }
}

impl FdmLogInnerValue {
    /// Calculator for `payoff` on the `direction` coordinate of `mesher`.
    pub fn new(payoff: Arc<dyn Payoff>, mesher: Arc<FdmMesherComposite>, direction: usize) -> Self {
        Self {
            payoff,
            mesher,
            direction,
            avg_inner_values: OnceLock::new(),
        }
    }

    fn payoff_at(&self, x: Real) -> Real {
        self.payoff.value(x.exp())
    }

    fn cell_average(&self, a: Real, b: Real) -> Result<Real> {
        let (fa, fb) = (self.payoff_at(a), self.payoff_at(b));
        let acc = if fa != 0.0 || fb != 0.0 {
            (fa + fb) * 5e-5
        } else {
            1e-4
        };
        let integral = SimpsonIntegral::new(acc.abs(), 512).integrate(|x| self.payoff_at(x), a, b)?;
        Ok(integral / (b - a))
    }

    fn average_over_cells(&self) -> Vec<Real> {
        let m = &self.mesher.get_fdm_1d_meshers()[self.direction];
        let n = m.size();
        (0..n)
            .map(|c| {
                let loc = m.locations()[c];
                let a = if c > 0 { loc - 0.5 * m.dminus(c) } else { loc };
                let b = if c < n - 1 { loc + 0.5 * m.dplus(c) } else { loc };
                if a == b {
                    return self.payoff_at(loc);
                }
                self.cell_average(a, b).unwrap_or_else(|_| self.payoff_at(loc))
            })
            .collect()
    }
}

impl FdmInnerValueCalculator for FdmLogInnerValue {
    fn inner_value(&self, iter: &FdmLinearOpIterator, _t: Time) -> Real {
        self.payoff_at(self.mesher.location(iter, self.direction))
    }

    fn avg_inner_value(&self, iter: &FdmLinearOpIterator, _t: Time) -> Real {
        self.avg_inner_values
            .get_or_init(|| self.average_over_cells())[iter.coordinate(self.direction)]
    }
}

/// Basket payoff of `(exp(x_0), exp(x_1), …)` over every direction.
#[derive(Debug)]
pub struct FdmLogBasketInnerValue {
    payoff: BasketPayoff,
    mesher: Arc<FdmMesherComposite>,
}

impl FdmLogBasketInnerValue {
    /// Calculator for a basket over all mesh directions.
    pub fn new(payoff: BasketPayoff, mesher: Arc<FdmMesherComposite>) -> Self {
        Self { payoff, mesher }
    }
}

impl FdmInnerValueCalculator for FdmLogBasketInnerValue {
    fn inner_value(&self, iter: &FdmLinearOpIterator, _t: Time) -> Real {
        let prices: Vec<Real> = (0..self.mesher.layout().ndim())
            .map(|d| self.mesher.location(iter, d).exp())
            .collect();
        self.payoff.value(&prices)
    }

    fn avg_inner_value(&self, iter: &FdmLinearOpIterator, t: Time) -> Real {
        self.inner_value(iter, t)
    }
}

/// Zero everywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct FdmZeroInnerValue;

impl FdmInnerValueCalculator for FdmZeroInnerValue {
    fn inner_value(&self, _iter: &FdmLinearOpIterator, _t: Time) -> Real {
        0.0
    }

    fn avg_inner_value(&self, _iter: &FdmLinearOpIterator, _t: Time) -> Real {
        0.0
    }
}

/// Payoff of `exp(x + shape(t))`, `x` the direction-0 coordinate.
#[derive(Debug)]
pub struct FdmExpExtOUInnerValueCalculator {
    payoff: Arc<dyn Payoff>,
    mesher: Arc<FdmMesherComposite>,
    shape: Option<Shape>,
}

impl FdmExpExtOUInnerValueCalculator {
    /// Calculator with an optional seasonal shape.
    pub fn new(payoff: Arc<dyn Payoff>, mesher: Arc<FdmMesherComposite>, shape: Option<Shape>) -> Self {
        Self {
            payoff,
            mesher,
            shape,
        }
    }
}

impl FdmInnerValueCalculator for FdmExpExtOUInnerValueCalculator {
    fn inner_value(&self, iter: &FdmLinearOpIterator, t: Time) -> Real {
        let x = self.mesher.location(iter, 0);
        self.payoff
            .value((x + shape_shift(self.shape.as_ref(), t)).exp())
    }

    fn avg_inner_value(&self, iter: &FdmLinearOpIterator, t: Time) -> Real {
        self.inner_value(iter, t)
    }
}

/// Payoff of `exp(x + y + shape(t))` for the OU-with-jumps model.
#[derive(Debug)]
pub struct FdmExtOUJumpModelInnerValue {
    payoff: Arc<dyn Payoff>,
    mesher: Arc<FdmMesherComposite>,
    shape: Option<Shape>,
}

impl FdmExtOUJumpModelInnerValue {
    /// Calculator with an optional seasonal shape.
    pub fn new(payoff: Arc<dyn Payoff>, mesher: Arc<FdmMesherComposite>, shape: Option<Shape>) -> Self {
        Self {
            payoff,
            mesher,
            shape,
        }
    }
}

impl FdmInnerValueCalculator for FdmExtOUJumpModelInnerValue {
    fn inner_value(&self, iter: &FdmLinearOpIterator, t: Time) -> Real {
        let x = self.mesher.location(iter, 0);
        let y = self.mesher.location(iter, 1);
        self.payoff
            .value((x + y + shape_shift(self.shape.as_ref(), t)).exp())
    }

    fn avg_inner_value(&self, iter: &FdmLinearOpIterator, t: Time) -> Real {
        self.inner_value(iter, t)
    }
}

/// Value of the stored volume at the final date, `exp(x)·level`.
#[derive(Debug)]
pub struct FdmStorageValue {
    mesher: Arc<FdmMesherComposite>,
}

impl FdmStorageValue {
    /// Direction 0 is the log price, direction 1 the storage level.
    pub fn new(mesher: Arc<FdmMesherComposite>) -> Self {
        Self { mesher }
    }
}

impl FdmInnerValueCalculator for FdmStorageValue {
    fn inner_value(&self, iter: &FdmLinearOpIterator, _t: Time) -> Real {
        self.mesher.location(iter, 0).exp() * self.mesher.location(iter, 1)
    }

    fn avg_inner_value(&self, iter: &FdmLinearOpIterator, t: Time) -> Real {
        self.inner_value(iter, t)
    }
}
