use std::fmt;
use std::sync::Arc;

use ql_core::{Real, Time};
use ql_math::{close_enough, Array};

use super::{StepCondition, TIME_MATCH_ULPS};
use crate::finite_differences::meshers::FdmMesherComposite;
use crate::finite_differences::utilities::FdmInnerValueCalculator;

/// Inject, hold or withdraw at each exercise date.
///
/// Direction 1 of the mesher is the storage level. With price `P` and
/// per-date rate `c`, a node at level `y` takes the best of holding,
/// withdrawing `w ≤ min(y - y_min, c)` for `V(y - w) + w·P`, and injecting
/// `u ≤ min(y_max - y, c)` for `V(y + u) - u·P`. Off-grid levels are
/// interpolated linearly.
pub struct FdmSimpleStorageCondition {
    exercise_times: Vec<Time>,
    mesher: Arc<FdmMesherComposite>,
    calculator: Arc<dyn FdmInnerValueCalculator>,
    change_rate: Real,
}

impl fmt::Debug for FdmSimpleStorageCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FdmSimpleStorageCondition")
            .field("exercise_times", &self.exercise_times)
            .field("change_rate", &self.change_rate)
            .finish_non_exhaustive()
    }
}

fn interpolate(x: &[Real], y: &[Real], at: Real) -> Real {
    let n = x.len();
    if n == 1 {
        return y[0];
    }
    let k = x.partition_point(|&v| v <= at).clamp(1, n - 1) - 1;
    let s = (at - x[k]) / (x[k + 1] - x[k]);
    y[k] + s * (y[k + 1] - y[k])
}

impl FdmSimpleStorageCondition {
    /// Storage condition; `calculator` gives the commodity price at a node.
    pub fn new(
        exercise_times: Vec<Time>,
        mesher: Arc<FdmMesherComposite>,
        calculator: Arc<dyn FdmInnerValueCalculator>,
        change_rate: Real,
    ) -> Self {
        Self {
            exercise_times,
            mesher,
            calculator,
            change_rate,
        }
    }
}

impl StepCondition for FdmSimpleStorageCondition {
    fn apply_to(&mut self, a: &mut Array, t: Time) {
        if !self
            .exercise_times
            .iter()
            .any(|&et| close_enough(et, t, TIME_MATCH_ULPS))
        {
            return;
        }

        let layout = self.mesher.layout();
        let levels = self.mesher.get_fdm_1d_meshers()[1].locations();
        let (y_min, y_max) = (levels[0], levels[levels.len() - 1]);
        let stride = layout.spacing()[1];
        let mut ret = a.clone();
        let mut line = vec![0.0; levels.len()];

        for iter in layout.iter().filter(|iter| iter.coordinate(1) == 0) {
            let base = iter.index();
            for (j, v) in line.iter_mut().enumerate() {
                *v = a[base + j * stride];
            }
            let price = self.calculator.inner_value(&iter, t);

            for (j, &y) in levels.iter().enumerate() {
                let withdraw = (y - y_min).min(self.change_rate);
                let inject = (y_max - y).min(self.change_rate);
                let i = base + j * stride;
                ret[i] = a[i]
                    .max(interpolate(levels, &line, y - withdraw) + withdraw * price)
                    .max(interpolate(levels, &line, y + inject) - inject * price);
            }
        }
        *a = ret;
    }
}
