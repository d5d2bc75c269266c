use std::fmt;
use std::sync::Arc;

use ql_core::Time;
use ql_math::{close_enough, Array};

use super::{StepCondition, TIME_MATCH_ULPS};
use crate::finite_differences::meshers::FdmMesherComposite;
use crate::finite_differences::utilities::FdmInnerValueCalculator;

/// Swing exercise on a mesh axis counting the rights already used.
///
/// Node `k` of the swing direction holds the value with `k` rights used.
/// At an exercise date a node with rights left takes
/// `cashflow + V(k + 1)` when that beats continuation, and is forced to
/// exercise when the remaining dates only just cover the minimum.
pub struct FdmSimpleSwingCondition {
    exercise_times: Vec<Time>,
    mesher: Arc<FdmMesherComposite>,
    calculator: Arc<dyn FdmInnerValueCalculator>,
    swing_direction: usize,
    min_exercise_rights: usize,
}

impl fmt::Debug for FdmSimpleSwingCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FdmSimpleSwingCondition")
            .field("exercise_times", &self.exercise_times)
            .field("swing_direction", &self.swing_direction)
            .field("min_exercise_rights", &self.min_exercise_rights)
            .finish_non_exhaustive()
    }
}

impl FdmSimpleSwingCondition {
    /// Swing condition over `exercise_times` (sorted).
    pub fn new(
        exercise_times: Vec<Time>,
        mesher: Arc<FdmMesherComposite>,
        calculator: Arc<dyn FdmInnerValueCalculator>,
        swing_direction: usize,
        min_exercise_rights: usize,
    ) -> Self {
        Self {
            exercise_times,
            mesher,
            calculator,
            swing_direction,
            min_exercise_rights,
        }
    }
}

impl StepCondition for FdmSimpleSwingCondition {
    fn apply_to(&mut self, a: &mut Array, t: Time) {
        let Some(k) = self
            .exercise_times
            .iter()
            .position(|&et| close_enough(et, t, TIME_MATCH_ULPS))
        else {
            return;
        };
        let remaining = self.exercise_times.len() - k;

        let layout = self.mesher.layout();
        let max_exercise_rights = layout.dim()[self.swing_direction] - 1;
        let mut ret = a.clone();
        for iter in layout {
            let used = iter.coordinate(self.swing_direction);
            if used >= max_exercise_rights {
                continue;
            }
            let i = iter.index();
            let cashflow = self.calculator.inner_value(&iter, t);
            let exercised = a[layout.neighbourhood(&iter, self.swing_direction, 1)] + cashflow;
            if a[i] < exercised || used + remaining <= self.min_exercise_rights {
                ret[i] = exercised;
            }
        }
        *a = ret;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::Uniform1dMesher;
    use crate::finite_differences::operators::FdmLinearOpIterator;

    /// Pays `c` everywhere.
    struct Constant(f64);

    impl FdmInnerValueCalculator for Constant {
        fn inner_value(&self, _iter: &FdmLinearOpIterator, _t: Time) -> f64 {
            self.0
        }

        fn avg_inner_value(&self, _iter: &FdmLinearOpIterator, _t: Time) -> f64 {
            self.0
        }
    }

    fn rights_mesher(max_rights: usize) -> Arc<FdmMesherComposite> {
        Arc::new(
            FdmMesherComposite::from_mesher(
                Uniform1dMesher::new(0.0, max_rights as f64, max_rights + 1).unwrap(),
            )
            .unwrap(),
        )
    }

    #[test]
    fn exercises_profitable_rights_backwards() {
        let m = rights_mesher(2);
        let mut cond =
            FdmSimpleSwingCondition::new(vec![1.0, 2.0, 3.0], m, Arc::new(Constant(1.0)), 0, 0);
        let mut a = Array::zeros(3);
        for t in [3.0, 2.0, 1.0] {
            cond.apply_to(&mut a, t);
        }
        // two rights worth one each, the last node has none left
        assert_eq!(a.as_slice(), &[2.0, 1.0, 0.0]);
    }

    #[test]
    fn minimum_rights_force_loss_making_exercise() {
        let m = rights_mesher(2);
        let mut cond =
            FdmSimpleSwingCondition::new(vec![1.0, 2.0], m, Arc::new(Constant(-1.0)), 0, 2);
        let mut a = Array::zeros(3);
        cond.apply_to(&mut a, 2.0);
        cond.apply_to(&mut a, 1.0);
        assert_eq!(a[0], -2.0);

        // outside the schedule nothing happens
        let mut b = Array::zeros(3);
        cond.apply_to(&mut b, 1.5);
        assert!(b.iter().all(|v| *v == 0.0));
    }
}
