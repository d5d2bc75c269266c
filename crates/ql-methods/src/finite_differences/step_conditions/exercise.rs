use std::fmt;
use std::sync::Arc;

use ql_core::Time;
use ql_math::{close_enough, Array};

use super::{StepCondition, TIME_MATCH_ULPS};
use crate::finite_differences::meshers::FdmMesherComposite;
use crate::finite_differences::utilities::FdmInnerValueCalculator;

fn project_on_exercise(
    mesher: &FdmMesherComposite,
    calculator: &dyn FdmInnerValueCalculator,
    a: &mut Array,
    t: Time,
) {
    for iter in mesher.layout() {
        let i = iter.index();
        let inner = calculator.avg_inner_value(&iter, t);
        if inner > a[i] {
            a[i] = inner;
        }
    }
}

/// Continuous early exercise: `a = max(a, payoff)` at every step.
pub struct FdmAmericanStepCondition {
    mesher: Arc<FdmMesherComposite>,
    calculator: Arc<dyn FdmInnerValueCalculator>,
}

impl fmt::Debug for FdmAmericanStepCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FdmAmericanStepCondition")
            .field("size", &self.mesher.layout().size())
            .finish_non_exhaustive()
    }
}

impl FdmAmericanStepCondition {
    /// Exercise into the cell-averaged payoff of `calculator`.
    pub fn new(
        mesher: Arc<FdmMesherComposite>,
        calculator: Arc<dyn FdmInnerValueCalculator>,
    ) -> Self {
        Self { mesher, calculator }
    }
}

impl StepCondition for FdmAmericanStepCondition {
    fn apply_to(&mut self, a: &mut Array, t: Time) {
        project_on_exercise(&self.mesher, self.calculator.as_ref(), a, t);
    }
}

/// Early exercise restricted to a set of dates.
pub struct FdmBermudanStepCondition {
    exercise_times: Vec<Time>,
    mesher: Arc<FdmMesherComposite>,
    calculator: Arc<dyn FdmInnerValueCalculator>,
}

impl fmt::Debug for FdmBermudanStepCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FdmBermudanStepCondition")
            .field("exercise_times", &self.exercise_times)
            .finish_non_exhaustive()
    }
}

impl FdmBermudanStepCondition {
    /// Exercise at `exercise_times` only.
    pub fn new(
        exercise_times: Vec<Time>,
        mesher: Arc<FdmMesherComposite>,
        calculator: Arc<dyn FdmInnerValueCalculator>,
    ) -> Self {
        Self {
            exercise_times,
            mesher,
            calculator,
        }
    }

    /// The exercise dates.
    pub fn exercise_times(&self) -> &[Time] {
        &self.exercise_times
    }
}

impl StepCondition for FdmBermudanStepCondition {
    fn apply_to(&mut self, a: &mut Array, t: Time) {
        if self
            .exercise_times
            .iter()
            .any(|&et| close_enough(et, t, TIME_MATCH_ULPS))
        {
            project_on_exercise(&self.mesher, self.calculator.as_ref(), a, t);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::Uniform1dMesher;
    use crate::finite_differences::utilities::FdmLogInnerValue;
    use ql_instruments::{OptionType, PlainVanillaPayoff};

    fn setup() -> (Arc<FdmMesherComposite>, Arc<dyn FdmInnerValueCalculator>) {
        let m = Arc::new(
            FdmMesherComposite::from_mesher(Uniform1dMesher::new(4.0, 5.2, 13).unwrap()).unwrap(),
        );
        let calc = Arc::new(FdmLogInnerValue::new(
            Arc::new(PlainVanillaPayoff::new(OptionType::Put, 100.0)),
            Arc::clone(&m),
            0,
        ));
        (m, calc)
    }

    #[test]
    fn american_projection_is_monotone_and_idempotent() {
        let (m, calc) = setup();
        let mut cond = FdmAmericanStepCondition::new(Arc::clone(&m), calc);
        let before: Array = (0..13).map(|i| i as f64).collect();
        let mut a = before.clone();
        cond.apply_to(&mut a, 0.5);
        for i in 0..13 {
            assert!(a[i] >= before[i]);
        }
        let once = a.clone();
        cond.apply_to(&mut a, 0.5);
        assert_eq!(a, once);
        // deep in the money the put payoff wins over the zero continuation
        assert!(a[0] > 40.0);
    }

    #[test]
    fn bermudan_only_acts_on_exercise_dates() {
        let (m, calc) = setup();
        let mut cond = FdmBermudanStepCondition::new(vec![0.25, 0.5], m, calc);
        let mut a = Array::zeros(13);
        cond.apply_to(&mut a, 0.3);
        assert!(a.iter().all(|v| *v == 0.0));
        cond.apply_to(&mut a, 0.5);
        assert!(a[0] > 0.0);
    }
}
