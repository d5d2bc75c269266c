//! Constraints applied to the solution between time steps.
//!
//! A condition sees the array after every step and at every stopping time;
//! stopping times are times the rollback must land on exactly.

mod barrier;
mod exercise;
mod snapshot;
mod storage;
mod swing;

use std::fmt;
use std::sync::Arc;

use ql_core::{errors::Error, errors::Result, Time};
use ql_instruments::{Exercise, ExerciseType};
use ql_math::Array;

pub use barrier::FdmBarrierStepCondition;
pub use exercise::{FdmAmericanStepCondition, FdmBermudanStepCondition};
pub use snapshot::FdmSnapshotCondition;
pub use storage::FdmSimpleStorageCondition;
pub use swing::FdmSimpleSwingCondition;

use super::meshers::FdmMesherComposite;
use super::utilities::FdmInnerValueCalculator;

/// Relative tolerance, in units of machine epsilon, for matching a rollback
/// time against a condition's own dates.
pub(crate) const TIME_MATCH_ULPS: u32 = 42;

/// A constraint on the solution array at time `t`.
pub trait StepCondition: Send {
    /// Modify `a` in place.
    fn apply_to(&mut self, a: &mut Array, t: Time);
}

/// Ordered chain of step conditions with their merged stopping times.
#[derive(Default)]
pub struct FdmStepConditionComposite {
    stopping_times: Vec<Time>,
    conditions: Vec<Box<dyn StepCondition>>,
}

impl fmt::Debug for FdmStepConditionComposite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FdmStepConditionComposite")
            .field("stopping_times", &self.stopping_times)
            .field("conditions", &self.conditions.len())
            .finish()
    }
}

impl FdmStepConditionComposite {
    /// Chain `conditions`; the stopping-time lists are merged, sorted and
    /// de-duplicated.
    pub fn new(stopping_times: Vec<Vec<Time>>, conditions: Vec<Box<dyn StepCondition>>) -> Self {
        let mut times: Vec<Time> = stopping_times.into_iter().flatten().collect();
        times.sort_by(|a, b| a.total_cmp(b));
        times.dedup();
        Self {
            stopping_times: times,
            conditions,
        }
    }

    /// Sorted, de-duplicated stopping times.
    pub fn stopping_times(&self) -> &[Time] {
        &self.stopping_times
    }

    /// Number of chained conditions.
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Early-exercise composite for a vanilla exercise.
    ///
    /// European exercise gives an empty chain, American an
    /// [`FdmAmericanStepCondition`] and Bermudan an
    /// [`FdmBermudanStepCondition`] stopping at every exercise date.
    pub fn vanilla_composite(
        exercise: &Exercise,
        mesher: Arc<FdmMesherComposite>,
        calculator: Arc<dyn FdmInnerValueCalculator>,
    ) -> Result<Self> {
        match exercise.exercise_type() {
            ExerciseType::European => Ok(Self::default()),
            ExerciseType::American => Ok(Self::new(
                Vec::new(),
                vec![Box::new(FdmAmericanStepCondition::new(mesher, calculator))],
            )),
            ExerciseType::Bermudan => {
                let times = exercise.times().to_vec();
                Ok(Self::new(
                    vec![times.clone()],
                    vec![Box::new(FdmBermudanStepCondition::new(
                        times, mesher, calculator,
                    ))],
                ))
            }
            ExerciseType::Swing => Err(Error::UnsupportedExercise(format!(
                "{exercise} has no vanilla step condition"
            ))),
        }
    }

    /// Concatenate two chains; `first` is applied before `second`.
    pub fn join_conditions(first: Self, second: Self) -> Self {
        let mut conditions = first.conditions;
        conditions.extend(second.conditions);
        Self::new(
            vec![first.stopping_times, second.stopping_times],
            conditions,
        )
    }
}

impl StepCondition for FdmStepConditionComposite {
    fn apply_to(&mut self, a: &mut Array, t: Time) {
        for condition in &mut self.conditions {
            condition.apply_to(a, t);
        }
    }
}
