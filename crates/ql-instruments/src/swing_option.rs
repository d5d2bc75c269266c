//! Swing options: a bundle of exercise rights on a schedule of dates.

use crate::exercise::{Exercise, ExerciseType};
use crate::instrument::Instrument;
use crate::payoff::StrikedPayoff;
use ql_core::{ensure, errors::Result, Time};
use std::sync::Arc;

/// Arguments for a swing option.
#[derive(Debug, Clone)]
pub struct SwingOptionArguments {
    /// Cash flow of a single exercise, typically a forward payoff.
    pub payoff: Arc<dyn StrikedPayoff>,
    /// Swing exercise schedule.
    pub exercise: Exercise,
    /// Rights that must be exercised before the last date.
    pub min_exercise_rights: usize,
    /// Rights available in total.
    pub max_exercise_rights: usize,
}

/// A swing option with at most one exercise per date.
#[derive(Debug)]
pub struct VanillaSwingOption {
    payoff: Arc<dyn StrikedPayoff>,
    exercise: Exercise,
    min_exercise_rights: usize,
    max_exercise_rights: usize,
}

impl VanillaSwingOption {
    /// Create a swing option.
    pub fn new(
        payoff: Arc<dyn StrikedPayoff>,
        exercise: Exercise,
        min_exercise_rights: usize,
        max_exercise_rights: usize,
    ) -> Result<Self> {
        ensure!(
            exercise.exercise_type() == ExerciseType::Swing,
            "swing option requires a swing exercise, got {}",
            exercise
        );
        ensure!(
            min_exercise_rights <= max_exercise_rights,
            "min exercise rights ({min_exercise_rights}) exceed max ({max_exercise_rights})"
        );
        ensure!(
            max_exercise_rights <= exercise.times().len(),
            "max exercise rights ({max_exercise_rights}) exceed the number of exercise dates ({})",
            exercise.times().len()
        );
        Ok(Self {
            payoff,
            exercise,
            min_exercise_rights,
            max_exercise_rights,
        })
    }

    /// The exercise schedule.
    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    /// Minimum number of exercises.
    pub fn min_exercise_rights(&self) -> usize {
        self.min_exercise_rights
    }

    /// Maximum number of exercises.
    pub fn max_exercise_rights(&self) -> usize {
        self.max_exercise_rights
    }
}

impl Instrument for VanillaSwingOption {
    type Arguments = SwingOptionArguments;

    fn arguments(&self) -> SwingOptionArguments {
        SwingOptionArguments {
            payoff: Arc::clone(&self.payoff),
            exercise: self.exercise.clone(),
            min_exercise_rights: self.min_exercise_rights,
            max_exercise_rights: self.max_exercise_rights,
        }
    }

    fn maturity(&self) -> Time {
        self.exercise.last_time()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payoff::{OptionType, VanillaForwardPayoff};

    fn payoff() -> Arc<dyn StrikedPayoff> {
        Arc::new(VanillaForwardPayoff::new(OptionType::Call, 30.0))
    }

    #[test]
    fn swing_option_validation() {
        let ex = Exercise::swing(vec![0.1, 0.2, 0.3]).unwrap();
        assert!(VanillaSwingOption::new(payoff(), ex.clone(), 1, 3).is_ok());
        assert!(VanillaSwingOption::new(payoff(), ex.clone(), 2, 1).is_err());
        assert!(VanillaSwingOption::new(payoff(), ex, 0, 4).is_err());

        let bermudan = Exercise::bermudan(vec![0.1, 0.2]).unwrap();
        assert!(VanillaSwingOption::new(payoff(), bermudan, 0, 1).is_err());
    }

    #[test]
    fn swing_option_arguments() {
        let ex = Exercise::swing(vec![0.25, 0.5]).unwrap();
        let opt = VanillaSwingOption::new(payoff(), ex, 0, 2).unwrap();
        let args = opt.arguments();
        assert_eq!(args.max_exercise_rights, 2);
        assert_eq!(opt.maturity(), 0.5);
    }
}
