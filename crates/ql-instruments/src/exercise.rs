//! Option exercise schedules.
//!
//! An `Exercise` defines *when* an option can be exercised. Times are year
//! fractions from the valuation date.

use ql_core::{ensure, errors::Result, Time};
use std::fmt;

/// Type of exercise right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExerciseType {
    /// Can only be exercised at expiry.
    European,
    /// Can be exercised at any time up to expiry.
    American,
    /// Can be exercised at specific times.
    Bermudan,
    /// A number of rights, each exercisable at one of specific times.
    Swing,
}

/// Exercise specification for an option.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Exercise {
    exercise_type: ExerciseType,
    /// - European: single time (the expiry).
    /// - American: two times (earliest, latest).
    /// - Bermudan / Swing: sorted, de-duplicated exercise times.
    times: Vec<Time>,
}

impl Exercise {
    /// Create a European exercise.
    pub fn european(expiry: Time) -> Result<Self> {
        ensure!(expiry >= 0.0, "expiry must be non-negative, got {expiry}");
        Ok(Self {
            exercise_type: ExerciseType::European,
            times: vec![expiry],
        })
    }

    /// Create an American exercise (earliest to latest).
    pub fn american(earliest: Time, latest: Time) -> Result<Self> {
        ensure!(
            0.0 <= earliest && earliest <= latest,
            "invalid American exercise window [{earliest}, {latest}]"
        );
        Ok(Self {
            exercise_type: ExerciseType::American,
            times: vec![earliest, latest],
        })
    }

    /// Create a Bermudan exercise from a set of exercise times.
    pub fn bermudan(times: Vec<Time>) -> Result<Self> {
        Ok(Self {
            exercise_type: ExerciseType::Bermudan,
            times: Self::sorted_times(times)?,
        })
    }

    /// Create a swing exercise from a set of exercise times.
    pub fn swing(times: Vec<Time>) -> Result<Self> {
        Ok(Self {
            exercise_type: ExerciseType::Swing,
            times: Self::sorted_times(times)?,
        })
    }

    fn sorted_times(mut times: Vec<Time>) -> Result<Vec<Time>> {
        ensure!(!times.is_empty(), "at least one exercise time is required");
        ensure!(
            times.iter().all(|t| t.is_finite() && *t >= 0.0),
            "exercise times must be finite and non-negative"
        );
        times.sort_by(|a, b| a.total_cmp(b));
        times.dedup();
        Ok(times)
    }

    /// The last possible exercise time.
    pub fn last_time(&self) -> Time {
        self.times[self.times.len() - 1]
    }

    /// All exercise times.
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// The type of exercise.
    pub fn exercise_type(&self) -> ExerciseType {
        self.exercise_type
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exercise_type {
            ExerciseType::European => write!(f, "European({})", self.times[0]),
            ExerciseType::American => {
                write!(f, "American({} – {})", self.times[0], self.last_time())
            }
            ExerciseType::Bermudan => write!(f, "Bermudan({} times)", self.times.len()),
            ExerciseType::Swing => write!(f, "Swing({} times)", self.times.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn european_exercise() {
        let ex = Exercise::european(1.5).unwrap();
        assert_eq!(ex.exercise_type(), ExerciseType::European);
        assert_eq!(ex.last_time(), 1.5);
        assert_eq!(ex.times().len(), 1);
        assert!(Exercise::european(-0.1).is_err());
    }

    #[test]
    fn american_exercise() {
        let ex = Exercise::american(0.0, 1.5).unwrap();
        assert_eq!(ex.exercise_type(), ExerciseType::American);
        assert_eq!(ex.last_time(), 1.5);
        assert_eq!(ex.to_string(), "American(0 – 1.5)");
        assert!(Exercise::american(2.0, 1.0).is_err());
    }

    #[test]
    fn bermudan_exercise_sorts_and_dedups() {
        let ex = Exercise::bermudan(vec![1.0, 0.5, 1.0, 0.25]).unwrap();
        assert_eq!(ex.exercise_type(), ExerciseType::Bermudan);
        assert_eq!(ex.times(), &[0.25, 0.5, 1.0]);
        assert!(Exercise::bermudan(vec![]).is_err());
    }

    #[test]
    fn swing_exercise() {
        let ex = Exercise::swing(vec![0.1, 0.2, 0.3]).unwrap();
        assert_eq!(ex.exercise_type(), ExerciseType::Swing);
        assert_eq!(ex.to_string(), "Swing(3 times)");
    }

    proptest! {
        #[test]
        fn bermudan_times_strictly_increasing(times in proptest::collection::vec(0.0f64..10.0, 1..40)) {
            let ex = Exercise::bermudan(times.clone()).unwrap();
            prop_assert!(ex.times().windows(2).all(|w| w[0] < w[1]));
            prop_assert_eq!(ex.last_time(), times.iter().cloned().fold(0.0, f64::max));
        }
    }
}
