//! Storage options: inject or withdraw a commodity at discrete dates.

use crate::exercise::{Exercise, ExerciseType};
use crate::instrument::Instrument;
use ql_core::{ensure, errors::Result, Real, Time};

/// Arguments for a storage option.
#[derive(Debug, Clone)]
pub struct StorageOptionArguments {
    /// Bermudan schedule of injection/withdrawal dates.
    pub exercise: Exercise,
    /// Maximum storage level.
    pub capacity: Real,
    /// Current storage level.
    pub load: Real,
    /// Amount injected or withdrawn per exercise.
    pub change_rate: Real,
}

/// A storage facility valued as a sequence of inject/hold/withdraw decisions.
#[derive(Debug)]
pub struct VanillaStorageOption {
    exercise: Exercise,
    capacity: Real,
    load: Real,
    change_rate: Real,
}

impl VanillaStorageOption {
    /// Create a storage option.
    pub fn new(exercise: Exercise, capacity: Real, load: Real, change_rate: Real) -> Result<Self> {
        ensure!(
            exercise.exercise_type() == ExerciseType::Bermudan,
            "storage option requires a Bermudan exercise, got {}",
            exercise
        );
        ensure!(capacity > 0.0, "capacity must be positive, got {capacity}");
        ensure!(
            (0.0..=capacity).contains(&load),
            "load {load} outside [0, {capacity}]"
        );
        ensure!(
            change_rate > 0.0 && change_rate <= capacity,
            "change rate must be in (0, capacity], got {change_rate}"
        );
        Ok(Self {
            exercise,
            capacity,
            load,
            change_rate,
        })
    }

    /// The exercise schedule.
    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    /// Maximum storage level.
    pub fn capacity(&self) -> Real {
        self.capacity
    }

    /// Current storage level.
    pub fn load(&self) -> Real {
        self.load
    }

    /// Volume moved per exercise.
    pub fn change_rate(&self) -> Real {
        self.change_rate
    }
}

impl Instrument for VanillaStorageOption {
    type Arguments = StorageOptionArguments;

    fn arguments(&self) -> StorageOptionArguments {
        StorageOptionArguments {
            exercise: self.exercise.clone(),
            capacity: self.capacity,
            load: self.load,
            change_rate: self.change_rate,
        }
    }

    fn maturity(&self) -> Time {
        self.exercise.last_time()
    }
}
