use std::sync::{Arc, OnceLock};

use ql_core::Time;
use ql_math::{close_enough, Array};

use super::{StepCondition, TIME_MATCH_ULPS};

/// Records the solution at one time.
///
/// Clones share the recorded array, so a solver keeps one clone and hands
/// the other to the rollback.
#[derive(Debug, Clone)]
pub struct FdmSnapshotCondition {
    t: Time,
    values: Arc<OnceLock<Array>>,
}

impl FdmSnapshotCondition {
    /// Snapshot taken at `t`.
    pub fn new(t: Time) -> Self {
        Self {
            t,
            values: Arc::new(OnceLock::new()),
        }
    }

    /// Snapshot time.
    pub fn time(&self) -> Time {
        self.t
    }

    /// The recorded array, once the rollback has passed `t`.
    pub fn values(&self) -> Option<&Array> {
        self.values.get()
    }
}

impl StepCondition for FdmSnapshotCondition {
    fn apply_to(&mut self, a: &mut Array, t: Time) {
        if close_enough(t, self.t, TIME_MATCH_ULPS) {
            // first visit wins
            let _ = self.values.set(a.clone());
        }
    }
}
