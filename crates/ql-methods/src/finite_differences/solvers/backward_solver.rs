use ql_core::{errors::Result, Real, Time};
use ql_math::Array;
use tracing::{debug, trace};

use crate::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use crate::finite_differences::operators::FdmLinearOpComposite;
use crate::finite_differences::schemes::{FdmScheme, FdmSchemeDesc, FdmSchemeType};
use crate::finite_differences::step_conditions::{FdmStepConditionComposite, StepCondition};

/// Progress of a [`FiniteDifferenceModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollbackState {
    /// No step taken yet.
    NotStarted,
    /// Inside a rollback.
    Stepping,
    /// Target time reached.
    Done,
}

/// Drives a scheme from `from` down to `to`, landing exactly on every
/// stopping time in between.
pub struct FiniteDifferenceModel<'a> {
    evolver: Box<dyn FdmScheme + 'a>,
    stopping_times: Vec<Time>,
    state: RollbackState,
}

impl<'a> FiniteDifferenceModel<'a> {
    /// Model over `evolver`; `stopping_times` must be sorted.
    pub fn new(evolver: Box<dyn FdmScheme + 'a>, stopping_times: &[Time]) -> Self {
        Self {
            evolver,
            stopping_times: stopping_times.to_vec(),
            state: RollbackState::NotStarted,
        }
    }

    /// Current state.
    pub fn state(&self) -> RollbackState {
        self.state
    }

    /// Roll `a` back from `from` to `to` in `steps` equal steps, applying
    /// `condition` after every step and at every stopping time.
    pub fn rollback(
        &mut self,
        a: &mut Array,
        from: Time,
        to: Time,
        steps: usize,
        mut condition: Option<&mut dyn StepCondition>,
    ) -> Result<()> {
        ql_core::ensure!(from >= to, "rollback from {from} to later time {to}");
        ql_core::ensure!(steps > 0, "rollback needs at least one step");
        self.state = RollbackState::Stepping;

        let dt = (from - to) / steps as Real;
        self.evolver.set_step(dt);

        if self.stopping_times.last() == Some(&from) {
            if let Some(c) = condition.as_deref_mut() {
                c.apply_to(a, from);
            }
        }

        let mut t = from;
        for i in 0..steps {
            let mut now = t;
            let next = if i + 1 == steps || (to - (t - dt)).abs() < Real::EPSILON.sqrt() {
                to
            } else {
                t - dt
            };

            let mut hit = false;
            for &stop in self.stopping_times.iter().rev() {
                if next <= stop && stop < now {
                    hit = true;
                    trace!(time = stop, "stopping time");
                    self.evolver.set_step(now - stop);
                    self.evolver.step(a, now)?;
                    if let Some(c) = condition.as_deref_mut() {
                        c.apply_to(a, stop);
                    }
                    now = stop;
                }
            }

            if hit {
                if now > next {
                    self.evolver.set_step(now - next);
                    self.evolver.step(a, now)?;
                    if let Some(c) = condition.as_deref_mut() {
                        c.apply_to(a, next);
                    }
                }
                self.evolver.set_step(dt);
            } else {
                self.evolver.set_step(now - next);
                self.evolver.step(a, now)?;
                if let Some(c) = condition.as_deref_mut() {
                    c.apply_to(a, next);
                }
                self.evolver.set_step(dt);
            }
            t = next;
        }

        self.state = RollbackState::Done;
        Ok(())
    }
}

/// Backward rollback with optional implicit-Euler damping.
///
/// The first `damping_steps` steps below `from` use implicit Euler to smooth
/// payoff kinks, the rest the configured scheme.
pub struct FdmBackwardSolver<'a> {
    map: &'a mut dyn FdmLinearOpComposite,
    bc_set: &'a mut FdmBoundaryConditionSet,
    condition: &'a mut FdmStepConditionComposite,
    scheme_desc: FdmSchemeDesc,
}

impl<'a> FdmBackwardSolver<'a> {
    /// Solver over borrowed parts.
    pub fn new(
        map: &'a mut dyn FdmLinearOpComposite,
        bc_set: &'a mut FdmBoundaryConditionSet,
        condition: &'a mut FdmStepConditionComposite,
        scheme_desc: FdmSchemeDesc,
    ) -> Self {
        Self {
            map,
            bc_set,
            condition,
            scheme_desc,
        }
    }

    /// Roll `a` back from `from` to `to`.
    pub fn rollback(
        &mut self,
        a: &mut Array,
        from: Time,
        to: Time,
        steps: usize,
        damping_steps: usize,
    ) -> Result<()> {
        debug!(
            from,
            to,
            steps,
            damping_steps,
            size = a.size(),
            scheme = ?self.scheme_desc.scheme_type,
            "rollback"
        );
        let stopping_times = self.condition.stopping_times().to_vec();
        let all_steps = steps + damping_steps;
        ql_core::ensure!(all_steps > 0, "rollback needs at least one step");

        if self.scheme_desc.scheme_type == FdmSchemeType::ImplicitEuler {
            let scheme = FdmSchemeDesc::implicit_euler().build(&mut *self.map, &mut *self.bc_set);
            return FiniteDifferenceModel::new(scheme, &stopping_times).rollback(
                a,
                from,
                to,
                all_steps,
                Some(&mut *self.condition as &mut dyn StepCondition),
            );
        }

        let damping_to = from - (from - to) * damping_steps as Real / all_steps as Real;
        if damping_steps > 0 {
            let damping = FdmSchemeDesc::implicit_euler().build(&mut *self.map, &mut *self.bc_set);
            FiniteDifferenceModel::new(damping, &stopping_times).rollback(
                a,
                from,
                damping_to,
                damping_steps,
                Some(&mut *self.condition as &mut dyn StepCondition),
            )?;
        }
        if steps > 0 {
            let scheme = self.scheme_desc.build(&mut *self.map, &mut *self.bc_set);
            FiniteDifferenceModel::new(scheme, &stopping_times).rollback(
                a,
                damping_to,
                to,
                steps,
                Some(&mut *self.condition as &mut dyn StepCondition),
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::schemes::tests::Decay;

    /// Records every time it is applied at.
    struct Recorder(Vec<Time>);

    impl StepCondition for Recorder {
        fn apply_to(&mut self, _a: &mut Array, t: Time) {
            self.0.push(t);
        }
    }

    #[test]
    fn lands_on_stopping_times() {
        let mut op = Decay {
            lambda: 0.0,
            ndim: 1,
        };
        let mut bcs = FdmBoundaryConditionSet::new();
        let scheme = FdmSchemeDesc::douglas().build(&mut op, &mut bcs);
        let mut model = FiniteDifferenceModel::new(scheme, &[0.3, 1.0]);
        assert_eq!(model.state(), RollbackState::NotStarted);

        let mut rec = Recorder(Vec::new());
        let mut a = Array::zeros(2);
        model.rollback(&mut a, 1.0, 0.0, 4, Some(&mut rec as &mut dyn StepCondition)).unwrap();
        assert_eq!(model.state(), RollbackState::Done);

        let expected = [1.0, 0.75, 0.5, 0.3, 0.25, 0.0];
        assert_eq!(rec.0.len(), expected.len());
        for (got, want) in rec.0.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "{:?}", rec.0);
        }
    }

    #[test]
    fn damping_and_scheme_share_the_interval() {
        let mut op = Decay {
            lambda: 1.0,
            ndim: 2,
        };
        let mut bcs = FdmBoundaryConditionSet::new();
        let mut condition = FdmStepConditionComposite::default();
        let mut a = Array::from_element(3, 1.0);
        FdmBackwardSolver::new(&mut op, &mut bcs, &mut condition, FdmSchemeDesc::hundsdorfer())
            .rollback(&mut a, 1.0, 0.0, 100, 10)
            .unwrap();
        assert!((a[0] - (-2.0_f64).exp()).abs() < 5e-3);
    }

    #[test]
    fn rejects_forward_rollback() {
        let mut op = Decay {
            lambda: 1.0,
            ndim: 1,
        };
        let mut bcs = FdmBoundaryConditionSet::new();
        let scheme = FdmSchemeDesc::douglas().build(&mut op, &mut bcs);
        let mut a = Array::zeros(1);
        assert!(FiniteDifferenceModel::new(scheme, &[])
            .rollback(&mut a, 0.0, 1.0, 1, None)
            .is_err());
    }
}
