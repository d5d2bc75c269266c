//! Single-asset vanilla and barrier options.

use crate::exercise::Exercise;
use crate::instrument::Instrument;
use crate::payoff::{OptionType, PlainVanillaPayoff, StrikedPayoff};
use ql_core::{errors::Result, Real, Time};
use std::sync::Arc;

/// Payoff and exercise of a one-asset option.
#[derive(Debug, Clone)]
pub struct VanillaOptionArguments {
    /// Payoff at exercise.
    pub payoff: Arc<dyn StrikedPayoff>,
    /// When the payoff can be claimed.
    pub exercise: Exercise,
}

/// Option on one underlying with European, Bermudan or American exercise.
#[derive(Debug)]
pub struct VanillaOption {
    terms: VanillaOptionArguments,
}

impl VanillaOption {
    /// Option paying `payoff` under `exercise`.
    pub fn new(payoff: Arc<dyn StrikedPayoff>, exercise: Exercise) -> Self {
        Self {
            terms: VanillaOptionArguments { payoff, exercise },
        }
    }

    /// Plain call or put exercisable only at `expiry`.
    pub fn european(option_type: OptionType, strike: Real, expiry: Time) -> Result<Self> {
        Ok(Self::plain(option_type, strike, Exercise::european(expiry)?))
    }

    /// Plain call or put exercisable at any time up to `expiry`.
    pub fn american(option_type: OptionType, strike: Real, expiry: Time) -> Result<Self> {
        Ok(Self::plain(option_type, strike, Exercise::american(0.0, expiry)?))
    }

    fn plain(option_type: OptionType, strike: Real, exercise: Exercise) -> Self {
        Self::new(Arc::new(PlainVanillaPayoff::new(option_type, strike)), exercise)
    }

    /// Strike of the payoff.
    pub fn strike(&self) -> Real {
        self.terms.payoff.strike()
    }

    /// Call or put.
    pub fn option_type(&self) -> OptionType {
        self.terms.payoff.option_type()
    }

    /// The striked payoff.
    pub fn payoff(&self) -> &dyn StrikedPayoff {
        &*self.terms.payoff
    }

    /// Exercise schedule.
    pub fn exercise(&self) -> &Exercise {
        &self.terms.exercise
    }
}

impl Instrument for VanillaOption {
    type Arguments = VanillaOptionArguments;

    fn arguments(&self) -> VanillaOptionArguments {
        self.terms.clone()
    }

    fn maturity(&self) -> Time {
        self.terms.exercise.last_time()
    }
}

/// Side of the spot the barrier sits on and what crossing it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BarrierType {
    /// Activated by a fall to the barrier.
    DownIn,
    /// Activated by a rise to the barrier.
    UpIn,
    /// Cancelled by a fall to the barrier.
    DownOut,
    /// Cancelled by a rise to the barrier.
    UpOut,
}

impl BarrierType {
    /// Watches a fall to the barrier.
    pub fn is_down(self) -> bool {
        matches!(self, Self::DownIn | Self::DownOut)
    }

    /// Activated, rather than cancelled, by the barrier.
    pub fn is_knock_in(self) -> bool {
        matches!(self, Self::DownIn | Self::UpIn)
    }

    /// Knock-out counterpart watching the same side.
    pub fn knock_out(self) -> Self {
        match self {
            Self::DownIn | Self::DownOut => Self::DownOut,
            Self::UpIn | Self::UpOut => Self::UpOut,
        }
    }

    /// `spot` already lies strictly beyond `barrier`.
    pub fn is_triggered(self, spot: Real, barrier: Real) -> bool {
        match self.is_down() {
            true => spot < barrier,
            false => spot > barrier,
        }
    }
}

/// Terms of a single-barrier option.
#[derive(Debug, Clone)]
pub struct BarrierOptionArguments {
    /// Payoff at expiry if the option is alive.
    pub payoff: Arc<dyn StrikedPayoff>,
    /// Expiry.
    pub exercise: Exercise,
    /// Direction and knock behaviour.
    pub barrier_type: BarrierType,
    /// Barrier level in spot units.
    pub barrier: Real,
    /// Cash paid on knock-out, or at expiry for a knock-in that never
    /// activated.
    pub rebate: Real,
}

/// Continuously monitored single-barrier option.
#[derive(Debug)]
pub struct BarrierOption {
    terms: BarrierOptionArguments,
}

impl BarrierOption {
    /// Barrier option on `payoff`; `rebate` is paid as described on
    /// [`BarrierOptionArguments::rebate`].
    pub fn new(
        payoff: Arc<dyn StrikedPayoff>,
        exercise: Exercise,
        barrier_type: BarrierType,
        barrier: Real,
        rebate: Real,
    ) -> Self {
        Self {
            terms: BarrierOptionArguments {
                payoff,
                exercise,
                barrier_type,
                barrier,
                rebate,
            },
        }
    }

    /// Strike of the payoff.
    pub fn strike(&self) -> Real {
        self.terms.payoff.strike()
    }

    /// Call or put.
    pub fn option_type(&self) -> OptionType {
        self.terms.payoff.option_type()
    }

    /// Exercise schedule.
    pub fn exercise(&self) -> &Exercise {
        &self.terms.exercise
    }

    /// Direction and knock behaviour.
    pub fn barrier_type(&self) -> BarrierType {
        self.terms.barrier_type
    }

    /// Barrier level in spot units.
    pub fn barrier(&self) -> Real {
        self.terms.barrier
    }

    /// Cash rebate.
    pub fn rebate(&self) -> Real {
        self.terms.rebate
    }
}

impl Instrument for BarrierOption {
    type Arguments = BarrierOptionArguments;

    fn arguments(&self) -> BarrierOptionArguments {
        self.terms.clone()
    }

    fn maturity(&self) -> Time {
        self.terms.exercise.last_time()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise::ExerciseType;

    #[test]
    fn convenience_constructors() {
        let call = VanillaOption::european(OptionType::Call, 100.0, 1.0).unwrap();
        assert_eq!((call.strike(), call.option_type()), (100.0, OptionType::Call));
        assert_eq!(call.exercise().exercise_type(), ExerciseType::European);
        assert_eq!(call.maturity(), 1.0);
        assert!(!call.is_expired());

        let put = VanillaOption::american(OptionType::Put, 90.0, 0.5).unwrap();
        assert_eq!(put.exercise().exercise_type(), ExerciseType::American);
        assert_eq!(put.exercise().times(), &[0.0, 0.5]);
        assert_eq!(put.arguments().payoff.strike(), 90.0);
    }

    #[test]
    fn barrier_terms_reach_the_engine_arguments() {
        let payoff = Arc::new(PlainVanillaPayoff::new(OptionType::Call, 100.0));
        let opt = BarrierOption::new(
            payoff,
            Exercise::european(1.0).unwrap(),
            BarrierType::DownOut,
            80.0,
            2.5,
        );
        assert_eq!(opt.barrier_type(), BarrierType::DownOut);
        let args = opt.arguments();
        assert_eq!((args.barrier, args.rebate), (80.0, 2.5));
        assert_eq!(opt.strike(), 100.0);
    }

    #[test]
    fn barrier_sides() {
        assert!(BarrierType::DownIn.is_down() && BarrierType::DownIn.is_knock_in());
        assert!(!BarrierType::UpOut.is_down() && !BarrierType::UpOut.is_knock_in());
        assert_eq!(BarrierType::UpIn.knock_out(), BarrierType::UpOut);
        assert_eq!(BarrierType::DownOut.knock_out(), BarrierType::DownOut);
        assert!(BarrierType::DownOut.is_triggered(79.0, 80.0));
        assert!(!BarrierType::DownOut.is_triggered(80.0, 80.0));
        assert!(!BarrierType::UpOut.is_triggered(79.0, 80.0));
    }
}
